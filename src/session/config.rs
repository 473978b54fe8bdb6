use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::AudioInputConfig;
use crate::error::VoiceError;

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Configuration for a voice session, fixed when the controller is built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Route final transcripts (plus recorded audio) to the transcription service
    pub use_backend_transcription: bool,

    /// Transcription service URL, required in backend mode
    pub api_endpoint: Option<String>,

    /// Sent as `user_id`; `"anonymous"` when unset
    pub user_id: Option<String>,

    /// Recognition language tag
    pub language: String,

    /// Recorder chunk interval in milliseconds
    pub timeslice_ms: u64,

    /// Backend round-trip timeout; none when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            use_backend_transcription: false,
            api_endpoint: None,
            user_id: None,
            language: DEFAULT_LANGUAGE.to_string(),
            timeslice_ms: 250,
            request_timeout_secs: None,
        }
    }
}

impl SessionConfig {
    /// Local-only recognition
    pub fn local() -> Self {
        Self::default()
    }

    /// Backend hand-off to `endpoint`
    pub fn backend(endpoint: impl Into<String>) -> Self {
        Self {
            use_backend_transcription: true,
            api_endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.use_backend_transcription {
            match self.api_endpoint.as_deref().map(str::trim) {
                None | Some("") => {
                    return Err(VoiceError::InvalidConfig(
                        "api_endpoint is required when use_backend_transcription is enabled"
                            .to_string(),
                    ))
                }
                Some(endpoint) => {
                    reqwest::Url::parse(endpoint).map_err(|e| {
                        VoiceError::InvalidConfig(format!("api_endpoint {}: {}", endpoint, e))
                    })?;
                }
            }
        }

        if self.timeslice_ms == 0 {
            return Err(VoiceError::InvalidConfig(
                "timeslice_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn audio_input_config(&self) -> AudioInputConfig {
        AudioInputConfig {
            timeslice_ms: self.timeslice_ms,
            ..AudioInputConfig::default()
        }
    }
}
