use anyhow::Result;
use serde::Deserialize;

use crate::session::{SessionConfig, DEFAULT_LANGUAGE};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionSection,
    pub backend: BackendConfig,
    pub capture: CaptureConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub use_backend_transcription: bool,
    pub api_endpoint: Option<String>,
    pub user_id: Option<String>,
    pub language: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            use_backend_transcription: false,
            api_endpoint: None,
            user_id: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub timeslice_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { timeslice_ms: 250 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load from a config file, with `VOICE_<SECTION>__<KEY>` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VOICE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            use_backend_transcription: self.session.use_backend_transcription,
            api_endpoint: self.session.api_endpoint.clone(),
            user_id: self.session.user_id.clone(),
            language: self.session.language.clone(),
            timeslice_ms: self.capture.timeslice_ms,
            request_timeout_secs: self.backend.request_timeout_secs,
        }
    }
}
