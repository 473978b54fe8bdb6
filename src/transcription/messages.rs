use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audio::AudioBlob;
use crate::error::VoiceError;

pub const DEFAULT_USER_ID: &str = "anonymous";
pub const INPUT_METHOD_VOICE: &str = "voice";
pub const BROWSER_PREVIEW: &str = "false";

// Multipart field names
pub const TRANSCRIPT_FIELD: &str = "browser_transcript";
pub const USER_ID_FIELD: &str = "user_id";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const INPUT_METHOD_FIELD: &str = "input_method";
pub const BROWSER_PREVIEW_FIELD: &str = "browser_preview";
pub const AUDIO_FIELD: &str = "audio";

pub const AUDIO_FILE_NAME: &str = "voice.webm";
pub const AUDIO_MIME: &str = "audio/webm";

/// Outcome of one backend round trip: the delivered payload, or a
/// `RemoteUnreachable` / `RemoteRejected` failure.
pub type BackendResult = Result<Value, VoiceError>;

/// One final-transcript hand-off to the transcription service
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Final transcript from the local recognizer
    pub browser_transcript: String,
    pub user_id: Option<String>,
    /// ISO-8601 timestamp
    pub timestamp: String,
    /// Recording of the utterance, absent when capture failed or was empty
    pub audio: Option<AudioBlob>,
}

impl BackendRequest {
    /// Build a request stamped with the current time
    pub fn new(
        browser_transcript: impl Into<String>,
        user_id: Option<String>,
        audio: Option<AudioBlob>,
    ) -> Self {
        Self {
            browser_transcript: browser_transcript.into(),
            user_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            audio,
        }
    }

    pub fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER_ID)
    }
}

/// Response body of the loopback transcription endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub result: Value,
    pub transcribed_text: String,
    pub audio_bytes: usize,
    pub processing_time_ms: u64,
    pub request_id: String,
}
