use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{info, warn};

use super::messages::*;
use super::parse::interpret_body;
use crate::error::VoiceError;

/// Remote transcription capability used for final-transcript hand-off
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Exactly one round trip; retries are the caller's concern.
    async fn send(&self, request: BackendRequest) -> BackendResult;
}

/// HTTP client for the transcription service's multipart endpoint
#[derive(Debug, Clone)]
pub struct BackendTranscriptionClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl BackendTranscriptionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, VoiceError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create a client; `timeout` bounds the whole round trip when set
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, VoiceError> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| VoiceError::InvalidConfig(format!("api endpoint {}: {}", endpoint, e)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| VoiceError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn build_form(request: BackendRequest) -> Result<Form, VoiceError> {
        let user_id = request.user_id().to_string();

        let mut form = Form::new()
            .text(TRANSCRIPT_FIELD, request.browser_transcript)
            .text(USER_ID_FIELD, user_id)
            .text(TIMESTAMP_FIELD, request.timestamp)
            .text(INPUT_METHOD_FIELD, INPUT_METHOD_VOICE)
            .text(BROWSER_PREVIEW_FIELD, BROWSER_PREVIEW);

        if let Some(audio) = request.audio.filter(|a| !a.is_empty()) {
            let part = Part::bytes(audio.data)
                .file_name(AUDIO_FILE_NAME)
                .mime_str(AUDIO_MIME)
                .map_err(|e| VoiceError::RemoteUnreachable(format!("audio part: {}", e)))?;
            form = form.part(AUDIO_FIELD, part);
        }

        Ok(form)
    }
}

#[async_trait]
impl TranscriptionService for BackendTranscriptionClient {
    async fn send(&self, request: BackendRequest) -> BackendResult {
        let audio_bytes = request.audio.as_ref().map(|a| a.len()).unwrap_or(0);
        info!(
            "Sending transcript to {} (user={}, audio={} bytes)",
            self.endpoint,
            request.user_id(),
            audio_bytes
        );

        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Transcription request failed: {}", e);
                VoiceError::RemoteUnreachable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VoiceError::RemoteUnreachable(format!("reading response: {}", e)))?;

        if !status.is_success() {
            warn!("Transcription service returned {}", status);
            return Err(VoiceError::RemoteRejected(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let result = interpret_body(&body);
        match &result {
            Ok(_) => info!("Transcription service accepted transcript"),
            Err(e) => warn!("Transcription service response unusable: {}", e),
        }
        result
    }
}
