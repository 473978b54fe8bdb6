use thiserror::Error;

/// Failures a voice session can surface to the host.
///
/// Adapter-level failures are converted into one of these at the controller
/// boundary; the `Display` text is what the host receives through `on_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// Local speech recognition is not available on this platform
    #[error("Speech recognition is not supported")]
    Unsupported,

    #[error("Microphone access denied")]
    DeviceAccessDenied,

    #[error("Microphone access failed: {0}")]
    DeviceAccessError(String),

    /// Local engine failure mid-session
    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Transcription service unreachable: {0}")]
    RemoteUnreachable(String),

    #[error("Transcription service rejected the request: {0}")]
    RemoteRejected(String),

    #[error("Invalid voice session configuration: {0}")]
    InvalidConfig(String),
}

impl VoiceError {
    /// Whether this error ends the session (or rules one out entirely).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VoiceError::Unsupported | VoiceError::Recognition(_) | VoiceError::InvalidConfig(_)
        )
    }
}
