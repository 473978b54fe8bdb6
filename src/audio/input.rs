use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::VoiceError;

/// One fragment of encoded audio as emitted by the recording device
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Encoded audio bytes (opaque to the session)
    pub data: Vec<u8>,
    /// Milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Configuration for a recording device
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Interval between emitted chunks in milliseconds
    pub timeslice_ms: u64,
    /// Chunks buffered between the device and the capture adapter
    pub channel_capacity: usize,
}

impl Default for AudioInputConfig {
    fn default() -> Self {
        Self {
            timeslice_ms: 250,
            channel_capacity: 64,
        }
    }
}

/// Recording device capability
///
/// Implementations:
/// - `FileAudioInput`: replays a recording file (CLI simulation)
/// - test doubles in `tests/common`
#[async_trait]
pub trait AudioInput: Send {
    /// Acquire the device and start emitting chunks
    ///
    /// Fails with `DeviceAccessDenied` or `DeviceAccessError` when the
    /// device cannot be acquired.
    async fn start(
        &mut self,
        config: &AudioInputConfig,
    ) -> Result<mpsc::Receiver<AudioChunk>, VoiceError>;

    /// Release the device handle. Safe to call when not capturing.
    fn stop(&mut self);

    /// Check if the device is currently held
    fn is_capturing(&self) -> bool;

    /// Get input name for logging
    fn name(&self) -> &str;
}
