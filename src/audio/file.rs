use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::input::{AudioChunk, AudioInput, AudioInputConfig};
use crate::error::VoiceError;

const DEFAULT_CHUNK_BYTES: usize = 4096;

/// Replays a recording file as if it were a live microphone
///
/// The file is emitted in fixed-size chunks, one per timeslice. Used by the
/// `simulate` command where no real capture device is available.
pub struct FileAudioInput {
    path: Option<PathBuf>,
    chunk_bytes: usize,
    deny_access: bool,
    task: Option<JoinHandle<()>>,
}

impl FileAudioInput {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            deny_access: false,
            task: None,
        }
    }

    /// An input with no recording source; every start fails
    pub fn none() -> Self {
        Self {
            path: None,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            deny_access: false,
            task: None,
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }

    /// Simulate the user refusing microphone permission
    pub fn deny_access(mut self) -> Self {
        self.deny_access = true;
        self
    }
}

#[async_trait]
impl AudioInput for FileAudioInput {
    async fn start(
        &mut self,
        config: &AudioInputConfig,
    ) -> Result<mpsc::Receiver<AudioChunk>, VoiceError> {
        if self.deny_access {
            return Err(VoiceError::DeviceAccessDenied);
        }

        let path = self
            .path
            .as_ref()
            .ok_or_else(|| VoiceError::DeviceAccessError("no recording source".to_string()))?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            VoiceError::DeviceAccessError(format!("{}: {}", path.display(), e))
        })?;

        info!(
            "Replaying {} ({} bytes, {} byte chunks)",
            path.display(),
            bytes.len(),
            self.chunk_bytes
        );

        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let chunk_bytes = self.chunk_bytes;
        let timeslice_ms = config.timeslice_ms.max(1);

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(timeslice_ms));
            for (index, data) in bytes.chunks(chunk_bytes).enumerate() {
                interval.tick().await;
                let chunk = AudioChunk {
                    data: data.to_vec(),
                    timestamp_ms: index as u64 * timeslice_ms,
                };
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        }));

        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        "file"
    }
}
