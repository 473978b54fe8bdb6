use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::input::{AudioChunk, AudioInput, AudioInputConfig};
use crate::error::VoiceError;

/// Finalized recording: all chunks of one utterance joined together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub data: Vec<u8>,
    pub chunk_count: usize,
    /// Timestamp of the last chunk
    pub end_ms: u64,
}

impl AudioBlob {
    fn from_chunks(chunks: Vec<AudioChunk>) -> Option<Self> {
        if chunks.is_empty() {
            return None;
        }

        let chunk_count = chunks.len();
        let end_ms = chunks.last().map(|c| c.timestamp_ms).unwrap_or(0);
        let mut data = Vec::with_capacity(chunks.iter().map(|c| c.data.len()).sum());
        for chunk in chunks {
            data.extend_from_slice(&chunk.data);
        }

        Some(Self {
            data,
            chunk_count,
            end_ms,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Microphone recorder used for backend hand-off
///
/// Owns the device for the duration of one recording and accumulates the
/// chunks it emits. `stop` flushes everything into a single `AudioBlob`
/// and releases the device; dropping the adapter releases it as well.
pub struct AudioCaptureAdapter {
    input: Box<dyn AudioInput>,
    config: AudioInputConfig,
    chunk_rx: Option<mpsc::Receiver<AudioChunk>>,
    chunks: Vec<AudioChunk>,
    recording: bool,
}

impl AudioCaptureAdapter {
    pub fn new(input: Box<dyn AudioInput>, config: AudioInputConfig) -> Self {
        Self {
            input,
            config,
            chunk_rx: None,
            chunks: Vec::new(),
            recording: false,
        }
    }

    /// Acquire the device and begin buffering
    pub async fn start(&mut self) -> Result<(), VoiceError> {
        if self.recording {
            warn!("Recording already started");
            return Ok(());
        }

        self.chunks.clear();

        match self.input.start(&self.config).await {
            Ok(rx) => {
                info!(
                    "Recording started on {} ({}ms timeslice)",
                    self.input.name(),
                    self.config.timeslice_ms
                );
                self.chunk_rx = Some(rx);
                self.recording = true;
                Ok(())
            }
            Err(e) => {
                // A failed acquisition must not leave a half-open handle behind
                self.input.stop();
                warn!("Failed to start recording on {}: {}", self.input.name(), e);
                Err(e)
            }
        }
    }

    /// Wait for the next chunk from the device and buffer it
    ///
    /// Never completes while not recording, so it can sit in a `select!`.
    pub async fn pump(&mut self) {
        let Some(rx) = self.chunk_rx.as_mut() else {
            return std::future::pending().await;
        };

        match rx.recv().await {
            Some(chunk) => self.push(chunk),
            None => {
                debug!("Audio stream from {} closed", self.input.name());
                self.chunk_rx = None;
            }
        }
    }

    fn push(&mut self, chunk: AudioChunk) {
        if self.recording && !chunk.data.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Stop recording, release the device and return the buffered audio
    ///
    /// No-op (returns `None`) when not recording.
    pub fn stop(&mut self) -> Option<AudioBlob> {
        if !self.recording {
            return None;
        }

        // Release first so a device flushing on stop still lands in the channel
        self.input.stop();

        if let Some(mut rx) = self.chunk_rx.take() {
            while let Ok(chunk) = rx.try_recv() {
                self.push(chunk);
            }
        }

        self.recording = false;

        let blob = AudioBlob::from_chunks(std::mem::take(&mut self.chunks));
        info!(
            "Recording stopped on {} ({} bytes)",
            self.input.name(),
            blob.as_ref().map(|b| b.len()).unwrap_or(0)
        );
        blob
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Number of chunks buffered for the current recording
    pub fn buffered_chunks(&self) -> usize {
        self.chunks.len()
    }
}

impl Drop for AudioCaptureAdapter {
    fn drop(&mut self) {
        if self.recording || self.input.is_capturing() {
            warn!("Releasing {} on drop", self.input.name());
            self.input.stop();
        }
    }
}
