use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::VoiceError;

/// Error code reported when no recognition capability exists
pub const UNSUPPORTED_CODE: &str = "unsupported";

/// A partial or final transcript for the current utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

/// Everything a recognizer can report
///
/// Lifecycle events are not ordered relative to transcripts: `Ended` may
/// arrive before the final transcript of the last utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Started,
    Transcript(TranscriptEvent),
    Ended,
    Error(String),
}

/// Recognizer event tagged with the session generation that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedEvent {
    pub generation: u64,
    pub event: RecognizerEvent,
}

/// Handed to an engine on start; every event it emits goes through here
#[derive(Debug, Clone)]
pub struct RecognizerSink {
    generation: u64,
    tx: mpsc::UnboundedSender<StampedEvent>,
}

impl RecognizerSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<StampedEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once the controller has gone away.
    pub fn emit(&self, event: RecognizerEvent) -> bool {
        self.tx
            .send(StampedEvent {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    pub fn started(&self) -> bool {
        self.emit(RecognizerEvent::Started)
    }

    pub fn partial(&self, text: impl Into<String>) -> bool {
        self.emit(RecognizerEvent::Transcript(TranscriptEvent {
            text: text.into(),
            is_final: false,
        }))
    }

    pub fn final_transcript(&self, text: impl Into<String>) -> bool {
        self.emit(RecognizerEvent::Transcript(TranscriptEvent {
            text: text.into(),
            is_final: true,
        }))
    }

    pub fn ended(&self) -> bool {
        self.emit(RecognizerEvent::Ended)
    }

    pub fn error(&self, code: impl Into<String>) -> bool {
        self.emit(RecognizerEvent::Error(code.into()))
    }
}

/// Continuous streaming recognition capability
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Whether the capability exists on this platform
    fn is_supported(&self) -> bool;

    /// Begin continuous recognition, emitting through `sink`
    async fn start(&mut self, language: &str, sink: RecognizerSink) -> Result<(), VoiceError>;

    /// Request graceful termination; a pending final may still be emitted
    fn stop(&mut self);

    /// Request immediate termination, used on teardown
    fn abort(&mut self);

    /// Get engine name for logging
    fn name(&self) -> &str;
}
