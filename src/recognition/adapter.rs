use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::engine::{RecognitionEngine, RecognizerEvent, RecognizerSink, StampedEvent, UNSUPPORTED_CODE};
use crate::error::VoiceError;

pub struct SpeechRecognitionAdapter {
    engine: Box<dyn RecognitionEngine>,
    language: String,
    events_tx: mpsc::UnboundedSender<StampedEvent>,
    supported: bool,
    active: bool,
    generation: u64,
}

impl SpeechRecognitionAdapter {
    /// Wrap an engine. An unsupported engine reports `"unsupported"` once,
    /// here, and is never started.
    pub fn new(
        engine: Box<dyn RecognitionEngine>,
        language: impl Into<String>,
        events_tx: mpsc::UnboundedSender<StampedEvent>,
    ) -> Self {
        let supported = engine.is_supported();
        if !supported {
            warn!("Speech recognition engine {} is not supported", engine.name());
            let _ = events_tx.send(StampedEvent {
                generation: 0,
                event: RecognizerEvent::Error(UNSUPPORTED_CODE.to_string()),
            });
        }

        Self {
            engine,
            language: language.into(),
            events_tx,
            supported,
            active: false,
            generation: 0,
        }
    }

    /// Start a new recognition session.
    ///
    /// Returns `Ok(false)` without touching the engine when unsupported or
    /// already active.
    pub async fn start(&mut self) -> Result<bool, VoiceError> {
        if !self.supported {
            debug!("Ignoring start: recognition unsupported");
            return Ok(false);
        }
        if self.active {
            debug!("Ignoring start: recognition already active");
            return Ok(false);
        }

        self.generation += 1;
        let sink = RecognizerSink::new(self.generation, self.events_tx.clone());

        self.engine.start(&self.language, sink).await?;
        self.active = true;

        info!(
            "Recognition started on {} (generation {}, {})",
            self.engine.name(),
            self.generation,
            self.language
        );
        Ok(true)
    }

    pub fn stop(&mut self) {
        if self.active {
            info!("Stopping recognition on {}", self.engine.name());
            self.engine.stop();
            self.active = false;
        }
    }

    pub fn abort(&mut self) {
        if self.active {
            info!("Aborting recognition on {}", self.engine.name());
            self.engine.abort();
            self.active = false;
        }
    }

    /// Record that the engine ended on its own
    pub fn mark_ended(&mut self, generation: u64) {
        if generation == self.generation {
            self.active = false;
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Generation of the most recently started session
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for SpeechRecognitionAdapter {
    fn drop(&mut self) {
        self.abort();
    }
}
