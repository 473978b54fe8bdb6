use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::engine::{RecognitionEngine, RecognizerSink};
use crate::error::VoiceError;

/// One step of a recognition script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Partial {
        text: String,
        #[serde(default)]
        delay_ms: u64,
    },
    Final {
        text: String,
        #[serde(default)]
        delay_ms: u64,
    },
    Error {
        code: String,
        #[serde(default)]
        delay_ms: u64,
    },
    End {
        #[serde(default)]
        delay_ms: u64,
    },
}

impl ScriptStep {
    fn delay(&self) -> Duration {
        let ms = match self {
            ScriptStep::Partial { delay_ms, .. }
            | ScriptStep::Final { delay_ms, .. }
            | ScriptStep::Error { delay_ms, .. }
            | ScriptStep::End { delay_ms } => *delay_ms,
        };
        Duration::from_millis(ms)
    }

    fn emit(self, sink: &RecognizerSink) -> bool {
        match self {
            ScriptStep::Partial { text, .. } => sink.partial(text),
            ScriptStep::Final { text, .. } => sink.final_transcript(text),
            ScriptStep::Error { code, .. } => sink.error(code),
            ScriptStep::End { .. } => sink.ended(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default = "default_supported")]
    supported: bool,
    steps: Vec<ScriptStep>,
}

fn default_supported() -> bool {
    true
}

/// Recognizer that replays a fixed script of events
pub struct ScriptedRecognizer {
    steps: Vec<ScriptStep>,
    supported: bool,
    sink: Option<RecognizerSink>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedRecognizer {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            supported: true,
            sink: None,
            task: None,
        }
    }

    /// A recognizer reporting that no capability exists
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new())
        }
    }

    /// Load a script from a JSON file:
    /// `{"supported": true, "steps": [{"type": "partial", "text": "hi", "delay_ms": 200}, ...]}`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recognition script: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse recognition script: {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let script: ScriptFile = serde_json::from_str(raw)?;
        info!("Loaded recognition script with {} steps", script.steps.len());
        Ok(Self {
            supported: script.supported,
            ..Self::new(script.steps)
        })
    }

    fn halt(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(sink) = self.sink.take() {
            sink.ended();
        }
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn start(&mut self, _language: &str, sink: RecognizerSink) -> Result<(), VoiceError> {
        if !self.supported {
            return Err(VoiceError::Unsupported);
        }

        let steps = self.steps.clone();
        let task_sink = sink.clone();
        self.sink = Some(sink);

        self.task = Some(tokio::spawn(async move {
            task_sink.started();
            for step in steps {
                tokio::time::sleep(step.delay()).await;
                if !step.emit(&task_sink) {
                    break;
                }
            }
        }));

        Ok(())
    }

    fn stop(&mut self) {
        self.halt();
    }

    fn abort(&mut self) {
        self.halt();
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
