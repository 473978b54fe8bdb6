// Test doubles for the voice session capabilities
//
// Each double hands back a probe so the test can drive events and inspect
// what the controller did to the capability.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use voice_session::audio::{AudioChunk, AudioInput, AudioInputConfig};
use voice_session::recognition::{RecognitionEngine, RecognizerSink};
use voice_session::transcription::{BackendRequest, BackendResult, TranscriptionService};
use voice_session::{VoiceError, VoiceEvent};

// ============================================================================
// Recognizer
// ============================================================================

#[derive(Default)]
pub struct RecognizerProbeState {
    pub sink: Option<RecognizerSink>,
    pub starts: usize,
    pub stops: usize,
    pub aborts: usize,
    pub active: bool,
}

#[derive(Clone, Default)]
pub struct RecognizerProbe(Arc<Mutex<RecognizerProbeState>>);

impl RecognizerProbe {
    /// Sink of the most recent session
    pub fn sink(&self) -> RecognizerSink {
        self.0
            .lock()
            .unwrap()
            .sink
            .clone()
            .expect("recognizer was never started")
    }

    pub fn starts(&self) -> usize {
        self.0.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.0.lock().unwrap().stops
    }

    pub fn aborts(&self) -> usize {
        self.0.lock().unwrap().aborts
    }

    pub fn is_active(&self) -> bool {
        self.0.lock().unwrap().active
    }
}

/// Recognizer whose events are emitted by the test through the probe
pub struct ManualRecognizer {
    supported: bool,
    fail_start: bool,
    probe: RecognizerProbe,
}

impl ManualRecognizer {
    pub fn new() -> (Self, RecognizerProbe) {
        let probe = RecognizerProbe::default();
        (
            Self {
                supported: true,
                fail_start: false,
                probe: probe.clone(),
            },
            probe,
        )
    }

    pub fn unsupported() -> (Self, RecognizerProbe) {
        let (mut recognizer, probe) = Self::new();
        recognizer.supported = false;
        (recognizer, probe)
    }

    pub fn failing() -> (Self, RecognizerProbe) {
        let (mut recognizer, probe) = Self::new();
        recognizer.fail_start = true;
        (recognizer, probe)
    }
}

#[async_trait]
impl RecognitionEngine for ManualRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn start(&mut self, _language: &str, sink: RecognizerSink) -> Result<(), VoiceError> {
        let mut state = self.probe.0.lock().unwrap();
        state.starts += 1;
        if self.fail_start {
            return Err(VoiceError::Recognition("not-allowed".to_string()));
        }
        state.sink = Some(sink);
        state.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.probe.0.lock().unwrap();
        state.stops += 1;
        state.active = false;
    }

    fn abort(&mut self) {
        let mut state = self.probe.0.lock().unwrap();
        state.aborts += 1;
        state.active = false;
    }

    fn name(&self) -> &str {
        "manual"
    }
}

// ============================================================================
// Audio input
// ============================================================================

#[derive(Default)]
pub struct InputProbeState {
    pub tx: Option<mpsc::Sender<AudioChunk>>,
    pub starts: usize,
    pub stops: usize,
    pub open: bool,
}

#[derive(Clone, Default)]
pub struct InputProbe(Arc<Mutex<InputProbeState>>);

impl InputProbe {
    /// Push a chunk as if the device had produced it
    pub fn push(&self, data: &[u8], timestamp_ms: u64) {
        let state = self.0.lock().unwrap();
        let tx = state.tx.as_ref().expect("audio input not started");
        tx.try_send(AudioChunk {
            data: data.to_vec(),
            timestamp_ms,
        })
        .expect("audio channel full");
    }

    pub fn is_open(&self) -> bool {
        self.0.lock().unwrap().open
    }

    pub fn starts(&self) -> usize {
        self.0.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.0.lock().unwrap().stops
    }
}

pub struct MockAudioInput {
    failure: Option<VoiceError>,
    probe: InputProbe,
}

impl MockAudioInput {
    pub fn new() -> (Self, InputProbe) {
        let probe = InputProbe::default();
        (
            Self {
                failure: None,
                probe: probe.clone(),
            },
            probe,
        )
    }

    pub fn denied() -> (Self, InputProbe) {
        let (mut input, probe) = Self::new();
        input.failure = Some(VoiceError::DeviceAccessDenied);
        (input, probe)
    }
}

#[async_trait]
impl AudioInput for MockAudioInput {
    async fn start(
        &mut self,
        config: &AudioInputConfig,
    ) -> Result<mpsc::Receiver<AudioChunk>, VoiceError> {
        let mut state = self.probe.0.lock().unwrap();
        state.starts += 1;
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        state.tx = Some(tx);
        state.open = true;
        Ok(rx)
    }

    fn stop(&mut self) {
        let mut state = self.probe.0.lock().unwrap();
        state.stops += 1;
        state.open = false;
        state.tx = None;
    }

    fn is_capturing(&self) -> bool {
        self.probe.0.lock().unwrap().open
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Transcription service
// ============================================================================

/// Service returning a canned result, optionally held until released
pub struct StubTranscriptionService {
    result: BackendResult,
    requests: Arc<Mutex<Vec<BackendRequest>>>,
    gate: Option<Arc<Notify>>,
}

impl StubTranscriptionService {
    pub fn new(result: BackendResult) -> (Arc<Self>, Arc<Mutex<Vec<BackendRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                result,
                requests: requests.clone(),
                gate: None,
            }),
            requests,
        )
    }

    /// Like `new`, but each round trip waits for `gate.notify_one()`
    pub fn gated(result: BackendResult) -> (Arc<Self>, Arc<Mutex<Vec<BackendRequest>>>, Arc<Notify>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(Notify::new());
        (
            Arc::new(Self {
                result,
                requests: requests.clone(),
                gate: Some(gate.clone()),
            }),
            requests,
            gate,
        )
    }
}

#[async_trait]
impl TranscriptionService for StubTranscriptionService {
    async fn send(&self, request: BackendRequest) -> BackendResult {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }
}

// ============================================================================
// Event helpers
// ============================================================================

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<VoiceEvent>) -> VoiceEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for voice event")
        .expect("event channel closed")
}

/// Collect every event that arrives within a short quiet period
pub async fn drain_events(rx: &mut mpsc::UnboundedReceiver<VoiceEvent>) -> Vec<VoiceEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
        events.push(event);
    }
    events
}

pub fn final_transcripts(events: &[VoiceEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            VoiceEvent::Transcript { text, is_final: true } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn backend_responses(events: &[VoiceEvent]) -> Vec<Value> {
    events
        .iter()
        .filter_map(|e| match e {
            VoiceEvent::BackendResponse(payload) => Some(payload.clone()),
            _ => None,
        })
        .collect()
}

pub fn errors(events: &[VoiceEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            VoiceEvent::Error(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
