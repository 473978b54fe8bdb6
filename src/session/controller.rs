use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::events::VoiceSessionHandler;
use super::state::{SessionState, VoiceSession};
use crate::audio::{AudioBlob, AudioCaptureAdapter, AudioInput};
use crate::error::VoiceError;
use crate::recognition::{
    RecognitionEngine, RecognizerEvent, SpeechRecognitionAdapter, StampedEvent, UNSUPPORTED_CODE,
};
use crate::transcription::{
    BackendRequest, BackendResult, BackendTranscriptionClient, TranscriptionService,
};

type HandoffFuture = BoxFuture<'static, BackendResult>;

/// Host requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Start when idle, stop otherwise
    Toggle,
    /// Start a session; no-op unless idle
    Start,
    /// Stop listening; no-op when idle
    Stop,
    /// Host is going away: abort everything and exit the run loop
    Teardown,
}

/// Cloneable host-side handle to a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<ControllerCommand>,
    state: watch::Receiver<SessionState>,
}

impl ControllerHandle {
    /// Returns false once the controller has exited.
    pub fn toggle(&self) -> bool {
        self.commands.send(ControllerCommand::Toggle).is_ok()
    }

    pub fn start(&self) -> bool {
        self.commands.send(ControllerCommand::Start).is_ok()
    }

    pub fn stop(&self) -> bool {
        self.commands.send(ControllerCommand::Stop).is_ok()
    }

    pub fn teardown(&self) -> bool {
        self.commands.send(ControllerCommand::Teardown).is_ok()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver for every state transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Whether a backend round trip is in flight (toggle is a no-op then)
    pub fn is_handing_off(&self) -> bool {
        self.state() == SessionState::HandingOff
    }

    /// Wait until the controller reaches `target`. Returns false if it exits first.
    pub async fn wait_for_state(&self, target: SessionState) -> bool {
        let mut rx = self.state.clone();
        let reached = rx.wait_for(|state| *state == target).await.is_ok();
        reached
    }
}

enum Wakeup {
    Command(Option<ControllerCommand>),
    Recognizer(StampedEvent),
    AudioBuffered,
    Backend(BackendResult),
}

/// Voice session state machine
///
/// Owns one recognizer and one recorder, reconciles their events and
/// decides whether a final transcript goes straight to the host or through
/// the transcription service. Everything runs on the single task driving
/// [`run`](Self::run).
pub struct VoiceSessionController {
    session: VoiceSession,
    recognizer: SpeechRecognitionAdapter,
    recorder: AudioCaptureAdapter,
    service: Option<Arc<dyn TranscriptionService>>,
    handler: Box<dyn VoiceSessionHandler>,
    commands: mpsc::UnboundedReceiver<ControllerCommand>,
    recognizer_events: mpsc::UnboundedReceiver<StampedEvent>,
    state_tx: watch::Sender<SessionState>,
    handoff: Option<HandoffFuture>,
}

impl VoiceSessionController {
    /// Build a controller and its host handle
    ///
    /// In backend mode a `BackendTranscriptionClient` is created for the
    /// configured endpoint; use [`with_transcription_service`](Self::with_transcription_service)
    /// to substitute another service.
    pub fn new(
        config: SessionConfig,
        engine: Box<dyn RecognitionEngine>,
        input: Box<dyn AudioInput>,
        handler: Box<dyn VoiceSessionHandler>,
    ) -> Result<(Self, ControllerHandle), VoiceError> {
        config.validate()?;

        let service: Option<Arc<dyn TranscriptionService>> =
            match (config.use_backend_transcription, config.api_endpoint.as_deref()) {
                (true, Some(endpoint)) => Some(Arc::new(BackendTranscriptionClient::with_timeout(
                    endpoint,
                    config.request_timeout(),
                )?)),
                _ => None,
            };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        let recognizer = SpeechRecognitionAdapter::new(engine, config.language.clone(), events_tx);
        let recorder = AudioCaptureAdapter::new(input, config.audio_input_config());

        info!(
            "Voice session controller created ({} mode)",
            if config.use_backend_transcription { "backend" } else { "local" }
        );

        let controller = Self {
            session: VoiceSession::new(config.use_backend_transcription, config.user_id),
            recognizer,
            recorder,
            service,
            handler,
            commands: command_rx,
            recognizer_events: events_rx,
            state_tx,
            handoff: None,
        };

        let handle = ControllerHandle {
            commands: command_tx,
            state: state_rx,
        };

        Ok((controller, handle))
    }

    pub fn with_transcription_service(mut self, service: Arc<dyn TranscriptionService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Process events until teardown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Voice session controller running");

        loop {
            let wakeup = tokio::select! {
                command = self.commands.recv() => Wakeup::Command(command),
                Some(stamped) = self.recognizer_events.recv() => Wakeup::Recognizer(stamped),
                _ = self.recorder.pump(), if self.recorder.is_recording() => Wakeup::AudioBuffered,
                result = poll_handoff(&mut self.handoff), if self.handoff.is_some() => {
                    Wakeup::Backend(result)
                }
            };

            match wakeup {
                Wakeup::Command(Some(ControllerCommand::Toggle)) => self.toggle().await,
                Wakeup::Command(Some(ControllerCommand::Start)) => self.start().await,
                Wakeup::Command(Some(ControllerCommand::Stop)) => self.stop(),
                Wakeup::Command(Some(ControllerCommand::Teardown)) | Wakeup::Command(None) => {
                    self.teardown();
                    break;
                }
                Wakeup::Recognizer(stamped) => self.on_recognizer_event(stamped),
                Wakeup::AudioBuffered => {}
                Wakeup::Backend(result) => {
                    self.handoff = None;
                    self.on_backend_result(result);
                }
            }
        }

        info!("Voice session controller stopped");
    }

    async fn toggle(&mut self) {
        match self.session.state {
            SessionState::Idle => self.start().await,
            SessionState::Listening | SessionState::HandingOff => self.stop(),
        }
    }

    async fn start(&mut self) {
        if self.session.state != SessionState::Idle {
            debug!("Start ignored while {:?}", self.session.state);
            return;
        }
        self.start_session().await;
    }

    fn stop(&mut self) {
        match self.session.state {
            SessionState::Idle => debug!("Stop ignored: no active session"),
            SessionState::Listening => {
                info!("Host requested stop");
                self.stop_listening();
                self.set_state(SessionState::Idle);
            }
            SessionState::HandingOff => {
                // The round trip keeps going; only adapters still running are stopped
                debug!("Stop during hand-off: stopping any active adapters only");
                self.recognizer.stop();
                self.recorder.stop();
            }
        }
    }

    async fn start_session(&mut self) {
        if !self.recognizer.is_supported() {
            debug!("Start ignored: speech recognition unsupported");
            return;
        }

        match self.recognizer.start().await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Start ignored: recognizer already active");
                return;
            }
            Err(e) => {
                self.report_error(e);
                return;
            }
        }

        self.session.begin(self.recognizer.generation());
        self.set_state(SessionState::Listening);

        if self.session.backend_mode {
            // Recognition carries on without audio if the microphone is unavailable
            if let Err(e) = self.recorder.start().await {
                self.report_error(e);
            }
        }

        self.handler.on_voice_start();
    }

    fn on_recognizer_event(&mut self, stamped: StampedEvent) {
        // Generation 0 only ever carries the adapter's own support check
        if let RecognizerEvent::Error(code) = &stamped.event {
            if stamped.generation == 0 && code == UNSUPPORTED_CODE {
                self.report_error(VoiceError::Unsupported);
                return;
            }
        }

        if stamped.generation != self.session.generation {
            debug!(
                "Discarding event from generation {} (current {})",
                stamped.generation, self.session.generation
            );
            return;
        }

        match stamped.event {
            RecognizerEvent::Started => debug!("Recognizer started"),
            RecognizerEvent::Ended => {
                self.recognizer.mark_ended(stamped.generation);
                if self.session.state == SessionState::Listening {
                    info!("Recognizer ended");
                    self.stop_listening();
                    self.set_state(SessionState::Idle);
                }
            }
            RecognizerEvent::Transcript(transcript) if !transcript.is_final => {
                self.on_partial(&transcript.text)
            }
            RecognizerEvent::Transcript(transcript) => self.on_final(transcript.text),
            RecognizerEvent::Error(code) => self.on_recognition_error(code),
        }
    }

    fn on_partial(&mut self, text: &str) {
        if self.session.state != SessionState::Listening {
            return;
        }
        if self.session.backend_mode {
            // Backend mode resolves through the final transcript only
            return;
        }
        self.handler.on_transcript(text, false);
    }

    fn on_final(&mut self, text: String) {
        if !self.session.accepting_final {
            debug!("Ignoring final transcript: session already resolved");
            return;
        }
        self.session.accepting_final = false;

        let audio = if self.session.state == SessionState::Listening {
            self.recognizer.stop();
            self.recorder.stop()
        } else {
            // Trailing final after the recognizer ended or the host stopped
            self.session.pending_audio.take()
        };

        if self.session.backend_mode {
            self.end_voice();
            self.begin_handoff(text, audio);
        } else {
            info!("Delivering final transcript");
            self.handler.on_transcript(&text, true);
            self.end_voice();
            self.set_state(SessionState::Idle);
        }
    }

    fn begin_handoff(&mut self, text: String, audio: Option<AudioBlob>) {
        self.session.pending_audio = None;

        let Some(service) = self.service.clone() else {
            warn!("No transcription service configured; delivering local transcript");
            self.handler.on_transcript(&text, true);
            self.set_state(SessionState::Idle);
            return;
        };

        let request = BackendRequest::new(text.clone(), self.session.user_id.clone(), audio);
        self.session.handoff_transcript = Some(text);
        self.handoff = Some(Box::pin(async move { service.send(request).await }));
        self.set_state(SessionState::HandingOff);
    }

    fn on_backend_result(&mut self, result: BackendResult) {
        let transcript = self.session.handoff_transcript.take().unwrap_or_default();
        self.session.clear();

        match result {
            Ok(payload) => {
                info!("Delivering backend response");
                self.handler.on_backend_response(payload);
            }
            Err(e) => {
                info!("Hand-off failed, falling back to local transcript");
                self.handler.on_transcript(&transcript, true);
                self.report_error(e);
            }
        }

        self.set_state(SessionState::Idle);
    }

    fn on_recognition_error(&mut self, code: String) {
        if self.session.state != SessionState::Listening {
            debug!("Ignoring recognizer error outside listening: {}", code);
            return;
        }

        self.recognizer.stop();
        self.recorder.stop();
        self.session.clear();
        self.report_error(VoiceError::Recognition(code));
        self.end_voice();
        self.set_state(SessionState::Idle);
    }

    /// Stop both adapters; the recording is kept for a trailing final
    fn stop_listening(&mut self) {
        self.recognizer.stop();
        if let Some(blob) = self.recorder.stop() {
            self.session.pending_audio = Some(blob);
        }
        self.end_voice();
    }

    /// Surface an error to the host; the session itself is handled by the caller
    fn report_error(&mut self, error: VoiceError) {
        if error.is_fatal() {
            error!("Voice session error: {}", error);
        } else {
            warn!("Voice session continuing after: {}", error);
        }
        self.handler.on_error(&error.to_string());
    }

    fn end_voice(&mut self) {
        if !self.session.voice_end_sent {
            self.session.voice_end_sent = true;
            self.handler.on_voice_end();
        }
    }

    fn teardown(&mut self) {
        info!("Tearing down voice session");
        self.recognizer.abort();
        self.recorder.stop();
        if self.handoff.take().is_some() {
            warn!("Cancelled in-flight hand-off");
        }
        self.session.clear();
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.session.state != state {
            info!("Session state {:?} -> {:?}", self.session.state, state);
        }
        self.session.state = state;
        self.state_tx.send_replace(state);
    }
}

async fn poll_handoff(handoff: &mut Option<HandoffFuture>) -> BackendResult {
    match handoff.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
