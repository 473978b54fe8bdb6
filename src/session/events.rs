use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

use super::controller::ControllerHandle;
use super::state::SessionState;

/// Host-facing callbacks
///
/// `on_transcript` and `on_backend_response` are separate channels: in
/// backend mode an utterance resolves through exactly one of them.
pub trait VoiceSessionHandler: Send {
    fn on_transcript(&mut self, text: &str, is_final: bool);
    fn on_backend_response(&mut self, payload: Value);
    fn on_voice_start(&mut self);
    fn on_voice_end(&mut self);
    fn on_error(&mut self, message: &str);
}

/// Callback as a value
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    Transcript { text: String, is_final: bool },
    BackendResponse(Value),
    VoiceStart,
    VoiceEnd,
    Error(String),
}

/// Forwards every callback over a channel
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<VoiceEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<VoiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: VoiceEvent) {
        // Host may have stopped listening; nothing to do then
        let _ = self.tx.send(event);
    }
}

impl VoiceSessionHandler for ChannelHandler {
    fn on_transcript(&mut self, text: &str, is_final: bool) {
        self.forward(VoiceEvent::Transcript {
            text: text.to_string(),
            is_final,
        });
    }

    fn on_backend_response(&mut self, payload: Value) {
        self.forward(VoiceEvent::BackendResponse(payload));
    }

    fn on_voice_start(&mut self) {
        self.forward(VoiceEvent::VoiceStart);
    }

    fn on_voice_end(&mut self) {
        self.forward(VoiceEvent::VoiceEnd);
    }

    fn on_error(&mut self, message: &str) {
        self.forward(VoiceEvent::Error(message.to_string()));
    }
}

impl VoiceEvent {
    /// Whether this event resolves an utterance for the host
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            VoiceEvent::Transcript { is_final: true, .. } | VoiceEvent::BackendResponse(_)
        )
    }
}

/// Follow a session's events until it has produced its outcome
///
/// Returns true once the controller is idle and a final transcript or backend
/// response has been seen. Reaching idle without one (recognizer ended before
/// its last final, host stop, errors) keeps waiting until no event or state
/// change arrives for `settle`, then returns false. Every event is passed to
/// `on_event` as it arrives.
pub async fn wait_for_outcome(
    handle: &ControllerHandle,
    events: &mut mpsc::UnboundedReceiver<VoiceEvent>,
    settle: Duration,
    mut on_event: impl FnMut(&VoiceEvent),
) -> bool {
    let mut state = handle.subscribe();
    let mut resolved = false;

    loop {
        let idle = *state.borrow_and_update() == SessionState::Idle;
        if idle && resolved {
            return true;
        }

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    resolved |= event.is_outcome();
                    on_event(&event);
                }
                None => return resolved,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    return resolved;
                }
            }
            _ = tokio::time::sleep(settle), if idle => return resolved,
        }
    }
}
