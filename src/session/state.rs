use serde::{Deserialize, Serialize};

use crate::audio::AudioBlob;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Listening,
    /// Backend round trip in flight
    HandingOff,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// The single live voice session, owned by the controller
#[derive(Debug)]
pub(crate) struct VoiceSession {
    pub state: SessionState,
    pub backend_mode: bool,
    pub user_id: Option<String>,
    /// Recognizer generation this session belongs to
    pub generation: u64,
    /// A final transcript may still arrive for this session
    pub accepting_final: bool,
    pub voice_end_sent: bool,
    /// Recording finalized before the final transcript arrived
    pub pending_audio: Option<AudioBlob>,
    /// Local final transcript kept for fallback while handing off
    pub handoff_transcript: Option<String>,
}

impl VoiceSession {
    pub fn new(backend_mode: bool, user_id: Option<String>) -> Self {
        Self {
            state: SessionState::Idle,
            backend_mode,
            user_id,
            generation: 0,
            accepting_final: false,
            voice_end_sent: true,
            pending_audio: None,
            handoff_transcript: None,
        }
    }

    /// Reset per-session fields for a new recognizer generation
    pub fn begin(&mut self, generation: u64) {
        self.generation = generation;
        self.accepting_final = true;
        self.voice_end_sent = false;
        self.pending_audio = None;
        self.handoff_transcript = None;
    }

    /// Drop everything left over from the current session
    pub fn clear(&mut self) {
        self.accepting_final = false;
        self.pending_audio = None;
        self.handoff_transcript = None;
    }
}
