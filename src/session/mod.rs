//! Voice session orchestration
//!
//! This module provides the `VoiceSessionController` that manages:
//! - Starting and stopping the recognizer and the recorder together
//! - Routing final transcripts locally or through the transcription service
//! - Falling back to the local transcript when the hand-off fails
//! - Releasing the recording device on every exit path

mod config;
mod controller;
mod events;
mod state;

pub use config::{SessionConfig, DEFAULT_LANGUAGE};
pub use controller::{ControllerCommand, ControllerHandle, VoiceSessionController};
pub use events::{wait_for_outcome, ChannelHandler, VoiceEvent, VoiceSessionHandler};
pub use state::SessionState;
