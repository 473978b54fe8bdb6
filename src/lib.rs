pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod recognition;
pub mod session;
pub mod transcription;

pub use audio::{AudioBlob, AudioCaptureAdapter, AudioChunk, AudioInput, AudioInputConfig, FileAudioInput};
pub use config::Config;
pub use error::VoiceError;
pub use http::{create_router, AppState};
pub use recognition::{
    RecognitionEngine, RecognizerEvent, RecognizerSink, ScriptedRecognizer, SpeechRecognitionAdapter,
    TranscriptEvent,
};
pub use session::{
    wait_for_outcome, ChannelHandler, ControllerHandle, SessionConfig, SessionState, VoiceEvent, VoiceSessionController,
    VoiceSessionHandler,
};
pub use transcription::{BackendRequest, BackendResult, BackendTranscriptionClient, TranscriptionService};
