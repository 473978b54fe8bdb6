//! Streaming local speech recognition
//!
//! A `RecognitionEngine` is the raw capability (native speech API, remote
//! streaming recognizer, scripted replay). `SpeechRecognitionAdapter` wraps
//! one and adds the session rules: a single "unsupported" report, idempotent
//! start, and generation-stamped events so the controller can drop events
//! that belong to an earlier session.

mod adapter;
mod engine;
mod scripted;

pub use adapter::SpeechRecognitionAdapter;
pub use engine::{
    RecognitionEngine, RecognizerEvent, RecognizerSink, StampedEvent, TranscriptEvent,
    UNSUPPORTED_CODE,
};
pub use scripted::{ScriptStep, ScriptedRecognizer};
