pub mod client;
pub mod messages;
mod parse;

pub use client::{BackendTranscriptionClient, TranscriptionService};
pub use messages::{
    BackendRequest, BackendResult, ProcessResponse, AUDIO_FIELD, AUDIO_FILE_NAME, AUDIO_MIME,
    DEFAULT_USER_ID,
};
pub use parse::interpret_body;
