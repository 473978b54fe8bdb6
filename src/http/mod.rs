//! Loopback transcription endpoint
//!
//! Implements the server side of the hand-off wire contract so sessions can
//! be exercised end to end without the real service:
//! - POST /api/process - Accept a multipart hand-off, echo the transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
