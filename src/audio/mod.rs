pub mod capture;
pub mod file;
pub mod input;

pub use capture::{AudioBlob, AudioCaptureAdapter};
pub use file::FileAudioInput;
pub use input::{AudioChunk, AudioInput, AudioInputConfig};
