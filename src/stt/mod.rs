//! Speech recognition.

pub mod recognizer;
pub mod whisper;

pub use recognizer::{MockRecognizer, Recognizer, SegmentSink};
pub use whisper::{WhisperConfig, WhisperRecognizer};
