//! Speech synthesis.
//!
//! A [`Synthesizer`] turns text of any length into one audio byte buffer by
//! slicing it into backend-sized chunks; the [`SpeechBackend`] trait is the
//! seam between that chunking logic and the actual speech endpoint.

pub mod openai;
pub mod synthesizer;

pub use openai::OpenAiBackend;
pub use synthesizer::{MockSpeechBackend, SpeechBackend, Synthesizer, chunk_text};
