//! Incremental transcript plumbing.
//!
//! The recognition engine produces timestamped lines as it works through a
//! file. This module holds the shared buffer those lines land in, the line
//! format itself, and the capture loop that periodically drains the buffer
//! and turns new lines into persisted text and spoken audio.

pub mod buffer;
pub mod capture;
pub mod line;

pub use buffer::TranscriptBuffer;
pub use capture::{CaptureHandle, CaptureLoop, CaptureStats};
pub use line::TranscriptLine;
