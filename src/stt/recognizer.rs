//! Recognition seams.
//!
//! The engine does its incremental reporting through [`SegmentSink`]: every
//! decoded segment becomes one formatted transcript line handed to the sink
//! while the blocking `recognize` call is still running. The shared
//! [`TranscriptBuffer`] is the production sink, which is what makes the
//! capture loop's periodic drains possible.

use std::path::Path;
use std::sync::Arc;

use crate::error::{RespeakError, Result};
use crate::transcript::buffer::TranscriptBuffer;
use crate::transcript::line;

/// Receiver of per-segment transcript lines during recognition.
pub trait SegmentSink: Send + Sync {
    /// Accept one complete formatted line.
    fn accept_line(&self, line: &str);
}

/// The transcript buffer is the standard sink: recognition appends lines,
/// the capture loop drains them.
impl SegmentSink for TranscriptBuffer {
    fn accept_line(&self, line: &str) {
        self.push_line(line);
    }
}

/// Trait for speech recognition over a finished audio file.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Recognizer: Send + Sync {
    /// Recognize the audio file at `audio_path`.
    ///
    /// Blocks for the whole file. Emits one formatted line per segment to
    /// `sink` as decoding progresses, and returns the full transcript text
    /// on completion.
    fn recognize(&self, audio_path: &Path, sink: Arc<dyn SegmentSink>) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the recognizer is ready
    fn is_ready(&self) -> bool;
}

/// Implement Recognizer for Arc<T> to allow sharing across threads.
impl<T: Recognizer> Recognizer for Arc<T> {
    fn recognize(&self, audio_path: &Path, sink: Arc<dyn SegmentSink>) -> Result<String> {
        (**self).recognize(audio_path, sink)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock recognizer for testing.
///
/// Emits its configured segments to the sink, timestamped in centiseconds,
/// and returns the joined text, mirroring how the real engine reports.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    model_name: String,
    segments: Vec<(i64, i64, String)>,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a new mock recognizer with no segments.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: Vec::new(),
            should_fail: false,
        }
    }

    /// Append a segment to emit, with start and end in centiseconds.
    pub fn with_segment(mut self, start_cs: i64, end_cs: i64, text: &str) -> Self {
        self.segments.push((start_cs, end_cs, text.to_string()));
        self
    }

    /// Configure the mock to fail on recognize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(&self, _audio_path: &Path, sink: Arc<dyn SegmentSink>) -> Result<String> {
        if self.should_fail {
            return Err(RespeakError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }

        let mut full = String::new();
        for (start, end, text) in &self.segments {
            // Segment texts carry their native leading space on the wire.
            sink.accept_line(&line::format_line(*start, *end, &format!(" {}", text)));
            full.push(' ');
            full.push_str(text);
        }
        Ok(full.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
