use std::sync::{Arc, Mutex};

use crate::defaults;
use crate::error::{RespeakError, Result};

/// Trait for a speech synthesis backend.
///
/// One call synthesizes one chunk of text, already sized to fit the
/// backend's input limit. This trait allows swapping implementations
/// (real endpoint vs mock).
pub trait SpeechBackend: Send + Sync {
    /// Synthesize one chunk of text, returning encoded audio bytes.
    fn request_speech(&self, text: &str) -> Result<Vec<u8>>;
}

/// Implement SpeechBackend for Arc<T> to allow sharing across threads.
impl<T: SpeechBackend> SpeechBackend for Arc<T> {
    fn request_speech(&self, text: &str) -> Result<Vec<u8>> {
        (**self).request_speech(text)
    }
}

/// Split text into consecutive slices of at most `limit` characters.
///
/// Slices break on character boundaries, never mid-codepoint, and make no
/// attempt to respect word or sentence boundaries. Empty input yields no
/// slices.
pub fn chunk_text(text: &str, limit: usize) -> Vec<&str> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == limit {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Chunking speech synthesizer.
///
/// Accepts text of any length, slices it to the backend's character limit,
/// requests each slice in order (the next request starts only after the
/// previous one returned), and concatenates the audio byte sequences. Any
/// failed slice fails the whole synthesis with no partial result.
pub struct Synthesizer<B: SpeechBackend> {
    backend: B,
    chunk_limit: usize,
}

impl<B: SpeechBackend> Synthesizer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            chunk_limit: defaults::SYNTHESIS_CHAR_LIMIT,
        }
    }

    /// Override the per-request character limit.
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.max(1);
        self
    }

    /// Synthesize `text` into one audio byte buffer.
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let mut audio = Vec::new();
        for chunk in chunk_text(text, self.chunk_limit) {
            let bytes = self.backend.request_speech(chunk)?;
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }
}

/// Mock speech backend for testing.
///
/// Records every requested chunk and returns the chunk's own bytes as
/// "audio", so concatenation order is directly observable. An optional
/// shared journal lets tests interleave synthesis events with playback
/// events from other mocks.
pub struct MockSpeechBackend {
    calls: Mutex<Vec<String>>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
    fail_from_call: Option<usize>,
}

impl MockSpeechBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            journal: None,
            fail_from_call: None,
        }
    }

    /// Configure the mock to fail every request.
    pub fn with_failure(self) -> Self {
        self.with_failure_from_call(0)
    }

    /// Configure the mock to fail from the given zero-based call index on.
    pub fn with_failure_from_call(mut self, index: usize) -> Self {
        self.fail_from_call = Some(index);
        self
    }

    /// Share an event journal with other mocks.
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// All chunk texts requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockSpeechBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechBackend for MockSpeechBackend {
    fn request_speech(&self, text: &str) -> Result<Vec<u8>> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push(text.to_string());
            calls.len() - 1
        };
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(format!("synth:{}", text));
        }
        if let Some(fail_from) = self.fail_from_call
            && call_index >= fail_from
        {
            return Err(RespeakError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        Ok(text.as_bytes().to_vec())
    }
}
