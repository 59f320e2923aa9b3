//! Error reporting for background stages.
//!
//! Failures inside the capture loop must not kill the recognition run, so
//! they are handed to a reporter instead of propagating. The default
//! reporter prints to stderr; tests collect.

use std::sync::Mutex;

use crate::error::RespeakError;

/// Trait for reporting stage errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a named stage.
    fn report(&self, stage: &str, error: &RespeakError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &RespeakError) {
        eprintln!("respeak: [{}] {}", stage, error);
    }
}

/// Reporter that collects errors for inspection in tests.
#[derive(Default)]
pub struct CollectingReporter {
    errors: Mutex<Vec<(String, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reported `(stage, message)` pairs so far, in order.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, stage: &str, error: &RespeakError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((stage.to_string(), error.to_string()));
    }
}
