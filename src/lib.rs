//! respeak - Respeak recorded videos as English text and speech
//!
//! Turns a recorded video into an English transcript and synthesized
//! speech, speaking recognized lines aloud while recognition is still
//! running.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod playback;
pub mod report;
pub mod stt;
pub mod transcode;
pub mod transcript;
pub mod tts;
pub mod workspace;

// Core traits (recognize → speak → play)
pub use playback::{AudioPlayer, RodioPlayer};
pub use stt::recognizer::{Recognizer, SegmentSink};
pub use transcode::{CommandRunner, SystemCommandRunner, Transcoder};
pub use tts::synthesizer::{SpeechBackend, Synthesizer};

// Capture loop
pub use dispatch::Dispatcher;
pub use transcript::buffer::TranscriptBuffer;
pub use transcript::capture::{CaptureHandle, CaptureLoop, CaptureStats};

// Error handling
pub use error::{RespeakError, Result};
pub use report::{ErrorReporter, LogReporter};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.1.0+<hash>"
        // In CI without git, expect plain "0.1.0"
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
