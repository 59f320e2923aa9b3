//! Default configuration constants for respeak.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default channel count for transcoded audio.
///
/// Speech recognition models expect mono input; stereo sources are downmixed
/// during transcoding.
pub const CHANNELS: u16 = 1;

/// Default audio bitrate passed to the transcoder.
///
/// 64 kbit/s is plenty for speech and keeps extracted audio files small.
pub const AUDIO_BITRATE: &str = "64k";

/// Default Whisper model name.
///
/// "small" trades a little accuracy for much faster batch runs on CPU.
/// Use "medium" or "large" for harder material.
pub const DEFAULT_MODEL: &str = "small";

/// Language code passed to the recognizer.
///
/// Recognition output is pinned to English regardless of the source
/// language.
pub const ENGLISH_LANGUAGE: &str = "en";

/// Suffix for English-only model variants.
pub const ENGLISH_ONLY_SUFFIX: &str = ".en";

/// Default synthesis voice.
pub const DEFAULT_VOICE: &str = "nova";

/// Default synthesis model.
pub const SYNTHESIS_MODEL: &str = "tts-1";

/// Maximum characters per synthesis request.
///
/// The speech endpoint rejects inputs above 4096 characters; staying at 4000
/// leaves headroom and keeps chunk boundaries predictable.
pub const SYNTHESIS_CHAR_LIMIT: usize = 4000;

/// Default capture poll period in seconds.
///
/// How often the capture loop drains the shared transcript buffer while
/// recognition is running. 2 seconds keeps spoken playback close behind the
/// recognizer without hammering the synthesis endpoint.
pub const POLL_PERIOD_SECS: u64 = 2;

/// Directory holding input recordings, relative to the workspace root.
pub const SOURCES_DIR: &str = "sources";

/// Directory holding extracted audio, relative to the workspace root.
pub const AUDIO_DIR: &str = "sources/audio";

/// Directory holding transcripts and synthesized speech, relative to the
/// workspace root.
pub const OUTPUTS_DIR: &str = "outputs";

/// Directory holding downloaded recognition models, relative to the
/// workspace root.
pub const MODELS_DIR: &str = "models";

/// File name of the live subtitle log inside the outputs directory.
pub const SUBTITLE_LOG: &str = "subs-en.txt";

/// Speech synthesis endpoint.
pub const SPEECH_ENDPOINT: &str = "https://api.openai.com/v1/audio/speech";

/// Environment variable holding the synthesis API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn synthesis_limit_stays_under_endpoint_cap() {
        assert!(SYNTHESIS_CHAR_LIMIT <= 4096);
    }
}
