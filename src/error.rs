//! Error types for respeak.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RespeakError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Credential errors
    #[error("Missing credential: {name} is not set{hint}")]
    MissingCredential { name: String, hint: String },

    // Transcoding errors
    #[error("Transcoder tool not found: {tool}")]
    TranscoderNotFound { tool: String },

    #[error("Transcoding failed: {message}")]
    TranscodeFailed { message: String },

    // Audio decode errors
    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    AudioFormatMismatch { expected: String, actual: String },

    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Recognition errors
    #[error("Recognition model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Speech synthesis errors
    #[error("Speech synthesis request failed: {message}")]
    Synthesis { message: String },

    #[error("Speech synthesis rejected with status {status}: {body}")]
    SynthesisRejected { status: u16, body: String },

    // Playback errors
    #[error("Audio playback failed: {message}")]
    Playback { message: String },

    // Capture loop errors
    #[error("Transcript capture failed: {message}")]
    Capture { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RespeakError>;
