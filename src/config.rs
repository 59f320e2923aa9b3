use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{RespeakError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub stt: SttConfig,
    pub tts: TtsConfig,
    pub capture: CaptureConfig,
}

/// Workspace location configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root; the current directory when unset.
    pub root: Option<PathBuf>,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TtsConfig {
    pub voice: String,
    pub model: String,
}

/// Capture loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub poll_period_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: defaults::DEFAULT_VOICE.to_string(),
            model: defaults::SYNTHESIS_MODEL.to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_period_secs: defaults::POLL_PERIOD_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(RespeakError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                // Re-panic on invalid TOML or other errors
                panic!("Failed to load config from {}: {}", path.display(), e);
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - RESPEAK_MODEL → stt.model
    /// - RESPEAK_VOICE → tts.voice
    /// - RESPEAK_WORKSPACE → workspace.root
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("RESPEAK_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(voice) = std::env::var("RESPEAK_VOICE")
            && !voice.is_empty()
        {
            self.tts.voice = voice;
        }

        if let Ok(root) = std::env::var("RESPEAK_WORKSPACE")
            && !root.is_empty()
        {
            self.workspace.root = Some(PathBuf::from(root));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/respeak/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("respeak")
            .join("config.toml")
    }
}
