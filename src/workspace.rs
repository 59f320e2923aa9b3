//! Workspace layout.
//!
//! All input and output files live under one workspace root:
//!
//! ```text
//! <root>/sources/         input recordings
//! <root>/sources/audio/   extracted audio tracks
//! <root>/outputs/         transcripts and synthesized speech
//! <root>/models/          downloaded recognition models
//! ```
//!
//! Output files are keyed by the input's base name, the portion of the file
//! name before the first `.`.

use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{RespeakError, Result};

/// Resolved workspace root with path derivation helpers.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory layout, tolerating directories that already exist.
    pub fn create_layout(&self) -> Result<()> {
        std::fs::create_dir_all(self.sources_dir())?;
        std::fs::create_dir_all(self.audio_dir())?;
        std::fs::create_dir_all(self.outputs_dir())?;
        std::fs::create_dir_all(self.models_dir())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join(defaults::SOURCES_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(defaults::AUDIO_DIR)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join(defaults::OUTPUTS_DIR)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(defaults::MODELS_DIR)
    }

    /// The live subtitle log, truncated at the start of every run.
    pub fn subtitle_log(&self) -> PathBuf {
        self.outputs_dir().join(defaults::SUBTITLE_LOG)
    }

    /// Where the transcoder writes the extracted audio track.
    pub fn transcoded_audio(&self, base: &str) -> PathBuf {
        self.audio_dir().join(format!("{base}.mp3"))
    }

    /// The final English transcript for one input.
    pub fn transcript_output(&self, base: &str) -> PathBuf {
        self.outputs_dir().join(format!("{base}-en.txt"))
    }

    /// The final synthesized speech for one input.
    pub fn speech_output(&self, base: &str) -> PathBuf {
        self.outputs_dir().join(format!("{base}-en.mp3"))
    }
}

/// Base name of an input file: everything before the first `.` in the file
/// name. `talk.v1.mp4` keys its outputs as `talk`.
pub fn base_name(input: &Path) -> Result<String> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RespeakError::Other(format!("Input path has no file name: {}", input.display())))?;
    let base = file_name.split('.').next().unwrap_or(file_name);
    Ok(base.to_string())
}
