//! Command-line interface for respeak
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Respeak recorded videos as English text and speech
#[derive(Parser, Debug)]
#[command(
    name = "respeak",
    version = crate::version_string(),
    about = "Respeak recorded videos as English text and speech"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source video to respeak (looked up in sources/ when not a path)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: echo recognition lines and loop stats)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recognition model (default: small). Use small.en for English-only sources
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Synthesis voice (default: nova)
    #[arg(long, value_name = "VOICE")]
    pub voice: Option<String>,

    /// Workspace directory holding sources/, outputs/, and models/
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Capture poll period (default: 2s). Examples: 2s, 500ms, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_poll_period)]
    pub poll_period: Option<Duration>,

    /// Prevent automatic model download if configured model is missing
    #[arg(long)]
    pub no_download: bool,
}

/// Parse a poll period string into a duration.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`2s`, `500ms`), and compound (`1m30s`). Zero is rejected;
/// the capture loop sleeps for this long between drains.
fn parse_poll_period(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    let period = if let Ok(secs) = s.parse::<u64>() {
        Duration::from_secs(secs)
    } else {
        humantime::parse_duration(s).map_err(|e| e.to_string())?
    };
    if period.is_zero() {
        return Err("poll period must be greater than zero".to_string());
    }
    Ok(period)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage recognition models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,
    /// Download and install a model
    Install {
        /// Model name (e.g., tiny, base.en, small)
        name: String,
    },
}
