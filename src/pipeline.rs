//! Batch respeak pipeline implementation.
//!
//! Orchestrates the complete video-to-speech flow:
//! transcode → recognize → synthesize
//!
//! While recognition runs, the capture loop drains segment lines from the
//! shared transcript buffer every poll period and speaks each delta, so the
//! English rendition starts playing long before the full pass finishes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{RespeakError, Result};
use crate::models::download::{ensure_model, find_any_installed_model, model_path};
use crate::playback::RodioPlayer;
use crate::stt::recognizer::{Recognizer, SegmentSink};
use crate::stt::whisper::{WhisperConfig, WhisperRecognizer};
use crate::transcode::Transcoder;
use crate::transcript::{CaptureLoop, TranscriptBuffer};
use crate::tts::{OpenAiBackend, Synthesizer};
use crate::workspace::{Workspace, base_name};

/// Run the batch command: transcode → recognize → synthesize.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `file` - Source video, resolved inside `sources/` when not a path
/// * `model` - Optional model override from CLI
/// * `voice` - Optional voice override from CLI
/// * `poll_period` - Optional capture poll period override from CLI
/// * `quiet` - Suppress status messages
/// * `verbosity` - Echo recognition lines and report loop stats (1+)
/// * `no_download` - Prevent automatic model download
///
/// # Returns
/// Ok(()) on success, or an error if any step fails
#[allow(clippy::too_many_arguments)]
pub async fn run_batch_command(
    mut config: Config,
    file: String,
    model: Option<String>,
    voice: Option<String>,
    poll_period: Option<Duration>,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(v) = voice {
        config.tts.voice = v;
    }

    // Credential check comes first: a missing key must fail before any
    // directory, ffmpeg, or model work. The blocking HTTP client may not
    // run on async worker threads, so it is built off the runtime.
    let voice = config.tts.voice.clone();
    let tts_model = config.tts.model.clone();
    let backend = tokio::task::spawn_blocking(move || OpenAiBackend::from_env(&voice, &tts_model))
        .await
        .map_err(|e| RespeakError::Synthesis {
            message: format!("Credential check task failed: {e}"),
        })??;

    let workspace = Workspace::new(
        config
            .workspace
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    );
    workspace.create_layout()?;

    let source = resolve_source(&workspace, &file)?;
    let base = base_name(&source)?;

    // Step 1: extract the audio track as 16 kHz mono mp3
    let audio_path = workspace.transcoded_audio(&base);
    if !quiet {
        eprintln!("Extracting audio from {}...", source.display());
    }
    Transcoder::system().extract_audio(&source, &audio_path)?;

    // Step 2: load the model (the slow part, may download first)
    if !quiet {
        eprintln!("Loading model '{}'...", config.stt.model);
    }
    let recognizer = create_recognizer(&config, &workspace, quiet, no_download).await?;

    // Step 3: recognize, with the respeak loop draining segments on the side
    let buffer = Arc::new(TranscriptBuffer::new());
    let dispatcher = Dispatcher::new(Synthesizer::new(backend.clone()), RodioPlayer::new());
    let period =
        poll_period.unwrap_or_else(|| Duration::from_secs(config.capture.poll_period_secs));
    let capture = CaptureLoop::new(Arc::clone(&buffer), workspace.subtitle_log(), dispatcher)
        .with_poll_period(period);
    let handle = capture.start()?;

    if !quiet {
        eprintln!("Transcribing file: {}", audio_path.display());
    }

    let sink: Arc<dyn SegmentSink> = if verbosity > 0 {
        Arc::new(EchoingSink {
            inner: Arc::clone(&buffer),
        })
    } else {
        buffer
    };

    // Recognition is CPU-bound; keep it off the async runtime.
    let recognition = {
        let audio = audio_path.clone();
        tokio::task::spawn_blocking(move || recognizer.recognize(&audio, sink))
            .await
            .map_err(|e| RespeakError::Recognition {
                message: format!("Recognition task failed: {e}"),
            })
    };

    let text = match recognition {
        Ok(Ok(text)) => text,
        Ok(Err(e)) | Err(e) => {
            // Stop the speaker loop before surfacing the failure.
            if let Err(stop_err) = handle.stop() {
                eprintln!("respeak: {stop_err}");
            }
            return Err(e);
        }
    };

    // Recognition is done; flush the tail and collect loop stats.
    let stats = handle.stop()?;
    if stats.errors > 0 {
        eprintln!(
            "respeak: {} capture cycle error(s) during this run",
            stats.errors
        );
    }
    if verbosity > 0 {
        eprintln!(
            "Capture loop: {} cycles, {} deltas spoken, {} chars",
            stats.cycles, stats.deltas_dispatched, stats.chars_captured
        );
    }

    // Step 4: final transcript and speech outputs
    let transcript_path = workspace.transcript_output(&base);
    fs::write(&transcript_path, &text)?;
    println!("Text content written to file {}", transcript_path.display());

    if !quiet {
        eprintln!("Generating speech for {} characters...", text.chars().count());
    }
    let synthesizer = Synthesizer::new(backend);
    let audio_content = tokio::task::spawn_blocking(move || synthesizer.synthesize(&text))
        .await
        .map_err(|e| RespeakError::Synthesis {
            message: format!("Synthesis task failed: {e}"),
        })??;

    let speech_path = workspace.speech_output(&base);
    fs::write(&speech_path, &audio_content)?;
    println!("Audio content written to file {}", speech_path.display());

    if !quiet {
        println!("Done!");
    }

    Ok(())
}

/// Mirrors recognition lines to stdout while still feeding the buffer,
/// matching the engine's verbose output.
struct EchoingSink {
    inner: Arc<TranscriptBuffer>,
}

impl SegmentSink for EchoingSink {
    fn accept_line(&self, line: &str) {
        println!("{line}");
        self.inner.push_line(line);
    }
}

/// Create the recognizer, handling model download if needed.
async fn create_recognizer(
    config: &Config,
    workspace: &Workspace,
    quiet: bool,
    no_download: bool,
) -> Result<WhisperRecognizer> {
    let model_file =
        resolve_model_file(&workspace.models_dir(), &config.stt.model, quiet, no_download).await?;
    WhisperRecognizer::new(WhisperConfig::new(model_file))
}

/// Resolve the configured model to an installed file.
///
/// [`ensure_model`] owns the installed/missing/download transitions; this
/// adds only the `--no-download` fallback to any already-installed model.
async fn resolve_model_file(
    models_dir: &Path,
    configured_model: &str,
    quiet: bool,
    no_download: bool,
) -> Result<PathBuf> {
    match ensure_model(models_dir, configured_model, !no_download, !quiet).await {
        Ok(path) => Ok(path),
        // Missing and not allowed to download: fall back to anything installed.
        Err(RespeakError::ModelNotFound { .. }) => {
            if let Some(fallback) = find_any_installed_model(models_dir) {
                if !quiet {
                    eprintln!(
                        "Model '{}' not installed (--no-download). Using '{}'.",
                        configured_model, fallback
                    );
                }
                Ok(model_path(models_dir, &fallback))
            } else {
                Err(RespeakError::Recognition {
                    message: format!(
                        "Model '{}' not installed and --no-download specified.\n\
                         Run: respeak models install {}",
                        configured_model, configured_model
                    ),
                })
            }
        }
        Err(e) => Err(e),
    }
}

/// Resolve the source video argument to an on-disk path.
///
/// Supports several forms:
/// - Absolute or existing relative path: used directly
/// - Bare file name: looked up under the workspace `sources/` directory
fn resolve_source(workspace: &Workspace, file: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(file);
    if direct.exists() {
        return Ok(direct);
    }

    if !(file.contains('/') || file.contains('\\')) {
        let in_sources = workspace.sources_dir().join(file);
        if in_sources.exists() {
            return Ok(in_sources);
        }
    }

    Err(RespeakError::Other(format!(
        "Source file '{}' not found. Place it in {} or pass a full path.",
        file,
        workspace.sources_dir().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_model(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("ggml-{name}.bin")), b"fake model").unwrap();
    }

    #[test]
    fn test_resolve_source_with_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mp4");
        fs::write(&video, b"fake video").unwrap();

        let workspace = Workspace::new(dir.path());
        let resolved = resolve_source(&workspace, video.to_str().unwrap()).unwrap();
        assert_eq!(resolved, video);
    }

    #[test]
    fn test_resolve_source_with_bare_name_in_sources() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.create_layout().unwrap();
        fs::write(workspace.sources_dir().join("talk.mp4"), b"fake video").unwrap();

        let resolved = resolve_source(&workspace, "talk.mp4").unwrap();
        assert_eq!(resolved, workspace.sources_dir().join("talk.mp4"));
    }

    #[test]
    fn test_resolve_source_missing_file_mentions_sources_dir() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.create_layout().unwrap();

        let result = resolve_source(&workspace, "absent.mp4");
        match result {
            Err(RespeakError::Other(message)) => {
                assert!(message.contains("absent.mp4"));
                assert!(message.contains("sources"));
            }
            _ => panic!("Expected error for missing source file"),
        }
    }

    #[test]
    fn test_resolve_source_skips_sources_lookup_for_paths() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.create_layout().unwrap();
        fs::write(workspace.sources_dir().join("talk.mp4"), b"fake video").unwrap();

        // A separator means the caller gave a path, so no sources/ lookup.
        assert!(resolve_source(&workspace, "elsewhere/talk.mp4").is_err());
    }

    #[tokio::test]
    async fn test_resolve_model_file_uses_installed_model() {
        let dir = tempfile::tempdir().unwrap();
        touch_model(dir.path(), "small");

        let path = resolve_model_file(dir.path(), "small", true, true)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("ggml-small.bin"));
    }

    #[tokio::test]
    async fn test_resolve_model_file_no_download_falls_back_to_installed() {
        let dir = tempfile::tempdir().unwrap();
        touch_model(dir.path(), "tiny.en");

        let path = resolve_model_file(dir.path(), "small", true, true)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("ggml-tiny.en.bin"));
    }

    #[tokio::test]
    async fn test_resolve_model_file_no_download_without_fallback_suggests_install() {
        let dir = tempfile::tempdir().unwrap();

        let result = resolve_model_file(dir.path(), "small", true, true).await;
        match result {
            Err(RespeakError::Recognition { message }) => {
                assert!(message.contains("respeak models install small"));
            }
            _ => panic!("Expected Recognition error with no installed model"),
        }
    }

    #[test]
    fn test_echoing_sink_feeds_buffer() {
        let buffer = Arc::new(TranscriptBuffer::new());
        let sink = EchoingSink {
            inner: Arc::clone(&buffer),
        };

        sink.accept_line("[00:00.000 --> 00:01.000]  Hi");
        assert_eq!(
            buffer.drain().unwrap(),
            "[00:00.000 --> 00:01.000]  Hi\n"
        );
    }
}
