//! Audio extraction from video sources via ffmpeg.
//!
//! The recognition engine wants 16 kHz mono audio, so every source video is
//! first run through ffmpeg to strip the video stream and resample.
//!
//! The `CommandRunner` trait enables full testability without ffmpeg
//! installed.

use std::path::Path;
use std::process::Command;

use crate::defaults;
use crate::error::{RespeakError, Result};

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandRunner: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command fails or is not found.
    fn run(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command runner using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RespeakError::TranscoderNotFound {
                    tool: command.to_string(),
                }
            } else {
                RespeakError::TranscodeFailed {
                    message: format!("Failed to execute {}: {}", command, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RespeakError::TranscodeFailed {
                message: format!(
                    "{} failed with status {:?}: {}",
                    command, output.status, stderr
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Extracts the audio track from video files using a CommandRunner.
pub struct Transcoder<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Transcoder<R> {
    /// Create a new Transcoder with the given runner.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Extract the audio track of `input` into `output` as 16 kHz mono mp3.
    ///
    /// Overwrites `output` if it already exists. The parameters match what
    /// the recognition engine expects, so the decoded result passes the
    /// speech format check without resampling.
    pub fn extract_audio(&self, input: &Path, output: &Path) -> Result<()> {
        let input_str = path_str(input)?;
        let output_str = path_str(output)?;
        let channels = defaults::CHANNELS.to_string();
        let sample_rate = defaults::SAMPLE_RATE.to_string();

        self.runner
            .run(
                "ffmpeg",
                &[
                    "-i",
                    input_str,
                    "-vn",
                    "-ac",
                    &channels,
                    "-ab",
                    defaults::AUDIO_BITRATE,
                    "-ar",
                    &sample_rate,
                    "-y",
                    output_str,
                ],
            )
            .map_err(|e| match &e {
                RespeakError::TranscoderNotFound { tool } if tool == "ffmpeg" => {
                    RespeakError::TranscodeFailed {
                        message: "ffmpeg not found. Install it first:\n\
                            Ubuntu/Debian: sudo apt install ffmpeg\n\
                            Arch: sudo pacman -S ffmpeg\n\
                            macOS: brew install ffmpeg"
                            .to_string(),
                    }
                }
                _ => e,
            })?;

        Ok(())
    }
}

impl Transcoder<SystemCommandRunner> {
    /// Create a Transcoder with the system command runner.
    pub fn system() -> Self {
        Self::new(SystemCommandRunner::new())
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| RespeakError::Other(format!("Path {} is not valid UTF-8", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock command runner for testing.
    ///
    /// Records all invocations and returns configured responses.
    #[derive(Debug)]
    struct MockCommandRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        responses: Mutex<VecDeque<Result<String>>>,
    }

    impl MockCommandRunner {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(VecDeque::new()),
            }
        }

        fn with_error(self, error: RespeakError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for MockCommandRunner {
        fn run(&self, command: &str, args: &[&str]) -> Result<String> {
            self.calls.lock().unwrap().push((
                command.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[test]
    fn command_runner_is_object_safe() {
        let runner: Box<dyn CommandRunner> = Box::new(MockCommandRunner::new());
        assert!(runner.run("echo", &["test"]).is_ok());
    }

    #[test]
    fn command_runner_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn CommandRunner>>();
        assert_send_sync::<SystemCommandRunner>();
    }

    #[test]
    fn extract_audio_invokes_ffmpeg_with_speech_parameters() {
        let transcoder = Transcoder::new(MockCommandRunner::new());

        transcoder
            .extract_audio(
                Path::new("sources/talk.mp4"),
                Path::new("sources/audio/talk.mp3"),
            )
            .unwrap();

        let calls = transcoder.runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        assert_eq!(
            calls[0].1,
            vec![
                "-i",
                "sources/talk.mp4",
                "-vn",
                "-ac",
                "1",
                "-ab",
                "64k",
                "-ar",
                "16000",
                "-y",
                "sources/audio/talk.mp3",
            ]
        );
    }

    #[test]
    fn missing_ffmpeg_reports_installation_guidance() {
        let mock = MockCommandRunner::new().with_error(RespeakError::TranscoderNotFound {
            tool: "ffmpeg".to_string(),
        });
        let transcoder = Transcoder::new(mock);

        let result = transcoder.extract_audio(Path::new("in.mp4"), Path::new("out.mp3"));
        match result {
            Err(RespeakError::TranscodeFailed { message }) => {
                assert!(message.contains("ffmpeg not found"));
                assert!(message.contains("Install"));
            }
            _ => panic!("Expected TranscodeFailed with installation instructions"),
        }
    }

    #[test]
    fn nonzero_exit_propagates_stderr() {
        let mock = MockCommandRunner::new().with_error(RespeakError::TranscodeFailed {
            message: "ffmpeg failed with status ExitStatus(1): no such file".to_string(),
        });
        let transcoder = Transcoder::new(mock);

        let result = transcoder.extract_audio(Path::new("in.mp4"), Path::new("out.mp3"));
        match result {
            Err(RespeakError::TranscodeFailed { message }) => {
                assert!(message.contains("no such file"));
            }
            _ => panic!("Expected TranscodeFailed error"),
        }
    }

    #[test]
    fn system_runner_reports_missing_tool() {
        let runner = SystemCommandRunner::new();
        let result = runner.run("definitely-not-a-real-tool-48151623", &[]);
        match result {
            Err(RespeakError::TranscoderNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-tool-48151623");
            }
            _ => panic!("Expected TranscoderNotFound error"),
        }
    }

    #[test]
    fn system_constructor_builds() {
        let _transcoder = Transcoder::system();
    }
}
