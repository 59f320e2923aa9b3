//! Audio playback through the default output device.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rodio::{Decoder, OutputStream, Sink};

use crate::error::{RespeakError, Result};

/// Trait for synchronous audio playback.
///
/// This trait allows swapping implementations (real speaker output vs mock).
pub trait AudioPlayer: Send + Sync {
    /// Play the audio file at `path`, blocking until playback finishes.
    fn play(&self, path: &Path) -> Result<()>;
}

/// Implement AudioPlayer for Arc<T> to allow sharing across threads.
impl<T: AudioPlayer> AudioPlayer for Arc<T> {
    fn play(&self, path: &Path) -> Result<()> {
        (**self).play(path)
    }
}

/// Speaker playback via rodio's default output stream.
///
/// The output device is opened per call; playback happens one file at a
/// time, so there is nothing to keep alive between calls.
#[derive(Debug, Clone, Default)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| RespeakError::Playback {
            message: format!("Failed to decode {}: {}", path.display(), e),
        })?;

        let (_stream, stream_handle) =
            OutputStream::try_default().map_err(|e| RespeakError::Playback {
                message: format!("Failed to open audio output: {}", e),
            })?;
        let sink = Sink::try_new(&stream_handle).map_err(|e| RespeakError::Playback {
            message: format!("Failed to create playback sink: {}", e),
        })?;

        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Mock player for testing.
///
/// Records the contents of every played file instead of producing sound.
/// With the mock speech backend returning chunk text as audio bytes, the
/// recorded contents read back as the text that was "spoken".
pub struct MockPlayer {
    plays: Mutex<Vec<String>>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
    should_fail: bool,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self {
            plays: Mutex::new(Vec::new()),
            journal: None,
            should_fail: false,
        }
    }

    /// Configure the mock to fail every play call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Share an event journal with other mocks.
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Contents of every file played so far, in order.
    pub fn plays(&self) -> Vec<String> {
        self.plays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for MockPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let content = String::from_utf8_lossy(&std::fs::read(path)?).to_string();
        self.plays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(content.clone());
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(format!("play:{}", content));
        }
        if self.should_fail {
            return Err(RespeakError::Playback {
                message: "mock playback failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn mock_player_records_played_contents() {
        let player = MockPlayer::new();

        let mut first = NamedTempFile::new().unwrap();
        first.write_all(b"first audio").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        second.write_all(b"second audio").unwrap();

        player.play(first.path()).unwrap();
        player.play(second.path()).unwrap();

        assert_eq!(player.plays(), vec!["first audio", "second audio"]);
    }

    #[test]
    fn mock_player_failure_still_records() {
        let player = MockPlayer::new().with_failure();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"doomed audio").unwrap();

        let result = player.play(file.path());
        assert!(result.is_err());
        assert_eq!(player.plays(), vec!["doomed audio"]);
    }

    #[test]
    fn mock_player_journal_records_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let player = MockPlayer::new().with_journal(Arc::clone(&journal));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        player.play(file.path()).unwrap();

        assert_eq!(journal.lock().unwrap().clone(), vec!["play:hello"]);
    }

    #[test]
    fn rodio_player_fails_on_missing_file() {
        let player = RodioPlayer::new();
        let result = player.play(Path::new("/nonexistent/audio.mp3"));
        assert!(result.is_err());
    }
}
