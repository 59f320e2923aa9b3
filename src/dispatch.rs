//! Streaming dispatch: turn one text delta into sound.

use std::io::Write;

use crate::error::Result;
use crate::playback::AudioPlayer;
use crate::tts::synthesizer::{SpeechBackend, Synthesizer};

/// Synthesizes a text delta and plays it, blocking until playback ends.
///
/// No retry anywhere: a synthesis or playback failure surfaces to the
/// caller, which decides whether the run continues.
pub struct Dispatcher<B: SpeechBackend, P: AudioPlayer> {
    synthesizer: Synthesizer<B>,
    player: P,
}

impl<B: SpeechBackend, P: AudioPlayer> Dispatcher<B, P> {
    pub fn new(synthesizer: Synthesizer<B>, player: P) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Speak `text`: synthesize it (chunked as needed), stage the audio
    /// bytes in a temporary file, and play that file to completion.
    ///
    /// Callers pass non-empty text; empty deltas are filtered out before
    /// dispatch. The temporary file is removed when this returns.
    pub fn dispatch(&self, text: &str) -> Result<()> {
        let audio = self.synthesizer.synthesize(text)?;

        let mut staged = tempfile::Builder::new()
            .prefix("respeak-")
            .suffix(".mp3")
            .tempfile()?;
        staged.write_all(&audio)?;
        staged.flush()?;

        self.player.play(staged.path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::MockPlayer;
    use crate::tts::synthesizer::MockSpeechBackend;
    use std::sync::{Arc, Mutex};

    #[test]
    fn dispatch_synthesizes_then_plays() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let backend = MockSpeechBackend::new().with_journal(Arc::clone(&journal));
        let player = Arc::new(MockPlayer::new().with_journal(Arc::clone(&journal)));
        let dispatcher = Dispatcher::new(Synthesizer::new(backend), Arc::clone(&player));

        dispatcher.dispatch("hello world").unwrap();

        assert_eq!(player.plays(), vec!["hello world"]);
        assert_eq!(
            journal.lock().unwrap().clone(),
            vec!["synth:hello world", "play:hello world"]
        );
    }

    #[test]
    fn dispatch_plays_chunked_synthesis_as_one_file() {
        let player = Arc::new(MockPlayer::new());
        let synthesizer = Synthesizer::new(MockSpeechBackend::new()).with_chunk_limit(4);
        let dispatcher = Dispatcher::new(synthesizer, Arc::clone(&player));

        dispatcher.dispatch("abcdefghij").unwrap();

        // Three backend chunks, one playback of the concatenated audio.
        assert_eq!(player.plays(), vec!["abcdefghij"]);
    }

    #[test]
    fn dispatch_propagates_synthesis_failure_without_playing() {
        let player = Arc::new(MockPlayer::new());
        let backend = MockSpeechBackend::new().with_failure();
        let dispatcher = Dispatcher::new(Synthesizer::new(backend), Arc::clone(&player));

        let result = dispatcher.dispatch("doomed");
        assert!(result.is_err());
        assert!(player.plays().is_empty());
    }

    #[test]
    fn dispatch_propagates_playback_failure() {
        let player = MockPlayer::new().with_failure();
        let dispatcher = Dispatcher::new(Synthesizer::new(MockSpeechBackend::new()), player);

        let result = dispatcher.dispatch("doomed");
        assert!(result.is_err());
    }
}
