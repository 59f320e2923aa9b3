//! Decoding extracted audio for recognition.
//!
//! The transcoder guarantees 16 kHz mono output; decoding re-checks that
//! contract before samples reach the recognition engine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, Source};

use crate::defaults;
use crate::error::{RespeakError, Result};

/// PCM samples plus the stream parameters they were decoded at.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Audio duration derived from sample count and stream parameters.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Decode an audio file into 16-bit PCM samples.
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path)?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| RespeakError::AudioDecode {
        message: format!("Failed to decode {}: {}", path.display(), e),
    })?;

    let sample_rate = decoder.sample_rate();
    let channels = decoder.channels();
    let samples: Vec<i16> = decoder.collect();

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Validate decoded audio against the recognition input contract.
pub fn expect_speech_format(audio: &DecodedAudio) -> Result<()> {
    if audio.sample_rate != defaults::SAMPLE_RATE || audio.channels != defaults::CHANNELS {
        return Err(RespeakError::AudioFormatMismatch {
            expected: format!(
                "{} Hz, {} channel(s)",
                defaults::SAMPLE_RATE,
                defaults::CHANNELS
            ),
            actual: format!("{} Hz, {} channel(s)", audio.sample_rate, audio.channels),
        });
    }
    Ok(())
}

/// Convert i16 audio samples to f32 normalized to [-1.0, 1.0].
///
/// The recognition engine expects float samples; input is 16-bit PCM where
/// samples range from -32768 to 32767.
pub fn to_float_samples(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}
