//! OpenAI speech endpoint backend.
//!
//! One HTTP POST per chunk against the audio/speech endpoint, returning mp3
//! bytes. Uses the blocking client; synthesis always runs on plain worker
//! threads, never inside the async runtime.

use std::time::Duration;

use crate::defaults;
use crate::error::{RespeakError, Result};
use crate::tts::synthesizer::SpeechBackend;

/// Per-request timeout. Long chunks take the endpoint a while to render.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    api_key: String,
    voice: String,
    model: String,
}

impl OpenAiBackend {
    /// Build a backend with an explicit API key.
    pub fn new(api_key: String, voice: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RespeakError::Synthesis {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_key,
            voice: voice.to_string(),
            model: model.to_string(),
        })
    }

    /// Build a backend reading the API key from the process environment.
    ///
    /// Fails when the key is unset or empty, so a misconfigured run dies
    /// before any file or network work starts.
    pub fn from_env(voice: &str, model: &str) -> Result<Self> {
        let api_key = std::env::var(defaults::API_KEY_VAR).unwrap_or_default();
        if api_key.is_empty() {
            return Err(RespeakError::MissingCredential {
                name: defaults::API_KEY_VAR.to_string(),
                hint: " (export it or add it to a .env file)".to_string(),
            });
        }
        Self::new(api_key, voice, model)
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3"
        })
    }
}

impl SpeechBackend for OpenAiBackend {
    fn request_speech(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(defaults::SPEECH_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.payload(text))
            .send()
            .map_err(|e| RespeakError::Synthesis {
                message: format!("TTS request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RespeakError::SynthesisRejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().map_err(|e| RespeakError::Synthesis {
            message: format!("Failed to read TTS response: {}", e),
        })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn from_env_fails_without_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env(defaults::API_KEY_VAR);

        let result = OpenAiBackend::from_env("nova", "tts-1");
        match result {
            Err(RespeakError::MissingCredential { name, .. }) => {
                assert_eq!(name, "OPENAI_API_KEY");
            }
            _ => panic!("Expected MissingCredential error"),
        }
    }

    #[test]
    fn from_env_rejects_empty_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        set_env(defaults::API_KEY_VAR, "");

        let result = OpenAiBackend::from_env("nova", "tts-1");
        assert!(result.is_err());

        remove_env(defaults::API_KEY_VAR);
    }

    #[test]
    fn from_env_succeeds_with_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        set_env(defaults::API_KEY_VAR, "sk-test");

        let backend = OpenAiBackend::from_env("nova", "tts-1").unwrap();
        assert_eq!(backend.voice, "nova");
        assert_eq!(backend.model, "tts-1");

        remove_env(defaults::API_KEY_VAR);
    }

    #[test]
    fn payload_carries_model_voice_and_format() {
        let backend = OpenAiBackend::new("sk-test".to_string(), "alloy", "tts-1-hd").unwrap();
        let payload = backend.payload("Hello world");

        assert_eq!(payload["model"], "tts-1-hd");
        assert_eq!(payload["input"], "Hello world");
        assert_eq!(payload["voice"], "alloy");
        assert_eq!(payload["response_format"], "mp3");
    }
}
