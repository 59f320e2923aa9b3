//! Whisper-based speech recognition.
//!
//! Wraps whisper.cpp through the `whisper-rs` bindings. The engine emits one
//! timestamped line per decoded segment through a [`SegmentSink`] while the
//! full pass is running, then returns the concatenated text.
//!
//! # Feature Gate
//!
//! The real engine requires the `whisper` feature and cmake at build time:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::stt::recognizer::{Recognizer, SegmentSink};

/// Configuration for the whisper recognizer.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file.
    pub model_path: PathBuf,
    /// Number of threads for recognition. `None` lets whisper decide.
    pub threads: Option<usize>,
}

impl WhisperConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Model name derived from a ggml file path, e.g. `models/ggml-small.bin`
/// becomes `small`.
fn derive_model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.strip_prefix("ggml-").unwrap_or(stem).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(feature = "whisper")]
mod real {
    use std::fmt;
    use std::sync::{Mutex, Once};

    use whisper_rs::{
        FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters,
        install_logging_hooks,
    };

    use super::{Arc, Recognizer, Result, SegmentSink, WhisperConfig, derive_model_name};
    use crate::audio;
    use crate::defaults;
    use crate::error::RespeakError;
    use crate::transcript::line;

    /// Routes whisper.cpp's stderr chatter through the log crate once per
    /// process.
    static LOGGING_HOOKS: Once = Once::new();

    pub struct WhisperRecognizer {
        context: Mutex<WhisperContext>,
        config: WhisperConfig,
        model_name: String,
    }

    impl WhisperRecognizer {
        /// Load the model and prepare a recognition context.
        ///
        /// Fails fast when the model file is missing so callers can suggest
        /// `respeak models install` instead of surfacing a whisper.cpp error.
        pub fn new(config: WhisperConfig) -> Result<Self> {
            LOGGING_HOOKS.call_once(install_logging_hooks);

            if !config.model_path.exists() {
                return Err(RespeakError::ModelNotFound {
                    path: config.model_path.display().to_string(),
                });
            }

            let model_path = config.model_path.to_str().ok_or_else(|| {
                RespeakError::Recognition {
                    message: format!(
                        "Model path {} is not valid UTF-8",
                        config.model_path.display()
                    ),
                }
            })?;

            let mut context_params = WhisperContextParameters::default();
            context_params.flash_attn(true);

            let context = WhisperContext::new_with_params(model_path, context_params).map_err(
                |e| RespeakError::Recognition {
                    message: format!("Failed to load model {}: {}", model_path, e),
                },
            )?;

            let model_name = derive_model_name(&config.model_path);
            Ok(Self {
                context: Mutex::new(context),
                config,
                model_name,
            })
        }
    }

    impl fmt::Debug for WhisperRecognizer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("WhisperRecognizer")
                .field("model_name", &self.model_name)
                .field("config", &self.config)
                .finish_non_exhaustive()
        }
    }

    impl Recognizer for WhisperRecognizer {
        fn recognize(
            &self,
            audio_path: &std::path::Path,
            sink: Arc<dyn SegmentSink>,
        ) -> Result<String> {
            let decoded = audio::decode_file(audio_path)?;
            audio::expect_speech_format(&decoded)?;
            let samples = audio::to_float_samples(&decoded.samples);

            let context = self.context.lock().map_err(|_| RespeakError::Recognition {
                message: "Recognition context lock poisoned".to_string(),
            })?;
            let mut state = context.create_state().map_err(|e| RespeakError::Recognition {
                message: format!("Failed to create recognition state: {}", e),
            })?;

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_language(Some(defaults::ENGLISH_LANGUAGE));
            params.set_print_special(false);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            if let Some(threads) = self.config.threads {
                params.set_n_threads(threads as i32);
            }

            // Segment timestamps arrive in centiseconds; each finished
            // segment becomes one line in the shared transcript buffer.
            let segment_sink = Arc::clone(&sink);
            params.set_segment_callback_safe(move |segment: whisper_rs::SegmentCallbackData| {
                let formatted = line::format_line(
                    segment.start_timestamp,
                    segment.end_timestamp,
                    &segment.text,
                );
                segment_sink.accept_line(&formatted);
            });

            state
                .full(params, &samples)
                .map_err(|e| RespeakError::Recognition {
                    message: format!("Recognition failed: {}", e),
                })?;

            let text: String = state
                .as_iter()
                .map(|segment| segment.to_string())
                .collect::<Vec<_>>()
                .join("");
            Ok(text.trim().to_string())
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn is_ready(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "whisper")]
pub use real::WhisperRecognizer;

#[cfg(not(feature = "whisper"))]
mod stub {
    use super::{Arc, Recognizer, Result, SegmentSink, WhisperConfig, derive_model_name};
    use crate::error::RespeakError;

    /// Placeholder used when the crate is built without whisper support.
    /// Construction still validates the model path so configuration problems
    /// surface the same way in both builds.
    #[derive(Debug)]
    pub struct WhisperRecognizer {
        model_name: String,
    }

    impl WhisperRecognizer {
        pub fn new(config: WhisperConfig) -> Result<Self> {
            if !config.model_path.exists() {
                return Err(RespeakError::ModelNotFound {
                    path: config.model_path.display().to_string(),
                });
            }
            Ok(Self {
                model_name: derive_model_name(&config.model_path),
            })
        }
    }

    impl Recognizer for WhisperRecognizer {
        fn recognize(
            &self,
            _audio_path: &std::path::Path,
            _sink: Arc<dyn SegmentSink>,
        ) -> Result<String> {
            Err(RespeakError::Recognition {
                message: "Recognition support is not compiled in. Rebuild with --features whisper."
                    .to_string(),
            })
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn is_ready(&self) -> bool {
            false
        }
    }
}

#[cfg(not(feature = "whisper"))]
pub use stub::WhisperRecognizer;
