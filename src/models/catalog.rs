//! Recognition model metadata catalog.
//!
//! Static catalog of the whisper ggml model family, including sizes,
//! checksums, and download URLs.

use crate::defaults;

const HUGGINGFACE_BASE: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Metadata for a recognition model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "tiny.en", "base", "large-v3")
    pub name: &'static str,
    /// Model size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum for integrity verification; empty skips verification
    pub sha1: &'static str,
}

impl ModelInfo {
    /// File name of the model on disk, e.g. `ggml-small.bin`.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.name)
    }

    /// Download URL on HuggingFace.
    pub fn url(&self) -> String {
        format!("{}/{}", HUGGINGFACE_BASE, self.file_name())
    }

    /// Whether this model only handles English input.
    pub fn english_only(&self) -> bool {
        self.name.ends_with(defaults::ENGLISH_ONLY_SUFFIX)
    }
}

/// Catalog of available recognition models.
///
/// Models range from tiny (75 MB, fast, lower accuracy) to large-v3
/// (3094 MB, slower, highest accuracy). The `.en` suffix indicates
/// English-only models, which are faster at the same size.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny.en",
        size_mb: 75,
        sha1: "c78c86eb1a8faa21b369bcd33207cc90d64ae9df",
    },
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        sha1: "bd577a113a864445d4c299885e0cb97d4ba92b5f",
    },
    ModelInfo {
        name: "base.en",
        size_mb: 142,
        sha1: "137c40403d78fd54d454da0f9bd998f78703390c",
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        sha1: "465707469ff3a37a2b9b8d8f89f2f99de7299dac",
    },
    ModelInfo {
        name: "small.en",
        size_mb: 466,
        sha1: "db8a495a91d927739e50b3fc1cc4c6b8f6c2d022",
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        sha1: "55356645c2b361a969dfd0ef2c5a50d530afd8d5",
    },
    ModelInfo {
        name: "medium.en",
        size_mb: 1533,
        sha1: "8c30f0e44ce9560643ebd10bbe50cd20eafd3723",
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        sha1: "fd9727b6e1217c2f614f9b698455c4ffd82463b4",
    },
    ModelInfo {
        name: "large-v3",
        size_mb: 3094,
        sha1: "ad82bf6a9043ceed055076d0fd39f5f186ff8062",
    },
];

/// Resolve generation-less aliases to concrete catalog names.
///
/// `large` tracks the newest large generation so the classic five model
/// names all work as selectors.
pub fn resolve_name(name: &str) -> &str {
    match name {
        "large" => "large-v3",
        other => other,
    }
}

/// Find a model by name or alias.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    let resolved = resolve_name(name);
    MODELS.iter().find(|m| m.name == resolved)
}

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// Get the default model.
///
/// The default is `small` - accurate enough for full-length recordings
/// while still tractable on CPU.
pub fn default_model() -> &'static ModelInfo {
    get_model(defaults::DEFAULT_MODEL).expect("default model should always be present in catalog")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model_exists() {
        let model = get_model("tiny.en").unwrap();
        assert_eq!(model.name, "tiny.en");
        assert_eq!(model.size_mb, 75);
        assert!(model.english_only());
    }

    #[test]
    fn test_get_model_not_found() {
        assert!(get_model("nonexistent").is_none());
    }

    #[test]
    fn test_get_model_resolves_large_alias() {
        let model = get_model("large").unwrap();
        assert_eq!(model.name, "large-v3");
    }

    #[test]
    fn test_list_models_not_empty() {
        let models = list_models();
        assert_eq!(models.len(), 9);
    }

    #[test]
    fn test_default_model_is_small() {
        let default = default_model();
        assert_eq!(default.name, "small");
        assert_eq!(default.size_mb, 466);
        assert!(!default.english_only());
    }

    #[test]
    fn test_file_name_and_url() {
        let model = get_model("small").unwrap();
        assert_eq!(model.file_name(), "ggml-small.bin");
        assert_eq!(
            model.url(),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin"
        );
    }

    #[test]
    fn test_all_models_have_valid_url() {
        for model in list_models() {
            let url = model.url();
            assert!(
                url.starts_with("https://huggingface.co"),
                "Model {} has invalid URL: {}",
                model.name,
                url
            );
            assert!(
                url.ends_with(".bin"),
                "Model {} URL should point at a ggml file: {}",
                model.name,
                url
            );
        }
    }

    #[test]
    fn test_english_models_have_en_suffix() {
        for model in list_models() {
            if model.english_only() {
                assert!(
                    model.name.ends_with(".en"),
                    "English-only model {} should have .en suffix",
                    model.name
                );
            }
        }
    }

    #[test]
    fn test_model_sizes_are_correct() {
        let sizes = [
            ("tiny.en", 75),
            ("tiny", 75),
            ("base.en", 142),
            ("base", 142),
            ("small.en", 466),
            ("small", 466),
            ("medium.en", 1533),
            ("medium", 1533),
            ("large-v3", 3094),
        ];

        for (name, expected_size) in sizes {
            let model = get_model(name).unwrap_or_else(|| panic!("Model {} not found", name));
            assert_eq!(model.size_mb, expected_size, "Model {} has wrong size", name);
        }
    }

    #[test]
    fn test_model_names_are_unique() {
        let names: Vec<_> = list_models().iter().map(|m| m.name).collect();
        let mut unique_names = names.clone();
        unique_names.sort_unstable();
        unique_names.dedup();
        assert_eq!(names.len(), unique_names.len(), "Model names are not unique");
    }

    #[test]
    fn test_all_checksums_are_hex_sha1() {
        for model in list_models() {
            assert_eq!(
                model.sha1.len(),
                40,
                "Model {} checksum should be 40 hex chars",
                model.name
            );
            assert!(
                model.sha1.chars().all(|c| c.is_ascii_hexdigit()),
                "Model {} checksum should be hex",
                model.name
            );
        }
    }

    #[test]
    fn test_get_model_case_sensitive() {
        assert!(get_model("tiny.en").is_some());
        assert!(get_model("Tiny.en").is_none());
    }
}
