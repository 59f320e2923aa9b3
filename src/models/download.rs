//! Model download and installation management.
//!
//! Handles downloading recognition models from HuggingFace, verifying their
//! integrity, and storing them under the workspace `models/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RespeakError, Result};
use crate::models::catalog::{self, ModelInfo};

/// Get the full path for a model file inside a models directory.
///
/// Always returns a path regardless of whether the model is in the catalog.
/// The file may or may not exist on disk.
pub fn model_path(models_dir: &Path, name: &str) -> PathBuf {
    let resolved = catalog::resolve_name(name);
    models_dir.join(format!("ggml-{resolved}.bin"))
}

/// Check if a model is installed.
pub fn is_model_installed(models_dir: &Path, name: &str) -> bool {
    model_path(models_dir, name).exists()
}

/// Resolve a model to an on-disk path, downloading it when allowed.
///
/// With `auto_download` off a missing model is an error instead, so runs
/// started with `--no-download` never touch the network.
pub async fn ensure_model(
    models_dir: &Path,
    name: &str,
    auto_download: bool,
    progress: bool,
) -> Result<PathBuf> {
    let path = model_path(models_dir, name);
    if path.exists() {
        return Ok(path);
    }
    if !auto_download {
        return Err(RespeakError::ModelNotFound {
            path: path.display().to_string(),
        });
    }
    download_model(models_dir, name, progress).await
}

/// Find any installed model from the catalog.
///
/// Scans through all catalog models and returns the first one that is
/// installed. Useful as a fallback when the configured model is missing.
pub fn find_any_installed_model(models_dir: &Path) -> Option<String> {
    catalog::list_models()
        .iter()
        .find(|m| is_model_installed(models_dir, m.name))
        .map(|m| m.name.to_string())
}

/// List all installed model names by scanning the models directory.
///
/// Discovers every `ggml-*.bin` file, not just catalog models.
/// Returns model names with the `ggml-` prefix and `.bin` suffix stripped.
pub fn list_installed_models(models_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name();
            let name = name.to_str()?;
            let model = name.strip_prefix("ggml-")?.strip_suffix(".bin")?;
            if entry.path().is_file() {
                Some(model.to_string())
            } else {
                None
            }
        })
        .collect();

    names.sort();
    names
}

/// Format model information for display.
pub fn format_model_info(models_dir: &Path, model: &ModelInfo) -> String {
    let status = if is_model_installed(models_dir, model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:12} {:5} MB   {}", model.name, model.size_mb, status)
}

#[cfg(feature = "model-download")]
mod fetch {
    use std::io::Write;

    use futures_util::StreamExt;
    use indicatif::{ProgressBar, ProgressStyle};
    use sha1::{Digest, Sha1};

    use super::{Path, PathBuf, RespeakError, Result, catalog, fs, model_path};

    /// Download a recognition model into `models_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model is not found in the catalog
    /// - The download fails
    /// - The SHA-1 checksum doesn't match
    /// - The file cannot be written
    pub async fn download_model(models_dir: &Path, name: &str, progress: bool) -> Result<PathBuf> {
        let path = model_path(models_dir, name);

        if path.exists() {
            if progress {
                eprintln!("Model '{}' is already installed at {}", name, path.display());
            }
            return Ok(path);
        }

        let info = catalog::get_model(name).ok_or_else(|| {
            RespeakError::Other(format!(
                "Model '{name}' not found in catalog.\n\
                 Run 'respeak models list' to see available models."
            ))
        })?;

        download_to_path(info, &path, progress).await?;
        Ok(path)
    }

    /// Core download: fetch url, save to path, verify sha1 if non-empty.
    async fn download_to_path(
        info: &catalog::ModelInfo,
        output_path: &Path,
        progress: bool,
    ) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RespeakError::Other(format!("Failed to create models directory: {e}"))
            })?;
        }

        if progress {
            eprintln!("Downloading {} ({} MB)...", info.name, info.size_mb);
        }

        let client = reqwest::Client::new();
        let response = client
            .get(info.url())
            .send()
            .await
            .map_err(|e| RespeakError::Other(format!("Failed to start download: {e}")))?;

        if !response.status().is_success() {
            return Err(RespeakError::Other(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);

        let pb = if progress {
            let pb = ProgressBar::new(total_size);
            pb.set_style(
                // Hardcoded template string, always valid.
                #[allow(clippy::expect_used)]
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("hardcoded progress bar template")
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut hasher = Sha1::new();
        let mut stream = response.bytes_stream();
        let mut file = fs::File::create(output_path)
            .map_err(|e| RespeakError::Other(format!("Failed to create output file: {e}")))?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| RespeakError::Other(format!("Failed to read download chunk: {e}")))?;

            file.write_all(&chunk)
                .map_err(|e| RespeakError::Other(format!("Failed to write to file: {e}")))?;

            hasher.update(&chunk);

            if let Some(ref pb) = pb {
                pb.inc(chunk.len() as u64);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Downloaded");
        }

        if !info.sha1.is_empty() {
            let calculated_hash = format!("{:x}", hasher.finalize());
            if calculated_hash != info.sha1 {
                if let Err(e) = fs::remove_file(output_path) {
                    eprintln!("respeak: failed to remove corrupted download: {e}");
                }
                return Err(RespeakError::Other(format!(
                    "SHA-1 checksum mismatch. Expected: {}, got: {}",
                    info.sha1, calculated_hash
                )));
            }
            if progress {
                eprintln!("Checksum verified");
            }
        }

        if progress {
            eprintln!("Model installed to: {}", output_path.display());
        }

        Ok(())
    }
}

#[cfg(feature = "model-download")]
pub use fetch::download_model;

#[cfg(not(feature = "model-download"))]
pub async fn download_model(models_dir: &Path, name: &str, _progress: bool) -> Result<PathBuf> {
    let path = model_path(models_dir, name);
    if path.exists() {
        return Ok(path);
    }
    Err(RespeakError::Other(format!(
        "Model '{name}' is not installed and download support is not compiled in.\n\
         Rebuild with --features model-download or place {} manually.",
        path.display()
    )))
}
