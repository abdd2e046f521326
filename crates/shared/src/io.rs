use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Create the data and output directories if they do not exist yet
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Fail with a configuration error naming the stage that should have produced `path`.
pub fn require_file(path: &Path, hint: &'static str) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingInput {
            path: path.to_path_buf(),
            hint,
        })
    }
}

/// Serialize `data` as pretty JSON, replacing any previous file.
pub fn save_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // Try to parse JSON with helpful error message
    let data = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse JSON from {}. The file may be corrupted; rerun the previous stage.",
            path.display()
        )
    })?;

    Ok(data)
}

pub fn write_text(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
