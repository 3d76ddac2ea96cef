use std::{fs, path::Path};

use eyre::{Context as _, Result};
use model::snapshot::StateSnapshot;
use thiserror::Error;

/// Top-level sections a portable file must carry before it may replace
/// the whole state.
const REQUIRED_SECTIONS: [&str; 3] = ["blocks", "participants", "attendance"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read the import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("The import file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The import file is not a JSON object")]
    NotAnObject,
    #[error("The import file is missing the `{0}` section")]
    MissingSection(&'static str),
}

/// Reads a portable snapshot file. Only the top-level shape is checked;
/// malformed interior data (bad attendance keys, snapshot-less payments)
/// degrades at the read sites instead of failing the import.
pub fn read_portable(path: &Path) -> Result<StateSnapshot, ImportError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;
    for section in REQUIRED_SECTIONS {
        if !object.contains_key(section) {
            return Err(ImportError::MissingSection(section));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Writes the snapshot as a portable JSON file, same shape as the
/// persisted document.
pub fn write_portable(path: &Path, snapshot: &StateSnapshot) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(snapshot)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
