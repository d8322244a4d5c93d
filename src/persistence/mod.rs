//! Save/load of run history
//!
//! Archived runs are what ghosts replay, so keeping them on disk lets ghosts
//! outlive the process. Features:
//! - Versioned JSON envelope
//! - Write to a temp file, then rename over the old save

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::GameHistory;

/// Current envelope version
pub const HISTORY_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported history version {found}")]
    UnsupportedVersion { found: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    runs: Vec<GameHistory>,
}

/// Encode runs as a versioned JSON envelope
pub fn encode_history(runs: &[GameHistory]) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        version: HISTORY_VERSION,
        runs: runs.to_vec(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode runs, rejecting unknown envelope versions
pub fn decode_history(json: &str) -> Result<Vec<GameHistory>, PersistenceError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    if envelope.version != HISTORY_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: envelope.version,
        });
    }
    Ok(envelope.runs)
}

/// Save runs to `path`
pub fn save_history(path: impl AsRef<Path>, runs: &[GameHistory]) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, encode_history(runs)?)?;
    std::fs::rename(&tmp, path)?;
    log::info!("Saved {} run(s) to {}", runs.len(), path.display());
    Ok(())
}

/// Load runs from `path`
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<GameHistory>, PersistenceError> {
    let path = path.as_ref();
    let runs = decode_history(&std::fs::read_to_string(path)?)?;
    log::info!("Loaded {} run(s) from {}", runs.len(), path.display());
    Ok(runs)
}

/// Load runs, starting with no history if the file is missing or unreadable
pub fn load_history_or_empty(path: impl AsRef<Path>) -> Vec<GameHistory> {
    load_history(path).unwrap_or_else(|e| {
        log::warn!("Starting without history ({})", e);
        Vec::new()
    })
}
