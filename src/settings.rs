//! Game settings and preferences
//!
//! Persisted as a JSON file next to the run history.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::INITIAL_SEED;
use crate::sim::Action;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key codes (web `KeyboardEvent.code` style) bound to each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub flap: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            flap: vec!["Space".into(), "ArrowUp".into()],
            pause: vec!["KeyP".into(), "Escape".into()],
            restart: vec!["KeyR".into()],
        }
    }
}

impl KeyBindings {
    /// Action bound to a key code, if any
    pub fn action_for(&self, code: &str) -> Option<Action> {
        let bound = |keys: &[String]| keys.iter().any(|k| k == code);
        if bound(&self.flap) {
            Some(Action::Flap)
        } else if bound(&self.pause) {
            Some(Action::Pause)
        } else if bound(&self.restart) {
            Some(Action::Restart)
        } else {
            None
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed every run's RNG starts from
    pub seed: u32,
    pub key_bindings: KeyBindings,
    /// Obstacle schedule CSV (a generated schedule is used when unset)
    pub schedule_path: Option<PathBuf>,
    /// Where run history is kept between processes
    pub history_path: Option<PathBuf>,
    /// Replay ghosts of earlier runs
    pub ghosts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: INITIAL_SEED,
            key_bindings: KeyBindings::default(),
            schedule_path: None,
            history_path: None,
            ghosts: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
