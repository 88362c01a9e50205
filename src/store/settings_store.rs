use super::{SettingsSnapshot, StoreError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const STATE_FILENAME: &str = "app_state.json";

/// The last-used settings, restored at startup and written on close.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store `app_state.json` inside `directory`.
    pub fn in_directory(directory: &Path) -> Self {
        Self::new(directory.join(STATE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved snapshot. A missing or unreadable file yields defaults.
    pub fn load(&self) -> SettingsSnapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No saved settings at {:?} ({}), using defaults", self.path, e);
                return SettingsSnapshot::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => {
                info!("Restored settings from {:?}", self.path);
                snapshot
            }
            Err(e) => {
                warn!("Ignoring invalid settings file {:?}: {}", self.path, e);
                SettingsSnapshot::default()
            }
        }
    }

    pub fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        debug!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
