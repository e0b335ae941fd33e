use std::path::{Path, PathBuf};

use crate::config;
use crate::models::NotificationPreferences;
use crate::proximity::NotifyError;

use super::ports::PreferenceStore;

/// Preferences persisted as a JSON file, one per subject.
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/SafeAlert/notification_settings.json`.
    pub fn default_location() -> Result<Self, NotifyError> {
        Ok(Self::new(config::preferences_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    /// A missing file yields defaults, mirroring a first run.
    fn load(&self) -> Result<NotificationPreferences, NotifyError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No saved preferences, using defaults");
            return Ok(NotificationPreferences::default());
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            NotifyError::PreferencesLoad(self.path.display().to_string(), e.to_string())
        })?;
        let preferences: NotificationPreferences = serde_json::from_str(&raw).map_err(|e| {
            NotifyError::PreferencesParse(self.path.display().to_string(), e.to_string())
        })?;
        preferences.validate()?;
        Ok(preferences)
    }

    fn save(&self, preferences: &NotificationPreferences) -> Result<(), NotifyError> {
        preferences.validate()?;

        let save_err = |e: std::io::Error| {
            NotifyError::PreferencesSave(self.path.display().to_string(), e.to_string())
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(save_err)?;
        }
        let json = serde_json::to_string_pretty(preferences).map_err(|e| {
            NotifyError::PreferencesSave(self.path.display().to_string(), e.to_string())
        })?;
        std::fs::write(&self.path, json).map_err(save_err)?;

        tracing::debug!(path = %self.path.display(), "Preferences saved");
        Ok(())
    }
}
