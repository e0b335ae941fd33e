use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::proximity::types::NotifyError;

/// Application-level constants
pub const APP_NAME: &str = "SafeAlert Rwanda";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the persisted notification settings.
pub const PREFERENCES_FILE: &str = "notification_settings.json";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "safealert=info"
}

/// Get the application data directory (~/SafeAlert/).
pub fn app_data_dir() -> Result<PathBuf, NotifyError> {
    dirs::home_dir()
        .map(|home| home.join("SafeAlert"))
        .ok_or(NotifyError::NoDataDir)
}

/// Get the default notification settings path.
pub fn preferences_path() -> Result<PathBuf, NotifyError> {
    Ok(app_data_dir()?.join(PREFERENCES_FILE))
}

// ═══════════════════════════════════════════════════════════
// NotifierConfig
// ═══════════════════════════════════════════════════════════

/// Tunable thresholds for evaluation and the polling session.
///
/// Defaults reproduce the web client's hard-coded values: a 2 minute
/// freshness window, 1 km escalation radius, and a 30 second poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Maximum incident age that still counts as a new report.
    pub freshness_window_secs: u64,
    /// Critical incidents at or within this distance are escalated.
    pub escalation_radius_km: f64,
    pub poll_interval_secs: u64,
    /// Upper bound on remembered notified incident ids.
    pub dedup_capacity: usize,
    pub nearby_critical_radius_km: f64,
    pub nearby_critical_window_secs: u64,
    /// Origin that location-share tracking links are built under.
    pub share_link_base: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: 120,
            escalation_radius_km: 1.0,
            poll_interval_secs: 30,
            dedup_capacity: 256,
            nearby_critical_radius_km: 1.0,
            nearby_critical_window_secs: 600,
            share_link_base: "https://safealert.rw".into(),
        }
    }
}

impl NotifierConfig {
    /// Load from a JSON file. Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, NotifyError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NotifyError::ConfigLoad(path.display().to_string(), e.to_string())
        })?;
        let config: NotifierConfig = serde_json::from_str(&raw).map_err(|e| {
            NotifyError::ConfigParse(path.display().to_string(), e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NotifyError> {
        for (name, radius) in [
            ("escalation_radius_km", self.escalation_radius_km),
            ("nearby_critical_radius_km", self.nearby_critical_radius_km),
        ] {
            if !radius.is_finite() || radius < 0.0 {
                return Err(NotifyError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {radius}"
                )));
            }
        }
        for (name, secs) in [
            ("freshness_window_secs", self.freshness_window_secs),
            ("poll_interval_secs", self.poll_interval_secs),
            ("nearby_critical_window_secs", self.nearby_critical_window_secs),
        ] {
            if secs == 0 {
                return Err(NotifyError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        if self.share_link_base.trim().is_empty() {
            return Err(NotifyError::InvalidConfig(
                "share_link_base must not be empty".into(),
            ));
        }
        if self.dedup_capacity == 0 {
            return Err(NotifyError::InvalidConfig(
                "dedup_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        seconds(self.freshness_window_secs)
    }

    pub fn nearby_critical_window(&self) -> chrono::Duration {
        seconds(self.nearby_critical_window_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn seconds(secs: u64) -> chrono::Duration {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
    chrono::Duration::seconds(secs)
}
