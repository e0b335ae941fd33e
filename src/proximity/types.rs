use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Incident, Subject};

// ---------------------------------------------------------------------------
// NotificationDecision
// ---------------------------------------------------------------------------

/// Why an incident was not delivered to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SuppressReason {
    /// The subject does not follow this incident category.
    CategoryNotSubscribed,
    /// The incident lies beyond the subject's radius.
    OutsideRadius { distance_km: f64 },
    /// No location fix, and the location-less fallback did not apply.
    LocationUnavailable,
    /// Older than the freshness window; a re-fetch, not a new report.
    Stale { age_secs: i64 },
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryNotSubscribed => "category_not_subscribed",
            Self::OutsideRadius { .. } => "outside_radius",
            Self::LocationUnavailable => "location_unavailable",
            Self::Stale { .. } => "stale",
        }
    }
}

/// Outcome of evaluating one incident against one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NotificationDecision {
    Suppressed {
        #[serde(flatten)]
        reason: SuppressReason,
    },
    Deliver {
        /// Great-circle distance, present only when the subject was located.
        distance_km: Option<f64>,
        /// Critical and very close: the caller should offer location sharing.
        escalate: bool,
    },
}

impl NotificationDecision {
    pub fn is_deliver(&self) -> bool {
        matches!(self, Self::Deliver { .. })
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self {
            Self::Deliver { distance_km, .. } => *distance_km,
            Self::Suppressed {
                reason: SuppressReason::OutsideRadius { distance_km },
            } => Some(*distance_km),
            Self::Suppressed { .. } => None,
        }
    }

    pub fn escalate(&self) -> bool {
        matches!(self, Self::Deliver { escalate: true, .. })
    }

    pub fn suppress_reason(&self) -> Option<SuppressReason> {
        match self {
            Self::Suppressed { reason } => Some(*reason),
            Self::Deliver { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed input shape. Never defaulted, always surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("{field} must be a finite number in range, got {value}")]
    Coordinate { field: &'static str, value: f64 },

    #[error("Unrecognized {field} value: {value:?}")]
    UnknownVariant { field: &'static str, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unparseable timestamp: {0:?}")]
    Timestamp(String),

    #[error("Notification radius must be finite and non-negative, got {0}")]
    Radius(f64),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config load failed ({0}): {1}")]
    ConfigLoad(String, String),

    #[error("Config parse failed ({0}): {1}")]
    ConfigParse(String, String),

    #[error("Preferences load failed ({0}): {1}")]
    PreferencesLoad(String, String),

    #[error("Preferences parse failed ({0}): {1}")]
    PreferencesParse(String, String),

    #[error("Preferences save failed ({0}): {1}")]
    PreferencesSave(String, String),

    #[error("Cannot determine data directory")]
    NoDataDir,

    #[error("Incident feed error: {0}")]
    Feed(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Internal lock failed")]
    LockFailed,
}

impl NotifyError {
    /// True for errors caused by a single bad record, which the caller skips.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

// ---------------------------------------------------------------------------
// NotificationPolicy trait
// ---------------------------------------------------------------------------

/// Decides whether an incident concerns a subject. Implementations are pure:
/// same inputs, same answer, no I/O.
pub trait NotificationPolicy: Send + Sync {
    /// Category and location gates only; ignores incident age.
    fn should_notify(&self, incident: &Incident, subject: &Subject) -> Result<bool, NotifyError>;

    /// Full decision at `now`, including freshness and escalation.
    fn evaluate(
        &self,
        incident: &Incident,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<NotificationDecision, NotifyError>;
}
