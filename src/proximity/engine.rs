use chrono::{DateTime, Utc};

use crate::config::NotifierConfig;
use crate::models::{Incident, Severity, Subject};

use super::distance::distance_between;
use super::types::{NotificationDecision, NotificationPolicy, NotifyError, SuppressReason};

/// Default notification policy: category filter, then radius (or the
/// critical-only fallback when the subject has no fix), then freshness.
///
/// Holds only immutable thresholds, so one instance can be shared across
/// threads and sessions.
#[derive(Debug, Clone, Default)]
pub struct ProximityNotifier {
    config: NotifierConfig,
}

impl ProximityNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Category and location gates. `Ok(Some(distance))` when the subject was
    /// located, `Ok(None)` when admitted through the location-less fallback.
    fn gate(
        &self,
        incident: &Incident,
        subject: &Subject,
    ) -> Result<Result<Option<f64>, SuppressReason>, NotifyError> {
        let prefs = &subject.preferences;
        prefs.validate()?;
        incident.location.validate()?;

        if !prefs.is_subscribed(incident.category) {
            return Ok(Err(SuppressReason::CategoryNotSubscribed));
        }

        match &subject.location {
            Some(here) => {
                let distance_km = distance_between(here, &incident.location)?;
                if distance_km <= prefs.max_radius_km {
                    Ok(Ok(Some(distance_km)))
                } else {
                    Ok(Err(SuppressReason::OutsideRadius { distance_km }))
                }
            }
            None => {
                if incident.severity == Severity::Critical && prefs.notify_critical_without_location
                {
                    Ok(Ok(None))
                } else {
                    Ok(Err(SuppressReason::LocationUnavailable))
                }
            }
        }
    }

    fn is_escalation(&self, incident: &Incident, distance_km: Option<f64>) -> bool {
        incident.severity == Severity::Critical
            && distance_km.is_some_and(|d| d <= self.config.escalation_radius_km)
    }
}

impl NotificationPolicy for ProximityNotifier {
    fn should_notify(&self, incident: &Incident, subject: &Subject) -> Result<bool, NotifyError> {
        Ok(self.gate(incident, subject)?.is_ok())
    }

    fn evaluate(
        &self,
        incident: &Incident,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<NotificationDecision, NotifyError> {
        let distance_km = match self.gate(incident, subject)? {
            Ok(distance_km) => distance_km,
            Err(reason) => return Ok(NotificationDecision::Suppressed { reason }),
        };

        // A report dated after `now` (clock skew) still counts as fresh.
        let age = now - incident.created_at;
        if age > self.config.freshness_window() {
            return Ok(NotificationDecision::Suppressed {
                reason: SuppressReason::Stale {
                    age_secs: age.num_seconds(),
                },
            });
        }

        Ok(NotificationDecision::Deliver {
            distance_km,
            escalate: self.is_escalation(incident, distance_km),
        })
    }
}
