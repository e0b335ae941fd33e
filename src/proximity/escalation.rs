use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{GeoPoint, Incident, LocationSharingSettings, Severity};

use super::distance::distance_between;
use super::messages::NotificationTemplates;
use super::types::{NotificationDecision, NotifyError};

/// Prompt to offer location sharing, produced for escalated decisions.
/// Starting and stopping the share is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareOffer {
    pub share_id: String,
    pub incident_id: String,
    pub distance_km: f64,
    /// Live tracking page for family and responders.
    pub share_link: String,
    /// Prefilled text for messaging apps.
    pub share_message: String,
    pub sms_message: String,
    /// The share stops on its own after this many minutes.
    pub max_sharing_minutes: u32,
}

/// Follow-up actions for critical incidents near the subject.
pub struct EscalationProtocol;

impl EscalationProtocol {
    /// Build a share offer when the decision is escalated and the subject
    /// has a position to share and has opted into sharing on emergencies.
    /// Share links are built under `link_base`.
    pub fn share_offer(
        incident: &Incident,
        decision: &NotificationDecision,
        position: Option<&GeoPoint>,
        settings: &LocationSharingSettings,
        link_base: &str,
    ) -> Option<ShareOffer> {
        if !decision.escalate() || !settings.auto_share_on_emergency {
            return None;
        }
        let position = position?;
        let distance_km = decision.distance_km()?;

        let share_id = Uuid::new_v4().to_string();
        let share_link = NotificationTemplates::share_link(link_base, &share_id);

        Some(ShareOffer {
            incident_id: incident.id.clone(),
            distance_km,
            share_message: NotificationTemplates::location_share(
                position,
                Some(incident.category),
                &share_link,
            ),
            sms_message: NotificationTemplates::location_share_sms(position, &share_link),
            share_id,
            share_link,
            max_sharing_minutes: settings.max_sharing_duration,
        })
    }

    /// Critical incidents within `radius_km` of `position` reported no longer
    /// than `window` before `now`.
    pub fn nearby_critical<'a>(
        incidents: &'a [Incident],
        position: &GeoPoint,
        radius_km: f64,
        now: DateTime<Utc>,
        window: chrono::Duration,
    ) -> Result<Vec<&'a Incident>, NotifyError> {
        let mut nearby = Vec::new();
        for incident in incidents {
            if incident.severity != Severity::Critical || now - incident.created_at > window {
                continue;
            }
            if distance_between(position, &incident.location)? <= radius_km {
                nearby.push(incident);
            }
        }
        Ok(nearby)
    }
}
