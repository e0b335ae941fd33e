use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::{IncidentCategory, Language};
use super::geo::GeoPoint;
use crate::proximity::types::InvalidInput;

// ═══════════════════════════════════════════════════════════
// Preferences
// ═══════════════════════════════════════════════════════════

/// Which channels a delivered notification may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryChannels {
    #[serde(rename = "browserNotifications")]
    pub browser: bool,
    #[serde(rename = "smsAlerts")]
    pub sms: bool,
    #[serde(rename = "emailAlerts")]
    pub email: bool,
}

impl DeliveryChannels {
    pub fn any(&self) -> bool {
        self.browser || self.sms || self.email
    }
}

impl Default for DeliveryChannels {
    fn default() -> Self {
        Self {
            browser: true,
            sms: true,
            email: false,
        }
    }
}

/// Per-subject notification settings.
///
/// The JSON shape matches the settings object the web client stores, so a
/// saved file can be read by either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    #[serde(flatten)]
    pub channels: DeliveryChannels,
    #[serde(rename = "radiusKm")]
    pub max_radius_km: f64,
    #[serde(rename = "emergencyTypes")]
    pub subscribed_categories: BTreeSet<IncidentCategory>,
    pub notify_critical_without_location: bool,
    pub language: Language,
}

impl NotificationPreferences {
    pub fn is_subscribed(&self, category: IncidentCategory) -> bool {
        self.subscribed_categories.contains(&category)
    }

    /// Reject a radius that would make every distance comparison meaningless.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.max_radius_km.is_finite() || self.max_radius_km < 0.0 {
            return Err(InvalidInput::Radius(self.max_radius_km));
        }
        Ok(())
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            channels: DeliveryChannels::default(),
            max_radius_km: 10.0,
            subscribed_categories: [
                IncidentCategory::Fire,
                IncidentCategory::Flood,
                IncidentCategory::Accident,
                IncidentCategory::Medical,
                IncidentCategory::Crime,
            ]
            .into_iter()
            .collect(),
            notify_critical_without_location: true,
            language: Language::En,
        }
    }
}

/// How the subject's position may be shared when an escalation is offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationSharingSettings {
    pub share_with_emergency_services: bool,
    pub share_with_volunteers: bool,
    pub share_with_family: bool,
    pub radius_meters: u32,
    pub auto_share_on_emergency: bool,
    /// Minutes before an active share stops on its own.
    pub max_sharing_duration: u32,
}

impl Default for LocationSharingSettings {
    fn default() -> Self {
        Self {
            share_with_emergency_services: true,
            share_with_volunteers: true,
            share_with_family: false,
            radius_meters: 500,
            auto_share_on_emergency: true,
            max_sharing_duration: 30,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Subject
// ═══════════════════════════════════════════════════════════

/// The notification recipient. Lives for one session, in memory only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subject {
    /// Last geolocation fix; `None` until one succeeds.
    pub location: Option<GeoPoint>,
    pub preferences: NotificationPreferences,
}

impl Subject {
    pub fn new(preferences: NotificationPreferences) -> Self {
        Self {
            location: None,
            preferences,
        }
    }

    pub fn located_at(mut self, point: GeoPoint) -> Self {
        self.location = Some(point);
        self
    }

    pub fn update_location(&mut self, point: GeoPoint) {
        self.location = Some(point);
    }

    pub fn clear_location(&mut self) {
        self.location = None;
    }
}
