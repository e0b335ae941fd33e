//! Collaborator boundaries for the notification session.
//!
//! Three traits stand between the pure evaluation core and the outside world:
//! - IncidentFeed: where incident records come from (HTTP poll, push, fixture)
//! - NotificationSink: where rendered notifications go (browser, SMS gateway)
//! - PreferenceStore: where per-subject settings are persisted

use serde::Serialize;

use crate::models::{DeliveryChannels, Incident, IncidentRecord, NotificationPreferences};
use crate::proximity::{NotificationDecision, NotifyError, RenderedNotification, ShareOffer};

/// Source of incident records. Records are validated by the session, so a
/// feed may pass through whatever the upstream produced.
pub trait IncidentFeed: Send {
    fn fetch(&mut self) -> Result<Vec<IncidentRecord>, NotifyError>;
}

/// Delivery channel for notifications that passed evaluation.
pub trait NotificationSink: Send {
    /// Present or transmit one delivery. An error leaves the incident
    /// un-recorded, so it is retried on the next cycle while still fresh.
    fn deliver(&mut self, delivery: &Delivery) -> Result<(), NotifyError>;
}

/// Persistence for notification preferences.
pub trait PreferenceStore {
    fn load(&self) -> Result<NotificationPreferences, NotifyError>;
    fn save(&self, preferences: &NotificationPreferences) -> Result<(), NotifyError>;
}

/// Everything a sink needs to notify about one incident. Renderings are
/// present only for the channels the subject enabled.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub incident: Incident,
    pub decision: NotificationDecision,
    pub channels: DeliveryChannels,
    pub browser: Option<RenderedNotification>,
    pub sms: Option<String>,
    pub share_offer: Option<ShareOffer>,
}
