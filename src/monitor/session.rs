//! Caller-owned notification session.
//!
//! Ties one subject to the evaluation core: validates feed records, evaluates
//! them, skips incidents already notified, renders per enabled channel and
//! hands the result to a sink. All state lives in this value; there are no
//! process-wide singletons. Callers serialize the two triggers (feed poll and
//! location fix) by holding `&mut`, or a `Mutex` when shared with the
//! background poller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::NotifierConfig;
use crate::models::{
    GeoPoint, Incident, IncidentRecord, LocationSharingSettings, NotificationPreferences, Subject,
};
use crate::proximity::{
    EscalationProtocol, NotificationDecision, NotificationPolicy, NotificationTemplates,
    NotifyError, ProximityNotifier, RecentNotifications,
};

use super::ports::{Delivery, IncidentFeed, NotificationSink, PreferenceStore};

// ═══════════════════════════════════════════════════════════
// BatchReport
// ═══════════════════════════════════════════════════════════

/// Counts from one pass over a batch of incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub fetched: usize,
    /// Records rejected for malformed shape.
    pub invalid: usize,
    pub suppressed: usize,
    /// Would deliver, but already notified.
    pub duplicates: usize,
    /// Would deliver, but every channel is disabled.
    pub muted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub escalations: usize,
}

// ═══════════════════════════════════════════════════════════
// NotificationSession
// ═══════════════════════════════════════════════════════════

pub struct NotificationSession {
    id: Uuid,
    config: NotifierConfig,
    subject: Subject,
    sharing: LocationSharingSettings,
    policy: Box<dyn NotificationPolicy>,
    recent: RecentNotifications,
    /// Last validated batch, re-evaluated when a new location fix arrives.
    last_batch: Vec<Incident>,
}

impl NotificationSession {
    pub fn new(
        config: NotifierConfig,
        preferences: NotificationPreferences,
        sharing: LocationSharingSettings,
    ) -> Result<Self, NotifyError> {
        config.validate()?;
        preferences.validate()?;

        let recent = RecentNotifications::new(config.freshness_window(), config.dedup_capacity);
        let policy = Box::new(ProximityNotifier::new(config.clone()));
        let id = Uuid::new_v4();

        tracing::debug!(session_id = %id, "Notification session started");

        Ok(Self {
            id,
            config,
            subject: Subject::new(preferences),
            sharing,
            policy,
            recent,
            last_batch: Vec::new(),
        })
    }

    /// Start a session with preferences read from `store`.
    pub fn from_store(
        config: NotifierConfig,
        store: &dyn PreferenceStore,
        sharing: LocationSharingSettings,
    ) -> Result<Self, NotifyError> {
        Self::new(config, store.load()?, sharing)
    }

    /// Replace the evaluation policy.
    pub fn with_policy(mut self, policy: Box<dyn NotificationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn sharing(&self) -> &LocationSharingSettings {
        &self.sharing
    }

    pub fn last_batch(&self) -> &[Incident] {
        &self.last_batch
    }

    pub fn notified_count(&self) -> usize {
        self.recent.len()
    }

    // ── Subject state ────────────────────────────────────

    pub fn set_preferences(
        &mut self,
        preferences: NotificationPreferences,
    ) -> Result<(), NotifyError> {
        preferences.validate()?;
        self.subject.preferences = preferences;
        Ok(())
    }

    pub fn save_preferences(&self, store: &dyn PreferenceStore) -> Result<(), NotifyError> {
        store.save(&self.subject.preferences)
    }

    pub fn set_sharing(&mut self, sharing: LocationSharingSettings) {
        self.sharing = sharing;
    }

    /// Geolocation was lost or revoked.
    pub fn clear_location(&mut self) {
        self.subject.clear_location();
    }

    /// Record a new geolocation fix and re-evaluate the last batch against it.
    pub fn on_location_fix(
        &mut self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
        sink: &mut dyn NotificationSink,
    ) -> Result<BatchReport, NotifyError> {
        let fix = GeoPoint::new(latitude, longitude)?;
        self.subject.update_location(fix);

        let mut report = BatchReport::default();
        self.dispatch(now, sink, &mut report);
        Ok(report)
    }

    // ── Feed processing ──────────────────────────────────

    /// Fetch from `feed` and process the result.
    pub fn poll(
        &mut self,
        feed: &mut dyn IncidentFeed,
        sink: &mut dyn NotificationSink,
        now: DateTime<Utc>,
    ) -> Result<BatchReport, NotifyError> {
        let records = feed.fetch()?;
        Ok(self.process_batch(records, now, sink))
    }

    /// Validate, evaluate and deliver one batch. A malformed record is
    /// counted and skipped; it never stops the rest of the batch.
    pub fn process_batch(
        &mut self,
        records: Vec<IncidentRecord>,
        now: DateTime<Utc>,
        sink: &mut dyn NotificationSink,
    ) -> BatchReport {
        let mut report = BatchReport {
            fetched: records.len(),
            ..Default::default()
        };

        let mut incidents = Vec::with_capacity(records.len());
        for record in records {
            let record_id = record.id.clone();
            match Incident::try_from(record) {
                Ok(incident) => incidents.push(incident),
                Err(e) => {
                    report.invalid += 1;
                    tracing::warn!(
                        session_id = %self.id,
                        incident_id = ?record_id,
                        error = %e,
                        "Rejected incident record"
                    );
                }
            }
        }
        self.last_batch = incidents;

        self.dispatch(now, sink, &mut report);

        tracing::info!(
            session_id = %self.id,
            fetched = report.fetched,
            invalid = report.invalid,
            delivered = report.delivered,
            duplicates = report.duplicates,
            escalations = report.escalations,
            "Incident batch processed"
        );

        report
    }

    /// Critical incidents from the last batch close to the subject, per the
    /// configured nearby radius and window. Empty when unlocated.
    pub fn nearby_critical(&self, now: DateTime<Utc>) -> Result<Vec<&Incident>, NotifyError> {
        match &self.subject.location {
            Some(here) => EscalationProtocol::nearby_critical(
                &self.last_batch,
                here,
                self.config.nearby_critical_radius_km,
                now,
                self.config.nearby_critical_window(),
            ),
            None => Ok(Vec::new()),
        }
    }

    fn dispatch(
        &mut self,
        now: DateTime<Utc>,
        sink: &mut dyn NotificationSink,
        report: &mut BatchReport,
    ) {
        self.recent.evict_expired(now);
        let channels = self.subject.preferences.channels;
        let lang = self.subject.preferences.language;

        for incident in &self.last_batch {
            let decision = match self.policy.evaluate(incident, &self.subject, now) {
                Ok(decision) => decision,
                Err(e) => {
                    report.invalid += 1;
                    tracing::warn!(
                        session_id = %self.id,
                        incident_id = %incident.id,
                        error = %e,
                        "Incident evaluation failed"
                    );
                    continue;
                }
            };

            if let NotificationDecision::Suppressed { reason } = decision {
                report.suppressed += 1;
                tracing::debug!(
                    incident_id = %incident.id,
                    reason = reason.as_str(),
                    "Notification suppressed"
                );
                continue;
            }

            if self.recent.was_notified(&incident.id, now) {
                report.duplicates += 1;
                continue;
            }

            if !channels.any() {
                report.muted += 1;
                continue;
            }

            let distance_km = decision.distance_km();
            let share_offer = EscalationProtocol::share_offer(
                incident,
                &decision,
                self.subject.location.as_ref(),
                &self.sharing,
                &self.config.share_link_base,
            );
            let delivery = Delivery {
                incident: incident.clone(),
                decision,
                channels,
                browser: channels
                    .browser
                    .then(|| NotificationTemplates::browser(incident, distance_km, lang)),
                sms: channels
                    .sms
                    .then(|| NotificationTemplates::sms(incident, distance_km, lang)),
                share_offer,
            };

            match sink.deliver(&delivery) {
                Ok(()) => {
                    self.recent.record(&incident.id, now, incident.created_at);
                    report.delivered += 1;
                    if delivery.share_offer.is_some() {
                        report.escalations += 1;
                    }
                    tracing::debug!(
                        incident_id = %incident.id,
                        distance_km = ?distance_km,
                        escalate = decision.escalate(),
                        "Notification delivered"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        session_id = %self.id,
                        incident_id = %incident.id,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }
    }
}
