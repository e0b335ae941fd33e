//! Bounded recency set of notified incidents.
//!
//! Remembers which incident ids were already delivered so a feed that keeps
//! returning the same reports does not notify twice. An entry lives for as
//! long as its incident can still pass the freshness check: until the later of
//! the delivery time and the incident's own timestamp, plus the freshness
//! window. A future-dated incident therefore stays remembered until it goes
//! stale.
//!
//! Capacity bounds expired entries only. When the set overflows, expired
//! entries are swept first; live entries are never dropped, since forgetting
//! one would notify about its incident again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

pub struct RecentNotifications {
    /// Incident id to the instant its entry expires.
    entries: HashMap<String, DateTime<Utc>>,
    ttl: chrono::Duration,
    capacity: usize,
}

impl RecentNotifications {
    pub fn new(ttl: chrono::Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Whether `incident_id` has a live entry at `now`.
    pub fn was_notified(&self, incident_id: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(incident_id)
            .is_some_and(|expires_at| now <= *expires_at)
    }

    /// Remember a delivery made at `now` for an incident reported at
    /// `created_at`.
    pub fn record(&mut self, incident_id: &str, now: DateTime<Utc>, created_at: DateTime<Utc>) {
        let expires_at = now.max(created_at) + self.ttl;
        self.entries.insert(incident_id.to_string(), expires_at);

        if self.entries.len() > self.capacity {
            self.evict_expired(now);
            if self.entries.len() > self.capacity {
                tracing::warn!(
                    live = self.entries.len(),
                    capacity = self.capacity,
                    "Dedup capacity exceeded by live entries, keeping all"
                );
            }
        }
    }

    /// Drop entries that expired before `now`. Returns how many were removed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| now <= *expires_at);
        before - self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
