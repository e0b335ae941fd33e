//! Background feed poller.
//!
//! Spawns a thread that fetches the incident feed once immediately and then
//! every poll interval, handing each batch to the shared session. The fetch
//! runs outside the session lock so a slow feed never blocks a location fix.
//! A failed fetch is logged and retried on the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::proximity::NotifyError;

use super::ports::{IncidentFeed, NotificationSink};
use super::session::NotificationSession;

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(100);

/// Shortest accepted poll interval; anything below is raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle for the poller thread. Shuts the thread down and joins it on drop.
pub struct PollerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl PollerHandle {
    /// Request shutdown. A poll in progress completes; no new one starts.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start polling `feed` every `interval`, delivering through `sink`.
/// Intervals below `MIN_POLL_INTERVAL` are raised to it.
pub fn start_polling<F, S>(
    session: Arc<Mutex<NotificationSession>>,
    mut feed: F,
    mut sink: S,
    interval: Duration,
) -> PollerHandle
where
    F: IncidentFeed + 'static,
    S: NotificationSink + 'static,
{
    let interval = effective_interval(interval);
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(interval_ms, "Incident poller started");
        poll_loop(&session, &mut feed, &mut sink, interval, &flag);
    });

    PollerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn effective_interval(requested: Duration) -> Duration {
    if requested < MIN_POLL_INTERVAL {
        tracing::warn!(
            requested_ms = u64::try_from(requested.as_millis()).unwrap_or(u64::MAX),
            "Poll interval too short, using minimum"
        );
        return MIN_POLL_INTERVAL;
    }
    requested
}

fn poll_loop(
    session: &Mutex<NotificationSession>,
    feed: &mut dyn IncidentFeed,
    sink: &mut dyn NotificationSink,
    interval: Duration,
    shutdown: &AtomicBool,
) {
    let step = interval.min(SLEEP_GRANULARITY);

    while !shutdown.load(Ordering::Relaxed) {
        match poll_once(session, feed, sink) {
            Ok(()) => {}
            Err(NotifyError::LockFailed) => {
                tracing::error!("Notification session lock poisoned, poller stopping");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Incident feed poll failed");
            }
        }

        // Sleep in small increments for responsive shutdown
        let mut slept = Duration::ZERO;
        while slept < interval {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(step);
            slept += step;
        }
    }
    tracing::info!("Incident poller shutting down");
}

fn poll_once(
    session: &Mutex<NotificationSession>,
    feed: &mut dyn IncidentFeed,
    sink: &mut dyn NotificationSink,
) -> Result<(), NotifyError> {
    let records = feed.fetch()?;
    let mut session = session.lock().map_err(|_| NotifyError::LockFailed)?;
    session.process_batch(records, Utc::now(), sink);
    Ok(())
}
