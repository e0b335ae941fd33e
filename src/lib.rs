pub mod config;
pub mod models;
pub mod monitor;
pub mod proximity;

use tracing_subscriber::EnvFilter;

pub use config::NotifierConfig;
pub use models::{
    GeoPoint, Incident, IncidentCategory, IncidentRecord, NotificationPreferences, Severity,
    Subject,
};
pub use monitor::{start_polling, BatchReport, NotificationSession, PollerHandle};
pub use proximity::{
    compute_distance_km, InvalidInput, NotificationDecision, NotificationPolicy, NotifyError,
    ProximityNotifier, SuppressReason,
};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it again after a subscriber is set is a no-op.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} notification engine ready", config::APP_NAME, config::APP_VERSION);
    }
}
