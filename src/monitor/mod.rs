pub mod background;
pub mod ports;
pub mod preferences;
pub mod session;

pub use background::{start_polling, PollerHandle, MIN_POLL_INTERVAL};
pub use ports::{Delivery, IncidentFeed, NotificationSink, PreferenceStore};
pub use preferences::JsonPreferenceStore;
pub use session::{BatchReport, NotificationSession};
