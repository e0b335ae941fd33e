pub mod distance;
pub mod engine;
pub mod escalation;
pub mod messages;
pub mod recent;
pub mod types;

pub use distance::{compute_distance_km, distance_between, format_distance, EARTH_RADIUS_KM};
pub use engine::ProximityNotifier;
pub use escalation::{EscalationProtocol, ShareOffer};
pub use messages::{NotificationTemplates, RenderedNotification};
pub use recent::RecentNotifications;
pub use types::{
    InvalidInput, NotificationDecision, NotificationPolicy, NotifyError, SuppressReason,
};
