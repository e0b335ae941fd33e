pub mod enums;
pub mod geo;
pub mod incident;
pub mod subject;

pub use enums::{IncidentCategory, Language, Severity};
pub use geo::GeoPoint;
pub use incident::{FeedResponse, Incident, IncidentRecord};
pub use subject::{DeliveryChannels, LocationSharingSettings, NotificationPreferences, Subject};
