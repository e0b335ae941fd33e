use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{IncidentCategory, Severity};
use super::geo::GeoPoint;
use crate::proximity::types::{InvalidInput, NotifyError};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Envelope returned by the alerts feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub success: bool,
    #[serde(default)]
    pub alerts: Vec<IncidentRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FeedResponse {
    /// Parse a feed body and return its records.
    /// A body with `success: false` is a feed error, not an empty batch.
    pub fn parse(body: &str) -> Result<Vec<IncidentRecord>, NotifyError> {
        let response: FeedResponse =
            serde_json::from_str(body).map_err(|e| NotifyError::Feed(e.to_string()))?;
        if !response.success {
            return Err(NotifyError::Feed(
                response
                    .error
                    .unwrap_or_else(|| "feed reported failure".to_string()),
            ));
        }
        Ok(response.alerts)
    }
}

/// Numeric columns come back either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    fn to_f64(&self, field: &'static str) -> Result<f64, InvalidInput> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| InvalidInput::Coordinate {
                field,
                value: f64::NAN,
            }),
        }
    }
}

/// One alert record as produced by the feed. Every field is optional here;
/// `Incident::try_from` decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
    #[serde(default)]
    pub location_address: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Incident
// ---------------------------------------------------------------------------

/// A validated emergency report. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub category: IncidentCategory,
    pub severity: Severity,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location_address: String,
    pub province: Option<String>,
    pub district: Option<String>,
}

impl Incident {
    pub fn new(
        id: impl Into<String>,
        category: IncidentCategory,
        severity: Severity,
        latitude: f64,
        longitude: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InvalidInput> {
        Ok(Self {
            id: id.into(),
            category,
            severity,
            location: GeoPoint::new(latitude, longitude)?,
            created_at,
            title: String::new(),
            description: String::new(),
            location_address: String::new(),
            province: None,
            district: None,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude
    }
}

impl TryFrom<IncidentRecord> for Incident {
    type Error = InvalidInput;

    fn try_from(record: IncidentRecord) -> Result<Self, Self::Error> {
        let id = required(record.id.filter(|id| !id.trim().is_empty()), "id")?;
        let category: IncidentCategory = required(record.alert_type, "alert_type")?.parse()?;
        let severity: Severity = required(record.severity, "severity")?.parse()?;
        let latitude = required(record.latitude, "latitude")?.to_f64("latitude")?;
        let longitude = required(record.longitude, "longitude")?.to_f64("longitude")?;
        let created_at = parse_timestamp(&required(record.created_at, "created_at")?)?;

        Ok(Self {
            id,
            category,
            severity,
            location: GeoPoint::new(latitude, longitude)?,
            created_at,
            title: record.title.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            location_address: record.location_address.unwrap_or_default(),
            province: record.province,
            district: record.district,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, InvalidInput> {
    value.ok_or(InvalidInput::MissingField(field))
}

/// Accepts RFC 3339, or a zone-less `YYYY-MM-DD HH:MM:SS[.fff]` read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, InvalidInput> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(InvalidInput::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn kigali_record() -> IncidentRecord {
        IncidentRecord {
            id: Some("42".into()),
            alert_type: Some("fire".into()),
            severity: Some("critical".into()),
            title: Some("Inkongi y'umuriro".into()),
            latitude: Some(CoordinateValue::Number(-1.9441)),
            longitude: Some(CoordinateValue::Number(30.0619)),
            location_address: Some("KN 4 Ave, Kigali".into()),
            province: Some("Kigali City".into()),
            district: Some("Nyarugenge".into()),
            status: Some("active".into()),
            created_at: Some("2026-03-01T08:30:00Z".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_record_converts() {
        let incident = Incident::try_from(kigali_record()).unwrap();
        assert_eq!(incident.id, "42");
        assert_eq!(incident.category, IncidentCategory::Fire);
        assert_eq!(incident.severity, Severity::Critical);
        assert_eq!(incident.latitude(), -1.9441);
        assert_eq!(incident.longitude(), 30.0619);
        assert_eq!(
            incident.created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(incident.district.as_deref(), Some("Nyarugenge"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut record = kigali_record();
        record.severity = None;
        assert_eq!(
            Incident::try_from(record).unwrap_err(),
            InvalidInput::MissingField("severity")
        );
    }

    #[test]
    fn blank_id_is_missing() {
        for blank in ["", "   "] {
            let mut record = kigali_record();
            record.id = Some(blank.into());
            assert_eq!(
                Incident::try_from(record).unwrap_err(),
                InvalidInput::MissingField("id")
            );
        }
    }

    #[test]
    fn unknown_category_is_rejected_not_defaulted() {
        let mut record = kigali_record();
        record.alert_type = Some("volcano".into());
        assert!(matches!(
            Incident::try_from(record).unwrap_err(),
            InvalidInput::UnknownVariant { .. }
        ));
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        let mut record = kigali_record();
        record.latitude = Some(CoordinateValue::Number(200.0));
        assert!(matches!(
            Incident::try_from(record).unwrap_err(),
            InvalidInput::Coordinate { field: "latitude", .. }
        ));
    }

    #[test]
    fn numeric_string_coordinates_accepted() {
        let mut record = kigali_record();
        record.latitude = Some(CoordinateValue::Text("-1.95000000".into()));
        record.longitude = Some(CoordinateValue::Text(" 30.06 ".into()));
        let incident = Incident::try_from(record).unwrap();
        assert_eq!(incident.latitude(), -1.95);
        assert_eq!(incident.longitude(), 30.06);
    }

    #[test]
    fn garbage_coordinate_string_is_rejected() {
        let mut record = kigali_record();
        record.longitude = Some(CoordinateValue::Text("east".into()));
        assert!(Incident::try_from(record).is_err());
    }

    #[test]
    fn zone_less_timestamp_read_as_utc() {
        let ts = parse_timestamp("2026-03-01 08:30:00.250").unwrap();
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap().timestamp());
    }

    #[test]
    fn offset_timestamp_normalized_to_utc() {
        let ts = parse_timestamp("2026-03-01T10:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        assert_eq!(
            parse_timestamp("yesterday").unwrap_err(),
            InvalidInput::Timestamp("yesterday".into())
        );
    }

    #[test]
    fn feed_body_parses() {
        let body = r#"{
            "success": true,
            "alerts": [
                {"id": "1", "alert_type": "flood", "severity": "high",
                 "latitude": "-1.95", "longitude": 30.1,
                 "created_at": "2026-03-01T08:30:00Z", "user_name": null}
            ]
        }"#;
        let records = FeedResponse::parse(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latitude, Some(CoordinateValue::Text("-1.95".into())));
        assert_eq!(records[0].longitude, Some(CoordinateValue::Number(30.1)));
    }

    #[test]
    fn feed_failure_is_an_error() {
        let body = r#"{"success": false, "error": "Failed to fetch emergency alerts"}"#;
        match FeedResponse::parse(body).unwrap_err() {
            NotifyError::Feed(msg) => assert_eq!(msg, "Failed to fetch emergency alerts"),
            other => panic!("Expected Feed, got: {:?}", other),
        }
    }

    #[test]
    fn malformed_feed_body_is_an_error() {
        assert!(matches!(
            FeedResponse::parse("<html>").unwrap_err(),
            NotifyError::Feed(_)
        ));
    }
}
