use serde::{Deserialize, Serialize};

use crate::proximity::types::InvalidInput;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidInput> {
        check_latitude(latitude)?;
        check_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Re-check a point whose fields may have been set directly.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        check_latitude(self.latitude)?;
        check_longitude(self.longitude)
    }
}

pub fn check_latitude(value: f64) -> Result<(), InvalidInput> {
    check_coordinate("latitude", value, MAX_LATITUDE)
}

pub fn check_longitude(value: f64) -> Result<(), InvalidInput> {
    check_coordinate("longitude", value, MAX_LONGITUDE)
}

fn check_coordinate(field: &'static str, value: f64, limit: f64) -> Result<(), InvalidInput> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(InvalidInput::Coordinate { field, value })
    }
}
