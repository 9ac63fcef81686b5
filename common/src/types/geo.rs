use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
use crate::errors::PairingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated position. Device fixes and manual entries produce the same
/// value, so nothing downstream can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PairingError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(PairingError::InvalidCoordinate(
                "Please enter valid numbers for latitude and longitude".to_string(),
            ));
        }
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(PairingError::InvalidCoordinate(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(PairingError::InvalidCoordinate(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Parses the two text fields of the manual location form.
pub fn parse_manual_coordinate(
    latitude: &str,
    longitude: &str,
) -> Result<GeoCoordinate, PairingError> {
    let parsed = (
        latitude.trim().parse::<f64>(),
        longitude.trim().parse::<f64>(),
    );
    match parsed {
        (Ok(lat), Ok(lng)) => GeoCoordinate::new(lat, lng),
        _ => Err(PairingError::InvalidCoordinate(
            "Please enter valid numbers for latitude and longitude".to_string(),
        )),
    }
}
