// SPDX-License-Identifier: MIT

//!
//! The GeoMark geographic position type
//!

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors that can arise in relation to a [`GeoPoint`]
#[derive(Error, Debug, Clone)]
pub enum GeoError {
    /// The latitude is out of range (must be -90 <= latitude <= 90)
    #[error("Latitude `{0}` is not allowed")]
    InvalidLatitude(f64),

    /// The longitude is out of range (must be -180 <= longitude <= 180)
    #[error("Longitude `{0}` is not allowed")]
    InvalidLongitude(f64),
}

/// A geographic position: WGS84 latitude/longitude plus an optional altitude
/// in metres.  Altitude is unvalidated (markers may legitimately sit below
/// sea level).
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    altitude: Option<f64>,
}

impl GeoPoint {
    /// Create a new [`GeoPoint`] if the coordinates are in range
    pub fn from(latitude: f64, longitude: f64, altitude: Option<f64>) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.is_nan() {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || longitude.is_nan() {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
            altitude,
        })
    }

    /// Get the latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Get the altitude in metres (if set)
    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawGeoPoint::deserialize(deserializer)?;
        GeoPoint::from(raw.latitude, raw.longitude, raw.altitude).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from() {
        // Should return error
        assert!(GeoPoint::from(91.0, 0.0, None).is_err());
        assert!(GeoPoint::from(-91.0, 0.0, None).is_err());
        assert!(GeoPoint::from(0.0, 180.5, None).is_err());
        assert!(GeoPoint::from(f64::NAN, 0.0, None).is_err());

        // Should be ok
        assert!(GeoPoint::from(51.5, -0.12, Some(11.0)).is_ok());
        assert!(GeoPoint::from(-90.0, 180.0, None).is_ok());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<GeoPoint, _> =
            serde_json::from_str(r#"{"latitude": 51.5, "longitude": -0.12}"#);
        assert!(ok.is_ok());

        let bad: Result<GeoPoint, _> =
            serde_json::from_str(r#"{"latitude": 120.0, "longitude": -0.12}"#);
        assert!(bad.is_err());
    }
}
