//! Validated WGS84 coordinate pair.
//!
//! A `Coordinates` value can only be built through validation, so every
//! position that reaches the hub fan-out or a client store is in range.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::shared::error::LocationError;
use crate::shared::validation::location_error;

/// Unchecked coordinate input as it arrives from a sensor or the wire.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CoordinateInput {
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    pub longitude: f64,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateInput")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Null Island, the initial map center
    pub const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Validate and build a coordinate pair.
    ///
    /// # Errors
    ///
    /// `NotFinite` for NaN or infinite components, `OutOfRange` when a
    /// component falls outside its WGS84 bounds.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        // range checks pass NaN through, so finiteness is checked first
        if !latitude.is_finite() {
            return Err(LocationError::NotFinite { field: "latitude" });
        }
        if !longitude.is_finite() {
            return Err(LocationError::NotFinite { field: "longitude" });
        }

        let input = CoordinateInput { latitude, longitude };
        input.validate().map_err(location_error)?;

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Point halfway between two coordinates in degree space.
    ///
    /// Good enough for label placement over the short spans this system
    /// deals with; not a geodesic midpoint.
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }
}

impl TryFrom<CoordinateInput> for Coordinates {
    type Error = LocationError;

    fn try_from(input: CoordinateInput) -> Result<Self, Self::Error> {
        Coordinates::new(input.latitude, input.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.0 ; "origin")]
    #[test_case(90.0, 180.0 ; "upper bounds")]
    #[test_case(-90.0, -180.0 ; "lower bounds")]
    #[test_case(51.5074, -0.1278 ; "london")]
    fn test_accepts_valid_coordinates(lat: f64, lon: f64) {
        let c = Coordinates::new(lat, lon).unwrap();
        assert_eq!(c.latitude(), lat);
        assert_eq!(c.longitude(), lon);
    }

    #[test_case(200.0, 0.0, "latitude" ; "latitude too high")]
    #[test_case(-90.5, 0.0, "latitude" ; "latitude too low")]
    #[test_case(0.0, 180.01, "longitude" ; "longitude too high")]
    #[test_case(0.0, -720.0, "longitude" ; "longitude too low")]
    fn test_rejects_out_of_range(lat: f64, lon: f64, expected_field: &str) {
        match Coordinates::new(lat, lon) {
            Err(LocationError::OutOfRange { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            Coordinates::new(f64::NAN, 0.0),
            Err(LocationError::NotFinite { field: "latitude" })
        );
        assert_eq!(
            Coordinates::new(0.0, f64::INFINITY),
            Err(LocationError::NotFinite { field: "longitude" })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinates = serde_json::from_str(r#"{"latitude":10.0,"longitude":20.0}"#).unwrap();
        assert_eq!(ok.latitude(), 10.0);

        let bad = serde_json::from_str::<Coordinates>(r#"{"latitude":200.0,"longitude":20.0}"#);
        assert!(bad.is_err());

        let non_numeric = serde_json::from_str::<Coordinates>(r#"{"latitude":"north","longitude":20.0}"#);
        assert!(non_numeric.is_err());
    }

    #[test]
    fn test_midpoint() {
        let a = Coordinates::new(0.0, 0.0).unwrap();
        let b = Coordinates::new(10.0, 20.0).unwrap();
        let m = a.midpoint(&b);
        assert_eq!(m.latitude(), 5.0);
        assert_eq!(m.longitude(), 10.0);
    }
}
