//! Great-circle distance value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    /// Build from meters. Negative or NaN inputs collapse to zero.
    pub fn from_meters(meters: f64) -> Self {
        if meters.is_nan() || meters <= 0.0 {
            Self::ZERO
        } else {
            Self(meters)
        }
    }

    pub fn meters(&self) -> f64 {
        self.0
    }

    pub fn kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    /// Display form used on map labels, e.g. `"1.11 km"`.
    pub fn to_km_label(&self) -> String {
        format!("{:.2} km", self.kilometers())
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_km_label())
    }
}
