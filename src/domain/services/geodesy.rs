//! Great-circle geometry on a spherical Earth.

use crate::domain::value_objects::{Coordinates, Distance};

/// IUGG mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance between two points.
///
/// Identical inputs yield exactly zero and the result is symmetric in its
/// arguments. The haversine term is clamped to `[0, 1]` so rounding near
/// antipodal points cannot push `asin` into NaN.
pub fn haversine(a: &Coordinates, b: &Coordinates) -> Distance {
    if a == b {
        return Distance::ZERO;
    }

    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    Distance::from_meters(2.0 * EARTH_RADIUS_METERS * h.sqrt().asin())
}
