//! Domain Services
//!
//! Stateless domain logic that does not belong to a single entity.

pub mod geodesy;

pub use geodesy::{haversine, EARTH_RADIUS_METERS};
