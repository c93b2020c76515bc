//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Coordinates**: Validated latitude/longitude pair
//! - **Distance**: Non-negative great-circle distance in meters

mod coordinates;
mod distance;

pub use coordinates::*;
pub use distance::*;
