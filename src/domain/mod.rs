//! # Domain Layer
//!
//! The domain layer contains the core concepts of the location relay.
//! It is independent of any transport or runtime concerns.
//!
//! ## Structure
//!
//! - **entities**: Sessions, location updates, position records, relay events
//! - **value_objects**: Validated coordinates and distances
//! - **services**: Great-circle geometry

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
