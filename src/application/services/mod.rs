//! Application Services
//!
//! Server-side services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **SessionRegistry**: Live connections keyed by session id
//! - **BroadcastHub**: Validates location updates and fans them out

pub mod broadcast_hub;
pub mod session_registry;

pub use broadcast_hub::{BroadcastHub, BroadcastReport, HubCommand, HubError, HubHandle, Rejection};
pub use session_registry::{Delivery, Outbound, RegisteredSession, SessionRegistry};
