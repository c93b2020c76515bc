//! # Domain Entities
//!
//! Core domain entities of the location relay.
//!
//! - **Session**: One live client connection, identified by a `SessionId`
//! - **LocationUpdate**: A validated position report stamped with its sender
//! - **PositionRecord**: Latest known position of a session on a client
//! - **DistancePair**: Derived distance between two known sessions
//! - **RelayEvent**: What the hub fans out to connected sessions

mod position;
mod session;

pub use position::{DistancePair, LocationUpdate, PositionRecord, RelayEvent};
pub use session::SessionId;
