//! Location updates, position records, and the events the hub relays.

use serde::{Deserialize, Serialize};

use super::session::SessionId;
use crate::domain::value_objects::{Coordinates, Distance};

/// A validated position report stamped with its sender.
///
/// Arrival order is the only timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub sender_id: SessionId,
    pub coordinates: Coordinates,
}

impl LocationUpdate {
    pub fn new(sender_id: SessionId, coordinates: Coordinates) -> Self {
        Self {
            sender_id,
            coordinates,
        }
    }
}

/// Latest known position for one session. Latest value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub session_id: SessionId,
    pub coordinates: Coordinates,
}

/// Derived distance between two known sessions. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistancePair {
    pub a: PositionRecord,
    pub b: PositionRecord,
    pub distance: Distance,
}

impl DistancePair {
    pub fn involves(&self, session_id: &SessionId) -> bool {
        &self.a.session_id == session_id || &self.b.session_id == session_id
    }
}

/// Events fanned out by the hub to connected sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Sent only to a newly connected session, carrying its own id
    SessionReady(SessionId),
    /// A position update from some session (possibly the recipient itself)
    LocationReceived(LocationUpdate),
    /// A session ended; its state must be dropped everywhere
    SessionEnded(SessionId),
}

impl RelayEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            RelayEvent::SessionReady(_) => "session-ready",
            RelayEvent::LocationReceived(_) => "receive-location",
            RelayEvent::SessionEnded(_) => "user-disconnected",
        }
    }
}
