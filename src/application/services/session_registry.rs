//! Session Registry
//!
//! Maps live connections to session identifiers. Owned by the hub task, so
//! nothing here locks: every mutation happens on that one task.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::domain::{RelayEvent, SessionId};

/// Outbound queue feeding one connection's socket writer
pub type Outbound = mpsc::Sender<RelayEvent>;

/// Bookkeeping for one connected session
#[derive(Debug)]
pub struct RegisteredSession {
    pub outbound: Outbound,
    pub connected_at: Instant,
}

/// Outcome of offering one event to one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue full; the recipient misses this event
    Lagging,
    /// Writer side is gone; the disconnect is on its way
    Closed,
}

impl RegisteredSession {
    /// Offer an event without waiting on the recipient.
    pub fn offer(&self, event: RelayEvent) -> Delivery {
        match self.outbound.try_send(event) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Lagging,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Live sessions keyed by identifier
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, RegisteredSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and hand back its identifier.
    pub fn on_connect(&mut self, outbound: Outbound) -> SessionId {
        let mut session_id = SessionId::generate();
        // v4 collisions are not a practical concern, but an id must never
        // alias a live session
        while self.sessions.contains_key(&session_id) {
            session_id = SessionId::generate();
        }

        self.sessions.insert(
            session_id.clone(),
            RegisteredSession {
                outbound,
                connected_at: Instant::now(),
            },
        );

        tracing::info!(
            session_id = %session_id,
            total = self.sessions.len(),
            "Session registered"
        );

        session_id
    }

    /// Drop a session's bookkeeping. Returns false for unknown ids.
    pub fn on_disconnect(&mut self, session_id: &SessionId) -> bool {
        match self.sessions.remove(session_id) {
            Some(session) => {
                tracing::info!(
                    session_id = %session_id,
                    connected_secs = session.connected_at.elapsed().as_secs(),
                    total = self.sessions.len(),
                    "Session unregistered"
                );
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&RegisteredSession> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &RegisteredSession)> {
        self.sessions.iter()
    }
}
