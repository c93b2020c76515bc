//! Client Position Store
//!
//! Latest known position per session, in the order sessions were first
//! heard about. The store is a cheap handle over shared state so the
//! distance engine and a renderer can read it while the tracker loop
//! writes. Each record is swapped whole under the write lock; readers see
//! the old record or the new one, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{Coordinates, LocationUpdate, PositionRecord, SessionId};

#[derive(Debug, Default)]
struct Inner {
    /// Session ids in first-seen order
    order: Vec<SessionId>,
    positions: HashMap<SessionId, Coordinates>,
}

/// Shared handle to one client's position cache
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    inner: Arc<RwLock<Inner>>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the sender's record. Returns whether anything changed.
    pub fn apply(&self, update: &LocationUpdate) -> bool {
        let mut inner = self.inner.write();
        match inner.positions.get(&update.sender_id) {
            Some(current) if *current == update.coordinates => false,
            Some(_) => {
                inner
                    .positions
                    .insert(update.sender_id.clone(), update.coordinates);
                true
            }
            None => {
                inner.order.push(update.sender_id.clone());
                inner
                    .positions
                    .insert(update.sender_id.clone(), update.coordinates);
                true
            }
        }
    }

    /// Forget a session. Returns false if it was never known.
    pub fn remove(&self, session_id: &SessionId) -> bool {
        let mut inner = self.inner.write();
        if inner.positions.remove(session_id).is_none() {
            return false;
        }
        inner.order.retain(|id| id != session_id);
        true
    }

    pub fn get(&self, session_id: &SessionId) -> Option<Coordinates> {
        self.inner.read().positions.get(session_id).copied()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.inner.read().positions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().positions.is_empty()
    }

    /// Consistent snapshot of every record in first-seen order.
    pub fn records(&self) -> Vec<PositionRecord> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| {
                inner.positions.get(id).map(|coordinates| PositionRecord {
                    session_id: id.clone(),
                    coordinates: *coordinates,
                })
            })
            .collect()
    }

    /// The two earliest-seen sessions, if at least two are known.
    pub fn first_two(&self) -> Option<(PositionRecord, PositionRecord)> {
        let mut records = self.records().into_iter();
        match (records.next(), records.next()) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}
