//! Distance Engine
//!
//! Turns the records in a [`PositionStore`] into pairwise great-circle
//! distances and decides which connecting lines should be on the map.
//!
//! Two selection policies are supported:
//!
//! - [`DistanceMode::TwoParty`]: one line between the first two sessions
//!   seen, removed as soon as fewer than two records remain.
//! - [`DistanceMode::AllPairs`]: a line for every unordered pair, rebuilt
//!   from scratch on each recompute. Quadratic in the number of sessions,
//!   which stays in the single digits.
//!
//! [`DistanceEngine::recompute`] diffs the fresh selection against the lines
//! it drew last time and emits only the changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::position_store::PositionStore;
use crate::domain::services::haversine;
use crate::domain::{Coordinates, Distance, DistancePair, PositionRecord, SessionId};

/// Which pairs the engine surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    TwoParty,
    #[default]
    AllPairs,
}

impl DistanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMode::TwoParty => "two_party",
            DistanceMode::AllPairs => "all_pairs",
        }
    }
}

impl FromStr for DistanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "two_party" | "pair" => Ok(Self::TwoParty),
            "all_pairs" | "all" => Ok(Self::AllPairs),
            other => Err(format!(
                "unknown distance mode '{}', expected two_party or all_pairs",
                other
            )),
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a connecting line: the two sessions in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub a: SessionId,
    pub b: SessionId,
}

impl LineKey {
    pub fn involves(&self, session_id: &SessionId) -> bool {
        &self.a == session_id || &self.b == session_id
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.a, self.b)
    }
}

/// A line as it should appear on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub key: LineKey,
    pub from: Coordinates,
    pub to: Coordinates,
    pub distance: Distance,
}

impl Line {
    fn from_pair(pair: &DistancePair) -> Self {
        Self {
            key: LineKey {
                a: pair.a.session_id.clone(),
                b: pair.b.session_id.clone(),
            },
            from: pair.a.coordinates,
            to: pair.b.coordinates,
            distance: pair.distance,
        }
    }

    /// Text shown next to the line, e.g. `"1.11 km"`.
    pub fn label(&self) -> String {
        self.distance.to_km_label()
    }

    pub fn label_position(&self) -> Coordinates {
        self.from.midpoint(&self.to)
    }
}

/// Presentation changes produced by a recompute
#[derive(Debug, Clone, PartialEq)]
pub enum LineChange {
    Draw(Line),
    /// Endpoints moved; replace the existing line and label
    Redraw(Line),
    Remove(LineKey),
}

/// Compute the distance between two records.
pub fn pair_of(a: &PositionRecord, b: &PositionRecord) -> DistancePair {
    DistancePair {
        distance: haversine(&a.coordinates, &b.coordinates),
        a: a.clone(),
        b: b.clone(),
    }
}

/// Pairwise distance calculator bound to one client's store
#[derive(Debug)]
pub struct DistanceEngine {
    mode: DistanceMode,
    store: PositionStore,
    /// Lines currently on the map, in draw order
    drawn: Vec<Line>,
}

impl DistanceEngine {
    pub fn new(mode: DistanceMode, store: PositionStore) -> Self {
        Self {
            mode,
            store,
            drawn: Vec::new(),
        }
    }

    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    /// Lines drawn by the last recompute
    pub fn lines(&self) -> &[Line] {
        &self.drawn
    }

    /// Distance pairs selected by the current mode, from a fresh snapshot.
    pub fn pairs(&self) -> Vec<DistancePair> {
        match self.mode {
            DistanceMode::TwoParty => self
                .store
                .first_two()
                .map(|(a, b)| vec![pair_of(&a, &b)])
                .unwrap_or_default(),
            DistanceMode::AllPairs => {
                let records = self.store.records();
                let mut pairs = Vec::with_capacity(records.len() * records.len().saturating_sub(1) / 2);
                for (i, a) in records.iter().enumerate() {
                    for b in &records[i + 1..] {
                        pairs.push(pair_of(a, b));
                    }
                }
                pairs
            }
        }
    }

    /// Re-derive the line set and return what changed since last time.
    ///
    /// Removals come first so a presenter never shows a line for a session
    /// that is gone.
    pub fn recompute(&mut self) -> Vec<LineChange> {
        let fresh: Vec<Line> = self.pairs().iter().map(Line::from_pair).collect();
        let mut changes = Vec::new();

        for old in &self.drawn {
            if !fresh.iter().any(|line| line.key == old.key) {
                changes.push(LineChange::Remove(old.key.clone()));
            }
        }

        for line in &fresh {
            match self.drawn.iter().find(|old| old.key == line.key) {
                None => changes.push(LineChange::Draw(line.clone())),
                Some(old) if old != line => changes.push(LineChange::Redraw(line.clone())),
                Some(_) => {}
            }
        }

        self.drawn = fresh;
        changes
    }

    /// Take every line down, e.g. when the connection to the hub is lost.
    pub fn clear(&mut self) -> Vec<LineChange> {
        self.drawn
            .drain(..)
            .map(|line| LineChange::Remove(line.key))
            .collect()
    }
}
