//! Map Presentation
//!
//! The map itself is an external collaborator. The tracker only needs the
//! capabilities in [`MapPresenter`]; [`ConsoleMap`] is a headless
//! implementation that keeps the resulting map state in memory and logs
//! every change.

use std::collections::BTreeMap;

use super::distance_engine::{LineChange, LineKey};
use crate::domain::{Coordinates, SessionId};

/// Zoom used for the initial view and every recenter
pub const DEFAULT_ZOOM: u8 = 16;

/// Stroke settings for connecting lines
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub weight: u8,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            weight: 3,
        }
    }
}

/// Rendering capabilities the tracker relies on.
pub trait MapPresenter: Send {
    fn set_view(&mut self, center: Coordinates, zoom: u8);

    fn upsert_marker(&mut self, id: &SessionId, position: Coordinates);

    fn remove_marker(&mut self, id: &SessionId);

    fn draw_line(&mut self, key: &LineKey, from: Coordinates, to: Coordinates, style: &LineStyle);

    /// Remove a line and any label attached to it.
    fn remove_line(&mut self, key: &LineKey);

    fn show_label(&mut self, key: &LineKey, position: Coordinates, text: &str);

    /// Apply one engine change. Redraws replace the line and its label.
    fn apply_line_change(&mut self, change: &LineChange, style: &LineStyle) {
        match change {
            LineChange::Draw(line) | LineChange::Redraw(line) => {
                if matches!(change, LineChange::Redraw(_)) {
                    self.remove_line(&line.key);
                }
                self.draw_line(&line.key, line.from, line.to, style);
                self.show_label(&line.key, line.label_position(), &line.label());
            }
            LineChange::Remove(key) => self.remove_line(key),
        }
    }
}

/// A drawn line with its label
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLine {
    pub from: Coordinates,
    pub to: Coordinates,
    pub style: LineStyle,
    pub label: Option<(Coordinates, String)>,
}

/// Current contents of a [`ConsoleMap`]
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: BTreeMap<SessionId, Coordinates>,
    pub lines: BTreeMap<LineKey, DrawnLine>,
}

impl Default for MapSnapshot {
    fn default() -> Self {
        Self {
            center: Coordinates::ORIGIN,
            zoom: DEFAULT_ZOOM,
            markers: BTreeMap::new(),
            lines: BTreeMap::new(),
        }
    }
}

impl MapSnapshot {
    /// Label texts currently on the map, in line key order.
    pub fn labels(&self) -> Vec<String> {
        self.lines
            .values()
            .filter_map(|line| line.label.as_ref().map(|(_, text)| text.clone()))
            .collect()
    }
}

/// Headless presenter: tracks map state and logs each change
#[derive(Debug, Default)]
pub struct ConsoleMap {
    snapshot: MapSnapshot,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &MapSnapshot {
        &self.snapshot
    }
}

impl MapPresenter for ConsoleMap {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.snapshot.center = center;
        self.snapshot.zoom = zoom;
        tracing::debug!(%center, zoom, "View recentered");
    }

    fn upsert_marker(&mut self, id: &SessionId, position: Coordinates) {
        if self.snapshot.markers.insert(id.clone(), position).is_none() {
            tracing::info!(session_id = %id, %position, "Marker added");
        } else {
            tracing::debug!(session_id = %id, %position, "Marker moved");
        }
    }

    fn remove_marker(&mut self, id: &SessionId) {
        if self.snapshot.markers.remove(id).is_some() {
            tracing::info!(session_id = %id, "Marker removed");
        }
    }

    fn draw_line(&mut self, key: &LineKey, from: Coordinates, to: Coordinates, style: &LineStyle) {
        self.snapshot.lines.insert(
            key.clone(),
            DrawnLine {
                from,
                to,
                style: style.clone(),
                label: None,
            },
        );
    }

    fn remove_line(&mut self, key: &LineKey) {
        if self.snapshot.lines.remove(key).is_some() {
            tracing::info!(line = %key, "Line removed");
        }
    }

    fn show_label(&mut self, key: &LineKey, position: Coordinates, text: &str) {
        match self.snapshot.lines.get_mut(key) {
            Some(line) => {
                line.label = Some((position, text.to_string()));
                tracing::info!(line = %key, distance = text, "Distance");
            }
            None => tracing::warn!(line = %key, "Label for a line that is not drawn"),
        }
    }
}
