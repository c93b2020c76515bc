//! Tracker Client
//!
//! The client-side event loop. Sensor fixes and hub events arrive on one
//! queue and are applied strictly one at a time, so the position store is
//! never written by two events at once and the most recent arrival for a
//! session always wins.

use std::ops::ControlFlow;

use tokio::sync::mpsc;

use super::distance_engine::{DistanceEngine, DistanceMode, Line};
use super::position_store::PositionStore;
use super::presenter::{LineStyle, MapPresenter, DEFAULT_ZOOM};
use super::sensor::SensorEvent;
use crate::domain::{Coordinates, LocationUpdate, RelayEvent, SessionId};

/// Everything the tracker reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Sensor(SensorEvent),
    Relay(RelayEvent),
    /// Connection to the hub is gone
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum UplinkError {
    #[error("connection to hub closed")]
    Closed,
}

/// Outbound path for this client's own position. Fire-and-forget.
pub trait LocationUplink: Send {
    fn send_location(&self, coordinates: Coordinates) -> Result<(), UplinkError>;
}

impl LocationUplink for mpsc::UnboundedSender<Coordinates> {
    fn send_location(&self, coordinates: Coordinates) -> Result<(), UplinkError> {
        self.send(coordinates).map_err(|_| UplinkError::Closed)
    }
}

/// Running totals, mostly for the shutdown log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub fixes_sent: u64,
    pub sensor_errors: u64,
    pub updates_applied: u64,
    pub disconnects: u64,
}

pub struct Tracker<P, U> {
    store: PositionStore,
    engine: DistanceEngine,
    presenter: P,
    uplink: U,
    style: LineStyle,
    zoom: u8,
    session_id: Option<SessionId>,
    stats: TrackerStats,
}

impl<P, U> Tracker<P, U>
where
    P: MapPresenter,
    U: LocationUplink,
{
    pub fn new(mode: DistanceMode, mut presenter: P, uplink: U) -> Self {
        let store = PositionStore::new();
        presenter.set_view(Coordinates::ORIGIN, DEFAULT_ZOOM);
        Self {
            engine: DistanceEngine::new(mode, store.clone()),
            store,
            presenter,
            uplink,
            style: LineStyle::default(),
            zoom: DEFAULT_ZOOM,
            session_id: None,
            stats: TrackerStats::default(),
        }
    }

    /// Zoom for the initial view and every recenter. Resets the view to the origin.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self.presenter.set_view(Coordinates::ORIGIN, zoom);
        self
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn lines(&self) -> &[Line] {
        self.engine.lines()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Our own id, once the hub has told us
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Apply one event. Breaks when the hub connection is gone.
    pub fn handle(&mut self, event: TrackerEvent) -> ControlFlow<()> {
        match event {
            TrackerEvent::Sensor(SensorEvent::Fix(coordinates)) => {
                if let Err(e) = self.uplink.send_location(coordinates) {
                    tracing::warn!(error = %e, "Could not send location");
                } else {
                    self.stats.fixes_sent += 1;
                }
            }
            TrackerEvent::Sensor(SensorEvent::Error(e)) => {
                self.stats.sensor_errors += 1;
                tracing::warn!(error = %e, "Geolocation error");
            }
            TrackerEvent::Relay(relay) => self.handle_relay(relay),
            TrackerEvent::Closed => {
                self.reset();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_relay(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::SessionReady(id) => {
                tracing::info!(session_id = %id, "Joined hub");
                self.session_id = Some(id);
            }
            RelayEvent::LocationReceived(update) => self.on_location(update),
            RelayEvent::SessionEnded(id) => self.on_session_ended(&id),
        }
    }

    fn on_location(&mut self, update: LocationUpdate) {
        let changed = self.store.apply(&update);
        self.stats.updates_applied += 1;

        // most recent arrival wins the camera
        self.presenter.set_view(update.coordinates, self.zoom);
        self.presenter
            .upsert_marker(&update.sender_id, update.coordinates);

        if changed {
            self.redraw();
        }
    }

    fn on_session_ended(&mut self, id: &SessionId) {
        self.stats.disconnects += 1;
        if self.store.remove(id) {
            self.presenter.remove_marker(id);
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        for change in self.engine.recompute() {
            self.presenter.apply_line_change(&change, &self.style);
        }
    }

    /// Drop everything we know; a fresh connection starts from scratch.
    fn reset(&mut self) {
        for change in self.engine.clear() {
            self.presenter.apply_line_change(&change, &self.style);
        }
        for record in self.store.records() {
            self.store.remove(&record.session_id);
            self.presenter.remove_marker(&record.session_id);
        }
        self.session_id = None;
    }

    /// Process events until the queue closes or a `Closed` event arrives.
    pub async fn run(mut self, mut events: mpsc::Receiver<TrackerEvent>) -> Self {
        while let Some(event) = events.recv().await {
            if self.handle(event).is_break() {
                break;
            }
        }

        tracing::info!(
            fixes_sent = self.stats.fixes_sent,
            sensor_errors = self.stats.sensor_errors,
            updates_applied = self.stats.updates_applied,
            disconnects = self.stats.disconnects,
            "Tracker stopped"
        );
        self
    }
}
