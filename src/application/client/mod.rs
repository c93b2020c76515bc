//! Client Side
//!
//! Everything a participant runs locally: the position cache, the distance
//! engine, the capability traits for the map and the location sensor, and
//! the tracker loop that ties them together.
//!
//! ## Components
//!
//! - **PositionStore**: Latest position per session, first-seen order
//! - **DistanceEngine**: Pairwise haversine distances, two-party or all-pairs
//! - **MapPresenter**: Rendering capability; `ConsoleMap` is the headless one
//! - **GeolocationSensor**: Standing position subscription; `RouteSensor` replays waypoints
//! - **Tracker**: Single-threaded event loop over sensor and hub events

pub mod distance_engine;
pub mod position_store;
pub mod presenter;
pub mod sensor;
pub mod tracker;

pub use distance_engine::{DistanceEngine, DistanceMode, Line, LineChange, LineKey};
pub use position_store::PositionStore;
pub use presenter::{ConsoleMap, LineStyle, MapPresenter, MapSnapshot, DEFAULT_ZOOM};
pub use sensor::{
    GeolocationSensor, RouteSensor, SensorError, SensorEvent, SensorOptions, Waypoint,
};
pub use tracker::{LocationUplink, Tracker, TrackerEvent, TrackerStats, UplinkError};
