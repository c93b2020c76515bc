//! Geolocation Sensor
//!
//! A standing subscription that keeps producing fixes until the tracker's
//! event queue closes. Errors are reported as events and never end the
//! subscription.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::tracker::TrackerEvent;
use crate::domain::Coordinates;

/// Subscription options, mirroring what a browser geolocation watch takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SensorOptions {
    pub high_accuracy: bool,
    /// Acquisition timeout per fix
    pub timeout_ms: u64,
    /// Maximum age of a cached fix; 0 means always fresh
    pub max_cache_age_ms: u64,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 5000,
            max_cache_age_ms: 0,
        }
    }
}

/// Non-fatal sensor failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("no fix within {0} ms")]
    Timeout(u64),
}

/// Output of a sensor subscription
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Fix(Coordinates),
    Error(SensorError),
}

#[async_trait]
pub trait GeolocationSensor: Send + Sync {
    /// Push fixes and errors into `events` until it closes.
    async fn watch(&self, options: SensorOptions, events: mpsc::Sender<TrackerEvent>);
}

/// One stop on a replayed route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Coordinates,
    /// How long acquiring this fix takes; long delays model poor signal
    pub fix_delay: Duration,
}

impl Waypoint {
    pub fn delayed(position: Coordinates, fix_delay: Duration) -> Self {
        Self {
            position,
            fix_delay,
        }
    }
}

impl From<Coordinates> for Waypoint {
    fn from(position: Coordinates) -> Self {
        Self::delayed(position, Duration::ZERO)
    }
}

/// Replays a fixed route, one waypoint per interval
#[derive(Debug, Clone)]
pub struct RouteSensor {
    waypoints: Vec<Waypoint>,
    interval: Duration,
    repeat: bool,
}

impl RouteSensor {
    pub fn new(waypoints: Vec<Waypoint>, interval: Duration) -> Self {
        Self {
            waypoints,
            interval,
            repeat: true,
        }
    }

    /// Stop after the last waypoint instead of starting over.
    pub fn once(mut self) -> Self {
        self.repeat = false;
        self
    }

    async fn acquire(&self, step: usize) -> Result<Coordinates, SensorError> {
        if self.waypoints.is_empty() {
            return Err(SensorError::Unavailable("route has no waypoints".into()));
        }
        let waypoint = self.waypoints[step % self.waypoints.len()];
        if !waypoint.fix_delay.is_zero() {
            tokio::time::sleep(waypoint.fix_delay).await;
        }
        Ok(waypoint.position)
    }
}

#[async_trait]
impl GeolocationSensor for RouteSensor {
    async fn watch(&self, options: SensorOptions, events: mpsc::Sender<TrackerEvent>) {
        tracing::info!(
            waypoints = self.waypoints.len(),
            interval_ms = self.interval.as_millis() as u64,
            high_accuracy = options.high_accuracy,
            "Sensor subscription started"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut step = 0usize;
        loop {
            ticker.tick().await;

            if !self.repeat && step >= self.waypoints.len() {
                break;
            }

            let budget = Duration::from_millis(options.timeout_ms);
            let event = match timeout(budget, self.acquire(step)).await {
                Ok(Ok(fix)) => SensorEvent::Fix(fix),
                Ok(Err(e)) => SensorEvent::Error(e),
                Err(_) => {
                    tracing::debug!(step, timeout_ms = options.timeout_ms, "Fix timed out");
                    SensorEvent::Error(SensorError::Timeout(options.timeout_ms))
                }
            };
            step += 1;

            if events.send(TrackerEvent::Sensor(event)).await.is_err() {
                break;
            }
        }

        tracing::info!(fixes = step, "Sensor subscription ended");
    }
}
