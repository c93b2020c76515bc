//! Location Broadcast Hub
//!
//! A single task owns the session registry and processes connect, submit,
//! and disconnect commands one at a time, in channel order. Each handler
//! runs to completion before the next command is read, which is what keeps
//! per-sender ordering intact and the registry lock-free.
//!
//! Fan-out never waits on a recipient: every session has a bounded outbound
//! queue. A closed queue means that recipient misses the event; a full one
//! gets the recipient evicted, and the remaining sessions are told it left.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::session_registry::{Delivery, Outbound, SessionRegistry};
use crate::domain::{Coordinates, LocationUpdate, RelayEvent, SessionId};
use crate::infrastructure::metrics;
use crate::shared::error::LocationError;

/// Commands accepted by the hub task
#[derive(Debug)]
pub enum HubCommand {
    Connect {
        outbound: Outbound,
        reply: oneshot::Sender<SessionId>,
    },
    Submit {
        session_id: SessionId,
        latitude: f64,
        longitude: f64,
    },
    Disconnect {
        session_id: SessionId,
    },
    SessionCount {
        reply: oneshot::Sender<usize>,
    },
}

/// Per-event fan-out tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub skipped: usize,
    /// Lagging recipients cut off as a result of this event
    pub evicted: usize,
}

/// Why a submitted update was dropped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("session {0} is not registered")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Invalid(#[from] LocationError),
}

/// Errors talking to the hub task
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("hub task is not running")]
    Stopped,
}

/// Hub state. Driven by [`BroadcastHub::run`] in production; the
/// synchronous methods are the command handlers.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    registry: SessionRegistry,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and tell it its own identifier.
    pub fn connect(&mut self, outbound: Outbound) -> SessionId {
        let session_id = self.registry.on_connect(outbound);
        metrics::set_active_sessions(self.registry.len());

        if let Some(session) = self.registry.get(&session_id) {
            if session.offer(RelayEvent::SessionReady(session_id.clone())) != Delivery::Queued {
                tracing::warn!(session_id = %session_id, "Could not deliver session-ready");
            }
        }

        session_id
    }

    /// Validate a position and relay it to every session, sender included.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason when the update is dropped. Nothing is
    /// emitted and no state changes in that case.
    pub fn submit(
        &mut self,
        session_id: &SessionId,
        latitude: f64,
        longitude: f64,
    ) -> Result<BroadcastReport, Rejection> {
        if !self.registry.contains(session_id) {
            return Err(Rejection::UnknownSession(session_id.clone()));
        }

        let coordinates = Coordinates::new(latitude, longitude)?;
        let update = LocationUpdate::new(session_id.clone(), coordinates);

        let report = self.fan_out(&RelayEvent::LocationReceived(update));
        metrics::record_location_relayed();

        tracing::debug!(
            session_id = %session_id,
            %coordinates,
            delivered = report.delivered,
            skipped = report.skipped,
            evicted = report.evicted,
            "Location relayed"
        );

        Ok(report)
    }

    /// Unregister a session and notify everyone left.
    ///
    /// Returns `None` if the session was not registered.
    pub fn disconnect(&mut self, session_id: &SessionId) -> Option<BroadcastReport> {
        if !self.registry.on_disconnect(session_id) {
            return None;
        }
        metrics::set_active_sessions(self.registry.len());

        let report = self.fan_out(&RelayEvent::SessionEnded(session_id.clone()));
        tracing::debug!(
            session_id = %session_id,
            delivered = report.delivered,
            skipped = report.skipped,
            evicted = report.evicted,
            "Disconnect notice relayed"
        );

        Some(report)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Offer `event` to every session, then evict whoever could not keep up.
    fn fan_out(&mut self, event: &RelayEvent) -> BroadcastReport {
        let (mut report, lagging) = self.offer_all(event);
        report.evicted = self.evict(lagging);
        metrics::record_deliveries_skipped(report.skipped);
        report
    }

    fn offer_all(&self, event: &RelayEvent) -> (BroadcastReport, Vec<SessionId>) {
        let mut report = BroadcastReport::default();
        let mut lagging = Vec::new();

        for (recipient, session) in self.registry.iter() {
            match session.offer(event.clone()) {
                Delivery::Queued => report.delivered += 1,
                Delivery::Lagging => {
                    report.skipped += 1;
                    lagging.push(recipient.clone());
                    tracing::warn!(
                        recipient = %recipient,
                        event = event.event_name(),
                        "Recipient queue full, event dropped"
                    );
                }
                Delivery::Closed => {
                    report.skipped += 1;
                    tracing::debug!(
                        recipient = %recipient,
                        event = event.event_name(),
                        "Recipient closed, event dropped"
                    );
                }
            }
        }

        (report, lagging)
    }

    /// Drop sessions that missed an event and tell the rest they are gone.
    ///
    /// Dropping an evicted session's outbound queue ends its socket writer,
    /// which closes the connection. Recipients that lag on the resulting
    /// notices are evicted in turn.
    fn evict(&mut self, mut pending: Vec<SessionId>) -> usize {
        let mut evicted = 0;

        while let Some(session_id) = pending.pop() {
            if !self.registry.on_disconnect(&session_id) {
                continue;
            }
            evicted += 1;
            metrics::set_active_sessions(self.registry.len());
            tracing::warn!(session_id = %session_id, "Evicted lagging session");

            let (report, lagging) = self.offer_all(&RelayEvent::SessionEnded(session_id));
            metrics::record_deliveries_skipped(report.skipped);
            pending.extend(lagging);
        }

        evicted
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { outbound, reply } => {
                let session_id = self.connect(outbound);
                if reply.send(session_id.clone()).is_err() {
                    // connection went away while waiting for its id
                    self.disconnect(&session_id);
                }
            }
            HubCommand::Submit {
                session_id,
                latitude,
                longitude,
            } => {
                if let Err(rejection) = self.submit(&session_id, latitude, longitude) {
                    metrics::record_location_rejected();
                    tracing::warn!(
                        session_id = %session_id,
                        latitude,
                        longitude,
                        reason = %rejection,
                        "Location update dropped"
                    );
                }
            }
            HubCommand::Disconnect { session_id } => {
                self.disconnect(&session_id);
            }
            HubCommand::SessionCount { reply } => {
                let _ = reply.send(self.session_count());
            }
        }
    }

    /// Process commands until every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<HubCommand>) {
        tracing::info!("Broadcast hub started");
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        tracing::info!(sessions = self.registry.len(), "Broadcast hub stopped");
    }
}

/// Cloneable front door to the hub task
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Spawn the hub task with a command queue of `buffer` entries.
    pub fn spawn(buffer: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(BroadcastHub::new().run(rx));
        (Self { commands: tx }, task)
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(|_| HubError::Stopped)
    }

    /// Register a connection whose events go to `outbound`.
    pub async fn connect(&self, outbound: Outbound) -> Result<SessionId, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Connect { outbound, reply }).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    /// Fire-and-forget position submission.
    pub async fn submit(
        &self,
        session_id: SessionId,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Submit {
            session_id,
            latitude,
            longitude,
        })
        .await
    }

    pub async fn disconnect(&self, session_id: SessionId) -> Result<(), HubError> {
        self.send(HubCommand::Disconnect { session_id }).await
    }

    pub async fn session_count(&self) -> Result<usize, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::SessionCount { reply }).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(rx: &mut mpsc::Receiver<RelayEvent>) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn connect(hub: &mut BroadcastHub) -> (SessionId, mpsc::Receiver<RelayEvent>) {
        let (tx, mut rx) = mpsc::channel(16);
        let id = hub.connect(tx);
        assert_eq!(drain(&mut rx), vec![RelayEvent::SessionReady(id.clone())]);
        (id, rx)
    }

    #[test]
    fn test_submit_reaches_every_session_including_sender() {
        let mut hub = BroadcastHub::new();
        let (u1, mut rx1) = connect(&mut hub);
        let (_u2, mut rx2) = connect(&mut hub);
        let (_u3, mut rx3) = connect(&mut hub);

        let report = hub.submit(&u1, 12.5, -45.25).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 3, skipped: 0, evicted: 0 });

        let expected = RelayEvent::LocationReceived(LocationUpdate::new(
            u1.clone(),
            Coordinates::new(12.5, -45.25).unwrap(),
        ));
        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            assert_eq!(drain(rx), vec![expected.clone()]);
        }
    }

    #[test]
    fn test_out_of_range_update_is_dropped() {
        let mut hub = BroadcastHub::new();
        let (u1, mut rx1) = connect(&mut hub);
        let (_u2, mut rx2) = connect(&mut hub);

        let result = hub.submit(&u1, 200.0, 0.0);
        assert!(matches!(result, Err(Rejection::Invalid(_))));
        assert!(drain(&mut rx1).is_empty());
        assert!(drain(&mut rx2).is_empty());
        assert_eq!(hub.session_count(), 2);
    }

    #[test]
    fn test_unknown_sender_is_dropped() {
        let mut hub = BroadcastHub::new();
        let (_u1, mut rx1) = connect(&mut hub);

        let ghost = SessionId::from("ghost");
        assert_eq!(
            hub.submit(&ghost, 1.0, 1.0),
            Err(Rejection::UnknownSession(ghost))
        );
        assert!(drain(&mut rx1).is_empty());
    }

    #[test]
    fn test_disconnect_notifies_remaining_sessions() {
        let mut hub = BroadcastHub::new();
        let (u1, rx1) = connect(&mut hub);
        let (_u2, mut rx2) = connect(&mut hub);
        drop(rx1);

        let report = hub.disconnect(&u1).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, skipped: 0, evicted: 0 });
        assert_eq!(drain(&mut rx2), vec![RelayEvent::SessionEnded(u1.clone())]);

        assert_eq!(hub.disconnect(&u1), None);
        assert!(drain(&mut rx2).is_empty());
    }

    #[test]
    fn test_full_recipient_does_not_block_others() {
        let mut hub = BroadcastHub::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let slow = hub.connect(slow_tx); // session-ready fills the queue
        let (fast, mut fast_rx) = connect(&mut hub);

        let report = hub.submit(&fast, 1.0, 2.0).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, skipped: 1, evicted: 1 });
        assert_eq!(
            drain(&mut fast_rx),
            vec![
                RelayEvent::LocationReceived(LocationUpdate::new(
                    fast.clone(),
                    Coordinates::new(1.0, 2.0).unwrap(),
                )),
                RelayEvent::SessionEnded(slow.clone()),
            ]
        );
        assert_eq!(drain(&mut slow_rx), vec![RelayEvent::SessionReady(slow)]);
    }

    #[test]
    fn test_lagging_recipient_of_disconnect_notice_is_evicted() {
        let mut hub = BroadcastHub::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(2);
        let slow = hub.connect(slow_tx);
        let (u2, _rx2) = connect(&mut hub);
        let (_u3, mut rx3) = connect(&mut hub);

        // session-ready plus u2's update fill the slow queue
        hub.submit(&u2, 0.0, 0.01).unwrap();
        drain(&mut rx3);

        let report = hub.disconnect(&u2).unwrap();
        assert_eq!(report.evicted, 1);
        assert!(!hub.registry.contains(&slow));
        assert_eq!(hub.session_count(), 1);

        // the survivor learns about both departures
        assert_eq!(
            drain(&mut rx3),
            vec![
                RelayEvent::SessionEnded(u2.clone()),
                RelayEvent::SessionEnded(slow.clone()),
            ]
        );

        // the evicted queue is closed once drained, so its writer stops
        assert_eq!(drain(&mut slow_rx).len(), 2);
        assert_eq!(
            slow_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn test_same_sender_order_is_preserved() {
        let mut hub = BroadcastHub::new();
        let (u1, _rx1) = connect(&mut hub);
        let (_u2, mut rx2) = connect(&mut hub);

        for i in 0..5 {
            hub.submit(&u1, i as f64, 0.0).unwrap();
        }

        let latitudes: Vec<f64> = drain(&mut rx2)
            .into_iter()
            .map(|event| match event {
                RelayEvent::LocationReceived(update) => update.coordinates.latitude(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(latitudes, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_handle_round_trip_through_task() {
        let (hub, task) = HubHandle::spawn(32);
        let (tx1, mut rx1) = mpsc::channel(16);
        let (tx2, mut rx2) = mpsc::channel(16);

        let u1 = hub.connect(tx1).await.unwrap();
        let u2 = hub.connect(tx2).await.unwrap();
        assert_eq!(hub.session_count().await.unwrap(), 2);

        hub.submit(u2.clone(), 0.0, 0.01).await.unwrap();
        hub.disconnect(u2.clone()).await.unwrap();
        assert_eq!(hub.session_count().await.unwrap(), 1);

        assert_eq!(rx1.recv().await, Some(RelayEvent::SessionReady(u1)));
        assert!(matches!(
            rx1.recv().await,
            Some(RelayEvent::LocationReceived(update)) if update.sender_id == u2
        ));
        assert_eq!(rx1.recv().await, Some(RelayEvent::SessionEnded(u2.clone())));

        assert_eq!(rx2.recv().await, Some(RelayEvent::SessionReady(u2)));

        drop(hub);
        task.await.unwrap();
    }
}
