//! WebSocket Connection State

use std::time::Instant;

use crate::domain::SessionId;

/// Per-connection bookkeeping kept by the socket task
#[derive(Debug)]
pub struct ConnectionState {
    pub session_id: SessionId,
    pub last_seen: Instant,
    pub frames_received: u64,
    pub frames_rejected: u64,
}

impl ConnectionState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            last_seen: Instant::now(),
            frames_received: 0,
            frames_rejected: 0,
        }
    }

    /// Record inbound traffic of any kind, pongs included.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn record_frame(&mut self) {
        self.frames_received += 1;
        self.touch();
    }

    pub fn record_rejected(&mut self) {
        self.frames_rejected += 1;
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_seen.elapsed().as_millis() < timeout_ms as u128
    }
}
