//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::{SinkExt, StreamExt};
use tower::ServiceExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use location_relay::application::services::HubHandle;
use location_relay::config::Settings;
use location_relay::domain::{RelayEvent, SessionId};
use location_relay::presentation::websocket::decode_server;
use location_relay::startup::{build_router, AppState};

/// How long a test waits for a frame it expects
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings for tests: defaults plus the crate's own static directory
pub fn test_settings() -> Settings {
    let mut settings = Settings::default_for("test").expect("default settings");
    settings.server.host = "127.0.0.1".into();
    settings.server.port = 0;
    settings.server.static_dir = format!("{}/public", env!("CARGO_MANIFEST_DIR"));
    settings
}

/// Full router backed by a live hub task
pub fn test_router() -> (Router, HubHandle) {
    let settings = test_settings();
    let (hub, _task) = HubHandle::spawn(settings.hub.command_buffer);
    let state = AppState {
        hub: hub.clone(),
        settings: Arc::new(settings),
    };
    (build_router(state), hub)
}

/// Response status and body text from a one-shot request
pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Like [`get`], parsing the body as JSON
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_str(&body).expect("JSON body"))
}

/// Test application listening on an OS-assigned port
pub struct TestApp {
    pub addr: SocketAddr,
    pub hub: HubHandle,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let (router, hub) = test_router();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("server error: {}", e);
            }
        });

        Self { addr, hub }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Connect and wait for the session-ready greeting
    pub async fn join(&self) -> Participant {
        let (stream, _) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .expect("connect");
        let mut participant = Participant { stream, id: None };
        match participant.next_event().await {
            RelayEvent::SessionReady(id) => participant.id = Some(id),
            other => panic!("expected session-ready, got {:?}", other),
        }
        participant
    }
}

/// One WebSocket client of the relay
pub struct Participant {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    id: Option<SessionId>,
}

impl Participant {
    pub fn id(&self) -> &SessionId {
        self.id.as_ref().expect("joined participant has an id")
    }

    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_owned().into()))
            .await
            .expect("send");
    }

    pub async fn send_location(&mut self, latitude: f64, longitude: f64) {
        let frame = serde_json::json!({
            "event": "send-location",
            "data": {"latitude": latitude, "longitude": longitude}
        });
        self.send_text(&frame.to_string()).await;
    }

    /// Next relay event, skipping control frames
    pub async fn next_event(&mut self) -> RelayEvent {
        self.try_next_event(RECV_TIMEOUT)
            .await
            .expect("timed out waiting for relay event")
    }

    /// Next relay event within `wait`, or None
    pub async fn try_next_event(&mut self, wait: Duration) -> Option<RelayEvent> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .ok()??;
            match frame.expect("websocket error") {
                Message::Text(txt) => {
                    return Some(decode_server(txt.as_str()).expect("valid hub frame"))
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Wait for the server to close this connection, skipping any events
    pub async fn closed_by_server(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Err(_) => return false,
                Ok(None) | Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) => return true,
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    pub async fn leave(mut self) {
        let _ = self.stream.close(None).await;
    }
}
