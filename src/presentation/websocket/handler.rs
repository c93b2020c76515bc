//! WebSocket Connection Handler
//!
//! One task per connection reads frames and forwards commands to the hub.
//! A writer task drains the connection's outbound queue into the socket and
//! sends pings, so a slow socket only ever backs up its own queue.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use super::messages::{decode_client, encode, ClientMessage, ServerMessage};
use super::session::ConnectionState;
use crate::application::services::HubHandle;
use crate::domain::RelayEvent;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let settings = &state.settings.websocket;
    ws.max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let ws_settings = state.settings.websocket.clone();

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Bounded queue: the hub drops events for this session when it fills
    let (tx, mut rx) = mpsc::channel::<RelayEvent>(ws_settings.outbound_buffer);

    let session_id = match state.hub.connect(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Hub unavailable, rejecting connection");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    let mut connection = ConnectionState::new(session_id.clone());

    tracing::debug!(session_id = %session_id, "WebSocket connection established");

    // Spawn task to forward hub events and pings to the socket
    let heartbeat = Duration::from_millis(ws_settings.heartbeat_interval_ms);
    let writer_session = session_id.clone();
    let mut writer_task = tokio::spawn(async move {
        let mut ping = interval(heartbeat);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ping.tick().await; // Skip first immediate tick

        loop {
            let frame = tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => match encode(&ServerMessage::from(event)) {
                        Ok(text) => Message::Text(text.into()),
                        Err(e) => {
                            tracing::error!(session_id = %writer_session, error = %e, "Failed to serialize event");
                            continue;
                        }
                    },
                    None => {
                        // Hub dropped this session; close so the client resets
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                },
                _ = ping.tick() => Message::Ping(Default::default()),
            };

            if sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    let mut idle_check = interval(heartbeat);
    idle_check.tick().await; // Skip first immediate tick
    let idle_timeout_ms = ws_settings.idle_timeout_ms();

    // Main message loop
    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        connection.record_frame();
                        if !handle_text(text.as_str(), &mut connection, &state.hub).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        connection.record_frame();
                        connection.record_rejected();
                        tracing::debug!(session_id = %session_id, "Ignoring binary frame");
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong; axum answers pings itself
                        connection.touch();
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            _ = &mut writer_task => {
                tracing::debug!(session_id = %session_id, "Writer finished, closing connection");
                break;
            }

            _ = idle_check.tick() => {
                if !connection.is_alive(idle_timeout_ms) {
                    tracing::info!(session_id = %session_id, "Heartbeat timeout, closing connection");
                    break;
                }
            }
        }
    }

    // Cleanup
    if let Err(e) = state.hub.disconnect(session_id.clone()).await {
        tracing::warn!(session_id = %session_id, error = %e, "Hub gone during disconnect");
    }
    writer_task.abort();

    tracing::info!(
        session_id = %session_id,
        frames = connection.frames_received,
        rejected = connection.frames_rejected,
        "Client disconnected"
    );
}

/// Handle one text frame. Returns false once the hub is gone.
async fn handle_text(text: &str, connection: &mut ConnectionState, hub: &HubHandle) -> bool {
    match decode_client(text) {
        Ok(ClientMessage::SendLocation(payload)) => {
            hub.submit(
                connection.session_id.clone(),
                payload.latitude,
                payload.longitude,
            )
            .await
            .is_ok()
        }
        Err(e) => {
            connection.record_rejected();
            tracing::warn!(
                session_id = %connection.session_id,
                error = %e,
                "Dropping malformed frame"
            );
            true
        }
    }
}
