//! WebSocket Message Types
//!
//! JSON text frames of the form `{"event": <name>, "data": <payload>}`.
//!
//! | Direction   | event               | data                          |
//! |-------------|---------------------|-------------------------------|
//! | client→hub  | `send-location`     | `{latitude, longitude}`       |
//! | hub→client  | `session-ready`     | `{id}`                        |
//! | hub→all     | `receive-location`  | `{id, latitude, longitude}`   |
//! | hub→all     | `user-disconnected` | `"<id>"`                      |

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, LocationUpdate, RelayEvent, SessionId};
use crate::shared::error::ProtocolError;

/// Messages sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "send-location")]
    SendLocation(SendLocationPayload),
}

/// Raw position as submitted. Range checks happen in the hub.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SendLocationPayload {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for ClientMessage {
    fn from(coordinates: Coordinates) -> Self {
        ClientMessage::SendLocation(SendLocationPayload {
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
        })
    }
}

/// Messages sent by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "session-ready")]
    SessionReady(SessionReadyPayload),

    #[serde(rename = "receive-location")]
    ReceiveLocation(ReceiveLocationPayload),

    #[serde(rename = "user-disconnected")]
    UserDisconnected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReadyPayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveLocationPayload {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<RelayEvent> for ServerMessage {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::SessionReady(id) => ServerMessage::SessionReady(SessionReadyPayload {
                id: id.to_string(),
            }),
            RelayEvent::LocationReceived(update) => {
                ServerMessage::ReceiveLocation(ReceiveLocationPayload {
                    id: update.sender_id.to_string(),
                    latitude: update.coordinates.latitude(),
                    longitude: update.coordinates.longitude(),
                })
            }
            RelayEvent::SessionEnded(id) => ServerMessage::UserDisconnected(id.to_string()),
        }
    }
}

impl TryFrom<ServerMessage> for RelayEvent {
    type Error = ProtocolError;

    fn try_from(message: ServerMessage) -> Result<Self, Self::Error> {
        Ok(match message {
            ServerMessage::SessionReady(p) => RelayEvent::SessionReady(SessionId::from(p.id)),
            ServerMessage::ReceiveLocation(p) => RelayEvent::LocationReceived(LocationUpdate::new(
                SessionId::from(p.id),
                Coordinates::new(p.latitude, p.longitude)?,
            )),
            ServerMessage::UserDisconnected(id) => RelayEvent::SessionEnded(SessionId::from(id)),
        })
    }
}

/// Parse a client frame.
pub fn decode_client(text: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a hub frame into a validated relay event.
pub fn decode_server(text: &str) -> Result<RelayEvent, ProtocolError> {
    let message: ServerMessage = serde_json::from_str(text)?;
    RelayEvent::try_from(message)
}

/// Serialize any message for a text frame.
pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}
