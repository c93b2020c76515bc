//! WebSocket Relay Endpoint
//!
//! Real-time location exchange over WebSocket connections.

pub mod handler;
pub mod messages;
pub mod session;

pub use handler::ws_handler;
pub use messages::{
    decode_client, decode_server, encode, ClientMessage, ReceiveLocationPayload,
    SendLocationPayload, ServerMessage, SessionReadyPayload,
};
pub use session::ConnectionState;
