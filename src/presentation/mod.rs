//! Presentation Layer
//!
//! HTTP routes and the WebSocket relay endpoint.

pub mod http;
pub mod middleware;
pub mod websocket;
