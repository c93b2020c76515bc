//! Application Layer
//!
//! Server-side relay services and the client-side tracking components.
//! This layer orchestrates the flow of data between the presentation
//! and domain layers.

pub mod client;
pub mod services;
