//! Relay tests over real WebSocket connections

mod relay_tests;
