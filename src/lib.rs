//! # Location Relay Library
//!
//! Real-time location sharing over WebSocket:
//! - A broadcast hub that relays every participant's position to everyone
//! - A tracker client that keeps a position store and draws distance lines
//! - Static browser client and operational endpoints
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Coordinates, sessions, relay events, geodesy
//! - **Application Layer**: Hub services and the client-side tracker
//! - **Infrastructure Layer**: Metrics
//! - **Presentation Layer**: HTTP routes and the WebSocket endpoint
//!
//! ## Module Structure
//!
//! ```text
//! location_relay/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, and geodesy
//! +-- application/    Broadcast hub and tracker client
//! +-- infrastructure/ Prometheus metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Hub and client services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
