//! Infrastructure Layer
//!
//! Contains implementations for external concerns:
//! - Prometheus metrics registry and recorders

pub mod metrics;
