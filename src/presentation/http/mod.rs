//! HTTP Layer
//!
//! Route table, static client assets, and operational endpoints.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
