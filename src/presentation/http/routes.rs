//! Route Configuration
//!
//! Configures the relay socket, static client, and operational endpoints.

use std::path::Path;

use axum::{http::Uri, middleware, response::IntoResponse, routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::track_metrics;
use crate::presentation::websocket::ws_handler;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let static_dir = Path::new(&state.settings.server.static_dir);

    Router::new()
        // WebSocket relay endpoint
        .route("/ws", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        // Browser client
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/public", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
