//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type for the HTTP surface
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Rejection reasons for a coordinate pair.
///
/// Never fatal: the hub logs these and drops the offending update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("{field}: {message}")]
    OutOfRange { field: String, message: String },
}

/// Errors decoding frames on the real-time channel
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid location payload: {0}")]
    Location(#[from] LocationError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg),
        };

        (status, Json(ErrorResponse { code, message })).into_response()
    }
}
