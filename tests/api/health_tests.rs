//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{get, get_json, test_router};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let (router, _hub) = test_router();

    let (status, body) = get_json(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_returns_alive() {
    let (router, _hub) = test_router();

    let (status, body) = get_json(&router, "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_hub_sessions() {
    let (router, _hub) = test_router();

    let (status, body) = get_json(&router, "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["hub"]["active_sessions"], 0);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_exposed_in_text_format() {
    let (router, _hub) = test_router();
    get(&router, "/health").await;

    let (status, text) = get(&router, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("location_relay_sessions_active"));
    assert!(text.contains("location_relay_http_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (router, _hub) = test_router();

    let (status, body) = get_json(&router, "/api/v1/users").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10001);
}
