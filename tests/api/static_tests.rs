//! Static client asset tests

use axum::http::StatusCode;

use crate::common::{get, test_router};

#[tokio::test]
async fn test_index_served_at_root() {
    let (router, _hub) = test_router();

    let (status, body) = get(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<div id=\"map\">"));
}

#[tokio::test]
async fn test_client_script_served_from_public() {
    let (router, _hub) = test_router();

    let (status, body) = get(&router, "/public/js/app.js").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("send-location"));
}
