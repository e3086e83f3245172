//! # Health and Middleware Tests

use axum::http::StatusCode;
use pospago_dashboard::web::middleware::request_id::REQUEST_ID_HEADER;
use serde_json::json;

use super::test_infrastructure::*;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], json!("healthy"));
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_readiness_with_reachable_source() {
    let app = TestApp::new();
    let response = app.get("/health/ready").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], json!("ready"));
    assert_eq!(response.body["environment"], json!("test"));
    assert_eq!(response.body["database"]["status"], json!("healthy"));
}

#[tokio::test]
async fn test_readiness_with_failing_source() {
    let app = TestApp::new();
    app.sales.set_failing(true);
    let response = app.get("/health/ready").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], json!("not_ready"));
    assert_eq!(response.body["database"]["status"], json!("unhealthy"));
    assert!(response.body["database"]["message"].is_string());
}

#[tokio::test]
async fn test_request_id_header_on_every_response() {
    let app = TestApp::new();

    let tile = app.get("/api/pospago/comparativo/").await;
    let health = app.get("/health").await;
    let again = app.get("/health").await;

    let ids: Vec<String> = [&tile, &health, &again]
        .iter()
        .map(|response| {
            response.headers[REQUEST_ID_HEADER]
                .to_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids[0].len(), 36);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}
