//! Integration tests for the HTTP surface
//!
//! Drives the full application router: health checks and the GraphQL
//! endpoint with bearer token extraction.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use commerce_bridge_api::app_router;
use commerce_bridge_api::graphql::SchemaBuilder;
use commerce_bridge_api::AppContext;
use commerce_bridge_occ_client::OccClient;
use commerce_bridge_shared_config::{BackendConfig, LoaderConfig};
use common::*;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Router whose backend is not listening
fn unreachable_app() -> Router {
    let config = BackendConfig {
        base_url: "http://127.0.0.1:1/occ/v2".to_string(),
        timeout_secs: 1,
        connect_timeout_secs: 1,
        max_retries: 0,
        ..BackendConfig::default()
    };
    let client = OccClient::new(&config).unwrap();
    app_router(AppContext::new(
        SchemaBuilder::new().build(),
        client,
        LoaderConfig::default(),
    ))
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = TestApp::start().await;

    let response = app.router().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Commerce bridge"));
}

#[tokio::test]
async fn test_simple_health_check() {
    let app = TestApp::start().await;

    let response = app.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_liveness_check() {
    let app = TestApp::start().await;

    let response = app.router().oneshot(get("/health/live")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "alive");
}

#[tokio::test]
async fn test_readiness_with_reachable_backend() {
    let app = TestApp::start().await;
    app.occ.mock_base_sites().await;

    let response = app.router().oneshot(get("/health/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["services"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_with_unreachable_backend() {
    let response = unreachable_app()
        .oneshot(get("/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn test_graphql_endpoint_forwards_bearer_token() {
    let app = TestApp::start().await;
    app.occ
        .mock_current_user(TOKEN, &UserFixture::new("ada@example.com", "Ada", "Lovelace"))
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::from(r#"{"query":"{ customer { firstname } }"}"#))
        .unwrap();

    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer"]["firstname"], "Ada");
}
