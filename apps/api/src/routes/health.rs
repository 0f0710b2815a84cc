//! Health check HTTP route handlers
//!
//! Provides endpoints for checking the health of the API and its backend:
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/ready` - Readiness check (verifies the commerce backend)
//! - `GET /health/live` - Kubernetes-style liveness check

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use commerce_bridge_occ_client::{BackendStatus, OccClient};

/// Status of an individual service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy and responding
    Healthy,
    /// Service answers, but not as expected
    Degraded,
    /// Service is unreachable
    Unhealthy,
}

/// Result of the backend health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub name: &'static str,
    pub status: ServiceStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check body
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: ServiceStatus,
    pub services: Vec<ServiceHealth>,
    pub version: &'static str,
}

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    pub client: OccClient,
}

impl HealthState {
    pub fn new(client: OccClient) -> Self {
        Self { client }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness check for Kubernetes
///
/// Does NOT check the backend; that's what readiness is for.
async fn liveness_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check against the commerce backend
///
/// # Response
/// - 200 OK if the backend answers (possibly degraded)
/// - 503 Service Unavailable if it cannot be reached
async fn readiness_check(State(state): State<HealthState>) -> impl IntoResponse {
    let started = Instant::now();
    let backend = state.client.check_health().await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    let (status, error) = match backend {
        BackendStatus::Available => (ServiceStatus::Healthy, None),
        BackendStatus::Degraded(reason) => (ServiceStatus::Degraded, Some(reason)),
        BackendStatus::Unavailable(reason) => (ServiceStatus::Unhealthy, Some(reason)),
    };

    if let Some(error) = &error {
        tracing::warn!(error = %error, status = ?status, "Commerce backend health check failed");
    }

    let status_code = if status == ServiceStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let response = ReadinessResponse {
        status,
        services: vec![ServiceHealth {
            name: "commerce_backend",
            status,
            response_time_ms,
            error,
        }],
        version: env!("CARGO_PKG_VERSION"),
    };

    (status_code, Json(response))
}
