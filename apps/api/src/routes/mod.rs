//! HTTP route handlers for the commerce bridge API
//!
//! This module contains:
//! - The GraphQL endpoint and playground
//! - Health check and readiness endpoints

pub mod graphql;
pub mod health;

pub use graphql::{extract_bearer_token, graphql_handler, graphql_playground};
pub use health::{health_router, HealthState};

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::context::AppContext;

/// Build the application router without transport layers (CORS, tracing)
pub fn app_router(context: AppContext) -> Router {
    let health_state = HealthState::new(context.client.clone());

    Router::new()
        .route("/", get(root))
        // GraphQL endpoints
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
        .layer(Extension(context))
}

async fn root() -> &'static str {
    "Commerce bridge - GraphQL storefront API"
}
