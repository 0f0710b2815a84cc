//! Common test utilities for API integration tests
//!
//! [`TestApp`] wires the schema to a mock OCC backend so tests can run
//! GraphQL documents and then count what reached the backend.

#![allow(dead_code, unused_imports)]

use async_graphql::Request;
use axum::Router;
use serde_json::Value;

use commerce_bridge_api::graphql::SchemaBuilder;
use commerce_bridge_api::{app_router, AppContext, RequestLoaders};
use commerce_bridge_occ_client::OccClient;
use commerce_bridge_shared_config::LoaderConfig;

pub use commerce_bridge_test_utils::*;

/// Bearer token accepted by [`MockOccServer::mock_current_user`] in tests
pub const TOKEN: &str = "test-access-token";

pub struct TestApp {
    pub occ: MockOccServer,
    pub context: AppContext,
}

impl TestApp {
    pub async fn start() -> Self {
        let occ = MockOccServer::start().await;
        let client = OccClient::new(&occ.backend_config()).expect("client builds");
        let context = AppContext::new(SchemaBuilder::new().build(), client, LoaderConfig::default());
        Self { occ, context }
    }

    /// Loaders for a guest request
    pub fn guest_loaders(&self) -> RequestLoaders {
        self.context.request_loaders(None)
    }

    /// Run a document as a guest
    pub async fn execute(&self, query: &str) -> Value {
        self.execute_with(self.guest_loaders(), query).await
    }

    /// Run a document with a bearer token
    pub async fn execute_as(&self, token: &str, query: &str) -> Value {
        self.execute_with(self.context.request_loaders(Some(token)), query)
            .await
    }

    /// Run a document with caller supplied loaders, so their caches can be
    /// inspected afterwards
    pub async fn execute_with(&self, loaders: RequestLoaders, query: &str) -> Value {
        let response = self
            .context
            .schema
            .execute(Request::new(query).data(loaders))
            .await;
        serde_json::to_value(&response).expect("response serializes")
    }

    pub fn router(&self) -> Router {
        app_router(self.context.clone())
    }
}

/// The single error of a response
pub fn only_error(response: &Value) -> &Value {
    let errors = response["errors"]
        .as_array()
        .unwrap_or_else(|| panic!("expected errors in {}", response));
    assert_eq!(errors.len(), 1, "unexpected errors: {:?}", errors);
    &errors[0]
}

/// Error code set on an error's extensions
pub fn error_code(error: &Value) -> &str {
    error["extensions"]["code"].as_str().unwrap_or_default()
}

/// Assert that a response carries no errors
pub fn assert_no_errors(response: &Value) {
    assert!(
        response.get("errors").map_or(true, |errors| errors.is_null()
            || errors.as_array().is_some_and(Vec::is_empty)),
        "unexpected errors: {}",
        response["errors"]
    );
}
