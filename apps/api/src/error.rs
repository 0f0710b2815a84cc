//! Error handling for the commerce bridge API
//!
//! This module provides a unified error type using thiserror, with HTTP
//! status mapping via Axum's IntoResponse trait and GraphQL error
//! extensions for field errors.
//!
//! `ApiError` is `Clone` so that a failed entity or loader key can hand the
//! same error to every field that reads it.

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use commerce_bridge_dataloader::LoadError;
use commerce_bridge_occ_client::OccError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Main API error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    // ========== Authentication & Authorization ==========
    /// Missing bearer token for a customer resource
    #[error("authentication required")]
    Unauthorized,

    /// Bearer token rejected by the backend
    #[error("invalid authentication token: {0}")]
    InvalidToken(String),

    /// Caller may not access the resource
    #[error("insufficient permissions: {0}")]
    Forbidden(String),

    // ========== Resource Errors ==========
    /// Requested resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ========== Validation Errors ==========
    /// Request validation failed
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========== Backend Errors ==========
    /// The commerce backend rejected or failed the request
    #[error("commerce backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The commerce backend could not be reached
    #[error("commerce backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The commerce backend returned a payload that cannot be converted
    #[error("invalid backend payload: {0}")]
    InvalidPayload(String),

    /// The commerce backend is throttling requests
    #[error("commerce backend rate limit exceeded")]
    RateLimited,

    // ========== Internal Errors ==========
    /// A batch dispatch ended without a usable answer
    #[error("data loader error: {0}")]
    Loader(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 401 Unauthorized
            Self::Unauthorized | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 400 Bad Request
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Backend { status, .. } if (400..500).contains(status) => {
                StatusCode::BAD_REQUEST
            }

            // 429 Too Many Requests
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway
            Self::Backend { .. } | Self::InvalidPayload(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            Self::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Loader(_) | Self::Configuration(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Backend { .. } => "BACKEND_ERROR",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::InvalidPayload(_) => "INVALID_BACKEND_PAYLOAD",
            Self::RateLimited => "RATE_LIMITED",
            Self::Loader(_) => "LOADER_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Magento error category reported in GraphQL extensions
    pub fn category(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized | Self::InvalidToken(_) | Self::Forbidden(_) => {
                Some("graphql-authorization")
            }
            Self::NotFound { .. } => Some("graphql-no-such-entity"),
            Self::ValidationError(_) => Some("graphql-input"),
            Self::Backend { status, .. } if (400..500).contains(status) => Some("graphql-input"),
            _ => None,
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Message safe to show to API clients
    fn public_message(&self) -> String {
        match self {
            Self::Loader(_) | Self::Configuration(_) | Self::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Authorization error"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.public_message(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.log();

        async_graphql::Error::new(self.public_message()).extend_with(|_, e| {
            e.set("code", self.error_code());
            if let Some(category) = self.category() {
                e.set("category", category);
            }
            if let Self::Backend { status, .. } = self {
                e.set("backend_status", *status);
            }
        })
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ========== Conversion Implementations ==========

impl From<OccError> for ApiError {
    fn from(err: OccError) -> Self {
        match err {
            OccError::InvalidInput(message) => Self::ValidationError(message),
            OccError::Http(e) => Self::BackendUnavailable(e.to_string()),
            OccError::Parse(e) => Self::InvalidPayload(e.to_string()),
            OccError::NotFound { resource, id } => Self::NotFound {
                resource_type: resource,
                id,
            },
            OccError::Unauthorized(message) => Self::InvalidToken(message),
            OccError::Api { status, message } => Self::Backend { status, message },
            OccError::RateLimited => Self::RateLimited,
            OccError::Timeout => Self::BackendUnavailable("request timed out".to_string()),
        }
    }
}

impl From<LoadError<ApiError>> for ApiError {
    fn from(err: LoadError<ApiError>) -> Self {
        match err {
            LoadError::Fetch(e) | LoadError::Batch(e) => e,
            other => Self::Loader(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tracing_test::traced_test;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("cart", "00000035").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ValidationError("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Backend {
                status: 400,
                message: "coupon.invalid.code.provided".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Backend {
                status: 500,
                message: "boom".to_string()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::BackendUnavailable("down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes_and_categories() {
        assert_eq!(ApiError::Unauthorized.error_code(), "UNAUTHORIZED");
        assert_eq!(
            ApiError::Unauthorized.category(),
            Some("graphql-authorization")
        );
        assert_eq!(
            ApiError::not_found("cart", "00000035").category(),
            Some("graphql-no-such-entity")
        );
        assert_eq!(ApiError::Internal("x".to_string()).category(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::not_found("cart", "00000035");
        assert_eq!(err.to_string(), "cart not found: 00000035");
    }

    #[test]
    fn test_from_occ_error() {
        assert_eq!(
            ApiError::from(OccError::not_found("product", "123")),
            ApiError::not_found("product", "123")
        );
        assert_eq!(
            ApiError::from(OccError::Unauthorized("expired".to_string())),
            ApiError::InvalidToken("expired".to_string())
        );
        assert_eq!(ApiError::from(OccError::RateLimited), ApiError::RateLimited);
    }

    #[test]
    fn test_from_load_error_unwraps_fetch_errors() {
        let fetch = LoadError::Fetch(ApiError::not_found("cart", "1"));
        assert_eq!(ApiError::from(fetch), ApiError::not_found("cart", "1"));

        let dropped: LoadError<ApiError> = LoadError::Dropped;
        assert_matches!(ApiError::from(dropped), ApiError::Loader(_));
    }

    #[test]
    #[traced_test]
    fn test_rejected_tokens_are_logged_as_warnings() {
        ApiError::InvalidToken("expired".to_string()).log();
        assert!(logs_contain("Authorization error"));
        assert!(logs_contain("INVALID_TOKEN"));
    }

    #[test]
    fn test_graphql_extensions() {
        let err = ApiError::not_found("cart", "00000035").extend();
        assert_eq!(err.message, "cart not found: 00000035");

        let extensions = serde_json::to_value(err.extensions.unwrap()).unwrap();
        assert_eq!(extensions["code"], "NOT_FOUND");
        assert_eq!(extensions["category"], "graphql-no-such-entity");
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ApiError::Internal("connection pool poisoned".to_string()).extend();
        assert_eq!(err.message, "An unexpected error occurred");
    }
}
