//! OCC API error types

use thiserror::Error;

/// OCC API client errors
#[derive(Error, Debug)]
pub enum OccError {
    /// Invalid input provided to an API method
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse OCC response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested resource does not exist
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Missing or rejected bearer token
    #[error("OCC request not authorized: {0}")]
    Unauthorized(String),

    /// The backend answered with an error status
    #[error("OCC API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the backend
    #[error("Rate limited by OCC API")]
    RateLimited,

    /// Request timeout
    #[error("Request to OCC API timed out")]
    Timeout,
}

impl OccError {
    /// Check if this error is retryable (transient failure)
    ///
    /// Retries on timeouts, rate limiting, transport errors and 5xx
    /// responses. Client errors (4xx other than 429) are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            OccError::Timeout | OccError::RateLimited => true,
            OccError::Api { status, .. } => *status >= 500,
            OccError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            _ => false,
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }
}

/// Result type for OCC operations
pub type OccResult<T> = Result<T, OccError>;
