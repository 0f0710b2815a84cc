//! GraphQL HTTP handlers

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::Extension,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
};

use crate::context::AppContext;

/// Extract bearer token from Authorization header (case-insensitive)
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    // Reject malformed values like "Bearer <token> <extra>"
    if parts.next().is_some() {
        return None;
    }

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// GraphQL handler that executes queries against the schema
///
/// Every request gets its own loaders, carrying the caller's bearer token
/// (if any) through to the backend. The token is not verified here; the
/// backend rejects it when a resolver uses it.
pub async fn graphql_handler(
    Extension(context): Extension<AppContext>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let token = extract_bearer_token(&headers);
    if token.is_some() {
        tracing::debug!("GraphQL request carries a bearer token");
    }

    let request = req.into_inner().data(context.request_loaders(token));
    context.schema.execute(request).await.into()
}

/// GraphQL Playground handler for development
pub async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc123", Some("abc123"))]
    #[case("bearer abc123", Some("abc123"))]
    #[case("Basic abc123", None)]
    #[case("Bearer", None)]
    #[case("Bearer abc 123", None)]
    fn test_extract_bearer_token(#[case] value: &str, #[case] expected: Option<&str>) {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        assert_eq!(extract_bearer_token(&headers), expected);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
