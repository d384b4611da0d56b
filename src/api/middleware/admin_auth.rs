//! Admin authentication extractor
//!
//! Accepts the configured admin token from `Authorization: Bearer <token>` or
//! `X-API-Key`. When no token is configured the admin API is not exposed.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Extractor that requires the admin token
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state
            .config
            .server
            .admin_token
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            return Err(ApiError::not_found("Admin API is not enabled"));
        };

        match extract_token(&parts.headers) {
            Some(token) if token == expected => Ok(RequireAdmin),
            Some(_) => {
                debug!("Rejected admin request with invalid token");
                Err(ApiError::unauthorized("Invalid admin token"))
            }
            None => Err(ApiError::unauthorized("Admin token required")),
        }
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(bearer) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer.trim());
    }

    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(extract_token(&headers), Some("s3cret"));
    }

    #[test]
    fn test_extract_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("s3cret"));
        assert_eq!(extract_token(&headers), Some("s3cret"));
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers), None);
    }
}
