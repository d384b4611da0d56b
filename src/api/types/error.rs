//! Error envelope returned by every failing endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// `{"error": {"message": ..., "code": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    pub code: u16,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    code: status.as_u16(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        // 499 and upstream statuses are valid codes but not all are named constants
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.public_message())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.error.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let err = ApiError::bad_request("Unknown model 'huge'");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["message"], "Unknown model 'huge'");
        assert_eq!(json["error"]["code"], 400);
    }

    #[test]
    fn test_upstream_status_is_preserved() {
        let err: ApiError = DomainError::upstream_status("openai", 429, "slow down").into();

        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.response.error.code, 429);
        assert_eq!(err.response.error.message, "slow down");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (DomainError::bad_request("x"), 400),
            (DomainError::upstream("anthropic", "reset"), 502),
            (DomainError::Disabled, 503),
            (DomainError::configuration("x"), 503),
            (DomainError::Cancelled, 499),
            (DomainError::internal("x"), 500),
        ];

        for (domain, expected) in cases {
            let api: ApiError = domain.into();
            assert_eq!(api.status.as_u16(), expected);
        }
    }
}
