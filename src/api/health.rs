//! Health endpoints: provider probe summary plus Kubernetes probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::HealthSummary;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/health
///
/// Runs (or serves from cache) the end-to-end provider probe. Always 200; the
/// body carries `configured` and `ok` separately.
pub async fn api_health(State(state): State<AppState>) -> Json<HealthSummary> {
    let instance = state.instance().await;
    // Dropped with the request future if the client disconnects
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    Json(
        instance
            .health_summary(state.vector_health.as_ref(), &cancel)
            .await,
    )
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            message: None,
        }),
    )
}

/// GET /ready
///
/// Ready when a provider was built from the current settings. Makes no upstream calls.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let instance = state.instance().await;

    match instance.dispatcher().provider() {
        Ok(provider) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ready",
                version: env!("CARGO_PKG_VERSION"),
                message: Some(format!("provider: {}", provider.provider_name())),
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                status: "unavailable",
                version: env!("CARGO_PKG_VERSION"),
                message: Some(e.public_message()),
            }),
        ),
    }
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_serialization() {
        let json = serde_json::to_value(StatusResponse {
            status: "healthy",
            version: "1.0.0",
            message: None,
        })
        .unwrap();

        assert_eq!(json["status"], "healthy");
        assert!(json.get("message").is_none());
    }
}
