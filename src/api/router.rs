use axum::{middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::admin;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .route("/api/health", get(health::api_health))
        // OpenAI-compatible v1 API
        .nest("/v1", v1::create_v1_router())
        // Admin API
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::domain::{MockVectorHealthCheck, RawSettings, VectorHealth};

    fn state_with(settings: Value) -> AppState {
        let settings: RawSettings = serde_json::from_value(settings).unwrap();
        let mut config = AppConfig::default();
        config.server.admin_token = Some("admin-secret".to_string());
        AppState::new(config, &settings)
    }

    fn test_state() -> AppState {
        state_with(json!({"provider": "test", "test": {"content": "Hello from test"}}))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_live_and_request_id() {
        let response = create_router(test_state()).oneshot(get("/live")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let response = create_router(test_state())
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({"model": "base", "messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["choices"][0]["message"]["content"], "Hello from test");
        assert_eq!(json["model"], "base");
    }

    #[tokio::test]
    async fn test_chat_completion_stream() {
        let response = create_router(test_state())
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({
                    "model": "large",
                    "stream": true,
                    "messages": [{"role": "user", "content": "Hi"}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );

        let body = body_text(response).await;
        let events: Vec<&str> = body
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect();

        assert_eq!(events.last(), Some(&"[DONE]"));
        assert_eq!(events.iter().filter(|e| **e == "[DONE]").count(), 1);

        let text: String = events[..events.len() - 1]
            .iter()
            .map(|e| serde_json::from_str::<Value>(e).unwrap())
            .filter_map(|v| v["choices"][0]["delta"]["content"].as_str().map(String::from))
            .collect();
        assert_eq!(text, "Hello from test");
    }

    #[tokio::test]
    async fn test_stream_open_failure_returns_error_envelope() {
        // The canned error fails the call before any event is sent
        let failing = state_with(json!({"provider": "test", "test": {"error": "boom"}}));

        let response = create_router(failing)
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({"model": "base", "stream": true, "messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "boom");
        assert_eq!(json["error"]["code"], 502);
    }

    #[tokio::test]
    async fn test_unknown_model_is_bad_request() {
        let response = create_router(test_state())
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({"model": "mystery", "messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let response = create_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/chat/completions")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_chat_is_unavailable() {
        let response = create_router(state_with(json!({})))
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({"model": "base", "messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_list_models() {
        let response = create_router(test_state())
            .oneshot(get("/v1/models"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["object"], "list");
        assert_eq!(json["data"][0]["id"], "base");
        assert_eq!(json["data"][0]["owned_by"], "test");
    }

    #[tokio::test]
    async fn test_api_health_with_vector_collaborator() {
        let mut vector = MockVectorHealthCheck::new();
        vector.expect_check().returning(|| VectorHealth {
            enabled: true,
            ok: false,
            error: Some("index missing".to_string()),
        });
        let state = test_state().with_vector_health(Arc::new(vector));

        let response = create_router(state)
            .oneshot(get("/api/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["provider_health"]["configured"], true);
        assert_eq!(json["provider_health"]["ok"], true);
        assert_eq!(json["provider_health"]["models"]["base"]["ok"], true);
        assert_eq!(json["vector_health"]["error"], "index missing");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_ready_reflects_provider() {
        let ready = create_router(test_state()).oneshot(get("/ready")).await.unwrap();
        assert_eq!(ready.status(), StatusCode::OK);

        let unready = create_router(state_with(json!({"provider": "test", "disabled": true})))
            .oneshot(get("/ready"))
            .await
            .unwrap();
        assert_eq!(unready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_admin_settings_requires_token() {
        let response = create_router(test_state())
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/admin/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"provider": "test"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_settings_reload() {
        let state = state_with(json!({}));
        let router = create_router(state.clone());

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/admin/settings")
                    .header("content-type", "application/json")
                    .header("authorization", "Bearer admin-secret")
                    .body(Body::from(
                        json!({"openAI": {"provider": "test", "disabled": false}}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["provider"], "test");
        assert_eq!(json["configured"], true);

        let chat = create_router(state)
            .oneshot(post_json(
                "/v1/chat/completions",
                json!({"model": "base", "messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(chat.status(), StatusCode::OK);
    }
}
