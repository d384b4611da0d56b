use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::openai_compat;
use super::sse::decode_sse;
use crate::domain::{
    CanonicalModel, ChatRequest, ChatResponse, DomainError, LlmProvider, LlmStream, ModelMapping,
    ProviderKind,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const PROVIDER: &str = "openai";

/// OpenAI API provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    organization_id: Option<String>,
    base_url: String,
    models: ModelMapping,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, models: ModelMapping) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL, models)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        models: ModelMapping,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_OPENAI_BASE_URL.to_string()
        } else {
            base_url.trim_end_matches('/').to_string()
        };

        Self {
            client,
            auth_header,
            organization_id: None,
            base_url,
            models,
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        let organization_id = organization_id.into();
        self.organization_id = (!organization_id.trim().is_empty()).then_some(organization_id);
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        if let Some(ref org) = self.organization_id {
            headers.push(("OpenAI-Organization", org.as_str()));
        }

        headers
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for OpenAiProvider<C> {
    async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        Ok(CanonicalModel::ALL
            .into_iter()
            .filter(|model| self.models.resolve(*model).is_ok())
            .collect())
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError> {
        let model = self.models.resolve(request.model)?;
        debug!(model = %request.model, concrete = %model, "Sending OpenAI chat request");

        let body = openai_compat::build_body(&request, Some(model), false);
        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        openai_compat::parse_response(response, PROVIDER)
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError> {
        let model = self.models.resolve(request.model)?;
        debug!(model = %request.model, concrete = %model, "Opening OpenAI chat stream");

        let body = openai_compat::build_body(&request, Some(model), true);
        let bytes = self
            .client
            .post_json_stream(&self.chat_completions_url(), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        Ok(decode_sse(bytes, |event| {
            openai_compat::decode_event(event, PROVIDER)
        }))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DirectApi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FinishReason;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use futures::StreamExt;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
        })
    }

    #[tokio::test]
    async fn test_openai_chat_resolves_concrete_model() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("Hello!"));
        let provider = OpenAiProvider::new(client, "sk-test", ModelMapping::openai_defaults())
            .with_organization("org-1");

        let request = ChatRequest::builder(CanonicalModel::Large).user("Hello!").build();
        let response = provider
            .chat(request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.content(), "Hello!");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));

        let calls = provider.client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["model"], "gpt-4o");
        assert_eq!(calls[0].header("Authorization"), Some("Bearer sk-test"));
        assert_eq!(calls[0].header("OpenAI-Organization"), Some("org-1"));
    }

    #[tokio::test]
    async fn test_openai_omits_empty_organization() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("ok"));
        let provider = OpenAiProvider::new(client, "sk-test", ModelMapping::openai_defaults())
            .with_organization("");

        let request = ChatRequest::builder(CanonicalModel::Base).user("Hi").build();
        provider.chat(request, &CancellationToken::new()).await.unwrap();

        assert_eq!(provider.client.calls()[0].header("OpenAI-Organization"), None);
    }

    #[tokio::test]
    async fn test_openai_upstream_error_keeps_status_and_body() {
        let client = MockHttpClient::new().with_status_error(
            TEST_URL,
            401,
            r#"{"error":{"message":"Incorrect API key"}}"#,
        );
        let provider = OpenAiProvider::new(client, "bad", ModelMapping::openai_defaults());

        let request = ChatRequest::builder(CanonicalModel::Base).user("Hi").build();
        let err = provider
            .chat(request, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            DomainError::Upstream {
                provider,
                status,
                message,
            } => {
                assert_eq!(provider, "openai");
                assert_eq!(status, Some(401));
                assert!(message.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_openai_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(custom_url, completion("Custom"));
        let provider = OpenAiProvider::with_base_url(
            client,
            "test-key",
            "http://localhost:8080/",
            ModelMapping::openai_defaults(),
        );

        let request = ChatRequest::builder(CanonicalModel::Base).user("Test").build();
        let response = provider
            .chat(request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.content(), "Custom");
    }

    #[tokio::test]
    async fn test_openai_stream() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![
                "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
                "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
                "data: [DONE]\n\n",
            ],
        );
        let provider = OpenAiProvider::new(client, "sk", ModelMapping::openai_defaults());

        let request = ChatRequest::builder(CanonicalModel::Base).user("Hi").build();
        let stream = provider
            .chat_stream(request, &CancellationToken::new())
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;

        assert_eq!(chunks.len(), 2);
        let text: String = chunks
            .iter()
            .filter_map(|c| c.as_ref().unwrap().delta.clone())
            .collect();
        assert_eq!(text, "Hello");
        assert_eq!(provider.client.calls()[0].body["stream"], true);
    }

    #[tokio::test]
    async fn test_openai_list_models() {
        let provider = OpenAiProvider::new(
            MockHttpClient::new(),
            "sk",
            ModelMapping::openai_defaults(),
        );

        let models = provider.list_models(&CancellationToken::new()).await.unwrap();
        assert_eq!(models, vec![CanonicalModel::Base, CanonicalModel::Large]);
        assert_eq!(provider.client.call_count(), 0);
    }
}
