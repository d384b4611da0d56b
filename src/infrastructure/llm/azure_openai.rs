use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::openai_compat;
use super::sse::decode_sse;
use crate::domain::settings::AzureConfig;
use crate::domain::{
    CanonicalModel, ChatRequest, ChatResponse, DomainError, LlmProvider, LlmStream, ProviderKind,
};

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";
const PROVIDER: &str = "azure";

/// Azure OpenAI provider; models are addressed by deployment name in the URL
#[derive(Debug)]
pub struct AzureOpenAiProvider<C: HttpClientTrait> {
    client: C,
    config: AzureConfig,
}

impl<C: HttpClientTrait> AzureOpenAiProvider<C> {
    pub fn new(client: C, mut config: AzureConfig) -> Result<Self, DomainError> {
        if config.url.trim().is_empty() {
            return Err(DomainError::configuration(
                "Azure OpenAI requires an endpoint URL",
            ));
        }

        if config.api_version.trim().is_empty() {
            config.api_version = DEFAULT_AZURE_API_VERSION.to_string();
        }

        Ok(Self { client, config })
    }

    /// Unmapped tiers fail here, before anything is sent
    fn deployment_for(&self, model: CanonicalModel) -> Result<&str, DomainError> {
        self.config.deployment_for(model).ok_or_else(|| {
            DomainError::bad_request(format!(
                "No Azure deployment is mapped for model '{}'",
                model
            ))
        })
    }

    fn build_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(deployment),
            urlencoding::encode(&self.config.api_version)
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("api-key", self.config.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for AzureOpenAiProvider<C> {
    async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        Ok(CanonicalModel::ALL
            .into_iter()
            .filter(|model| self.config.deployment_for(*model).is_some())
            .collect())
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError> {
        let deployment = self.deployment_for(request.model)?;
        debug!(model = %request.model, deployment = %deployment, "Sending Azure chat request");

        let body = openai_compat::build_body(&request, None, false);
        let response = self
            .client
            .post_json(&self.build_url(deployment), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        openai_compat::parse_response(response, PROVIDER)
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError> {
        let deployment = self.deployment_for(request.model)?;
        debug!(model = %request.model, deployment = %deployment, "Opening Azure chat stream");

        let body = openai_compat::build_body(&request, None, true);
        let bytes = self
            .client
            .post_json_stream(&self.build_url(deployment), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        Ok(decode_sse(bytes, |event| {
            openai_compat::decode_event(event, PROVIDER)
        }))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::ManagedDeployment
    }
}
