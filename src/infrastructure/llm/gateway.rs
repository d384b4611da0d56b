use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::openai_compat;
use super::sse::decode_sse;
use crate::domain::settings::GatewayConfig;
use crate::domain::{
    CanonicalModel, ChatRequest, ChatResponse, DomainError, LlmProvider, LlmStream, ProviderKind,
};

const PROVIDER: &str = "managed-gateway";

/// Multi-tenant gateway speaking the OpenAI chat-completions protocol.
///
/// The gateway owns concrete model resolution, so requests carry the
/// canonical tier name as `model`.
#[derive(Debug)]
pub struct GatewayProvider<C: HttpClientTrait> {
    client: C,
    url: String,
    tenant_id: String,
    auth_header: String,
}

impl<C: HttpClientTrait> GatewayProvider<C> {
    pub fn new(client: C, config: &GatewayConfig) -> Result<Self, DomainError> {
        if config.url.trim().is_empty() {
            return Err(DomainError::configuration("Managed gateway URL is missing"));
        }

        if config.tenant_id.trim().is_empty() || config.access_key.is_empty() {
            return Err(DomainError::configuration(
                "Managed gateway requires both a tenant id and an access key",
            ));
        }

        Ok(Self {
            client,
            url: format!(
                "{}/openai/v1/chat/completions",
                config.url.trim_end_matches('/')
            ),
            tenant_id: config.tenant_id.clone(),
            auth_header: format!("Bearer {}:{}", config.tenant_id, config.access_key),
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("X-Scope-OrgID", self.tenant_id.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for GatewayProvider<C> {
    async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        Ok(CanonicalModel::ALL.to_vec())
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError> {
        debug!(model = %request.model, tenant = %self.tenant_id, "Sending gateway chat request");

        let body = openai_compat::build_body(&request, Some(request.model.as_str()), false);
        let response = self
            .client
            .post_json(&self.url, self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        openai_compat::parse_response(response, PROVIDER)
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError> {
        debug!(model = %request.model, tenant = %self.tenant_id, "Opening gateway chat stream");

        let body = openai_compat::build_body(&request, Some(request.model.as_str()), true);
        let bytes = self
            .client
            .post_json_stream(&self.url, self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        Ok(decode_sse(bytes, |event| {
            openai_compat::decode_event(event, PROVIDER)
        }))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::ManagedGateway
    }
}
