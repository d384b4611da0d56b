//! Request dispatcher: the single entry point the HTTP layer talks to

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{
    validate_request, CanonicalModel, ChatRequest, ChatResponse, DomainError, LlmProvider,
};
use crate::infrastructure::observability::{record_llm_request, LlmRequestMetricParams};
use crate::infrastructure::streaming::{spawn_normalizer, ChunkReceiver};

/// Result of a dispatched chat call
#[derive(Debug)]
pub enum Dispatched {
    Complete(ChatResponse),
    Stream(ChunkReceiver),
}

/// Routes requests to the active provider, or reports why there is none
#[derive(Debug, Clone)]
pub struct DispatchService {
    provider: Result<Arc<dyn LlmProvider>, DomainError>,
}

impl DispatchService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Ok(provider),
        }
    }

    /// Every call fails with `reason`
    pub fn unavailable(reason: DomainError) -> Self {
        Self {
            provider: Err(reason),
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn LlmProvider>, DomainError> {
        self.provider.as_ref().map_err(Clone::clone)
    }

    pub async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError> {
        self.provider()?.list_models(cancel).await
    }

    /// Blocking completion
    pub async fn complete(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError> {
        validate_request(&request)?;
        let provider = self.provider()?;
        let model = request.model;
        let start = Instant::now();

        let result = provider.chat(request, cancel).await;

        let usage = result.as_ref().ok().and_then(|r| r.usage.clone());
        record_llm_request(LlmRequestMetricParams {
            provider: provider.provider_name(),
            model: model.as_str(),
            stream: false,
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.as_ref().map(|u| u.prompt_tokens as u64),
            output_tokens: usage.as_ref().map(|u| u.completion_tokens as u64),
        });

        match &result {
            Ok(_) => info!(
                provider = provider.provider_name(),
                model = %model,
                duration_ms = start.elapsed().as_millis() as u64,
                "Chat completion finished"
            ),
            Err(e) => warn!(
                provider = provider.provider_name(),
                model = %model,
                error = %e,
                "Chat completion failed"
            ),
        }

        result
    }

    /// Open a normalized stream; errors before the first byte are returned directly
    pub async fn stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChunkReceiver, DomainError> {
        validate_request(&request)?;
        let provider = self.provider()?;
        let model = request.model;
        let start = Instant::now();

        let result = provider.chat_stream(request, cancel).await;

        record_llm_request(LlmRequestMetricParams {
            provider: provider.provider_name(),
            model: model.as_str(),
            stream: true,
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: None,
            output_tokens: None,
        });

        match result {
            Ok(native) => {
                info!(provider = provider.provider_name(), model = %model, "Chat stream opened");
                Ok(spawn_normalizer(native, cancel.clone()))
            }
            Err(e) => {
                warn!(
                    provider = provider.provider_name(),
                    model = %model,
                    error = %e,
                    "Chat stream failed to open"
                );
                Err(e)
            }
        }
    }

    /// Route on the request's `stream` flag
    pub async fn dispatch(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, DomainError> {
        if request.stream {
            self.stream(request, cancel).await.map(Dispatched::Stream)
        } else {
            self.complete(request, cancel).await.map(Dispatched::Complete)
        }
    }
}
