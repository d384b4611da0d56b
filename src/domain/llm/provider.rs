use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use super::{ChatRequest, ChatResponse, StreamChunk};
use crate::domain::model::CanonicalModel;
use crate::domain::settings::ProviderKind;
use crate::domain::DomainError;

/// Decoded native event stream of one provider call
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, DomainError>> + Send>>;

/// Strategy implemented once per backend (OpenAI, Azure, Anthropic, gateway, test)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Canonical models this provider can serve
    async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError>;

    /// Send a blocking chat completion request
    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError>;

    /// Open a streaming chat completion; events are decoded but not yet normalized
    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError>;

    fn kind(&self) -> ProviderKind;

    fn provider_name(&self) -> &'static str {
        self.kind().as_str()
    }
}
