use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::settings::TestConfig;
use crate::domain::{
    CanonicalModel, ChatRequest, ChatResponse, DomainError, FinishReason, LlmProvider, LlmStream,
    Message, MessageRole, ProviderKind, StreamChunk, Usage,
};

const PROVIDER: &str = "test";
const DEFAULT_CONTENT: &str = "This is a test response.";

/// Programmable stand-in for a live backend
#[derive(Debug)]
pub struct TestProvider {
    content: String,
    error: Option<String>,
    model_errors: HashMap<CanonicalModel, String>,
    stream_failure: Option<(usize, String)>,
    calls: AtomicUsize,
}

impl TestProvider {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
            model_errors: HashMap::new(),
            stream_failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &TestConfig) -> Self {
        let content = config
            .content
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT.to_string());

        let mut provider = Self::new(content);
        provider.error = config.error.clone().filter(|e| !e.is_empty());
        provider
    }

    /// Every call fails with this upstream message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_model_error(mut self, model: CanonicalModel, error: impl Into<String>) -> Self {
        self.model_errors.insert(model, error.into());
        self
    }

    /// Streams fail after `after` content chunks
    pub fn with_stream_failure(mut self, after: usize, error: impl Into<String>) -> Self {
        self.stream_failure = Some((after, error.into()));
        self
    }

    /// Number of chat and stream calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        if let Some(error) = self.model_errors.get(&request.model).or(self.error.as_ref()) {
            return Err(DomainError::upstream(PROVIDER, error.clone()));
        }

        Ok(())
    }
}

impl Default for TestProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT)
    }
}

#[async_trait]
impl LlmProvider for TestProvider {
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
        self.begin_call(&request, cancel)?;

        let completion_tokens = self.content.split_whitespace().count() as u32;
        Ok(ChatResponse::new(
            format!("chatcmpl-{}", Uuid::new_v4()),
            Utc::now().timestamp(),
            request.model.to_string(),
            Message::assistant(self.content.clone()),
        )
        .with_finish_reason(FinishReason::Stop)
        .with_usage(Usage::new(0, completion_tokens)))
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError> {
        self.begin_call(&request, cancel)?;

        let id = format!("chatcmpl-{}", Uuid::new_v4());
        let model = request.model.to_string();

        let mut items: Vec<Result<StreamChunk, DomainError>> = self
            .content
            .split_inclusive(' ')
            .enumerate()
            .map(|(i, word)| {
                let chunk = StreamChunk::new(id.clone(), model.clone()).with_delta(word);
                Ok(if i == 0 {
                    chunk.with_role(MessageRole::Assistant)
                } else {
                    chunk
                })
            })
            .collect();

        match &self.stream_failure {
            Some((after, error)) => {
                items.truncate(*after);
                items.push(Err(DomainError::upstream(PROVIDER, error.clone())));
            }
            None => items.push(Ok(
                StreamChunk::new(id, model).with_finish_reason(FinishReason::Stop)
            )),
        }

        Ok(Box::pin(stream::iter(items)))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::TestDouble
    }
}
