//! Domain layer - canonical models, settings, provider contract

pub mod error;
pub mod health;
pub mod llm;
pub mod model;
pub mod settings;

pub use error::DomainError;
pub use health::{
    DisabledVectorHealth, HealthSummary, ModelHealth, ProviderHealth, VectorHealth,
    VectorHealthCheck,
};
#[cfg(test)]
pub use health::MockVectorHealthCheck;
pub use llm::{
    validate_request, ChatRequest, ChatRequestBuilder, ChatResponse, ChatStreamChunk, FinishReason,
    LlmProvider, LlmStream, Message, MessageRole, StreamChunk, Usage,
};
pub use model::{parse_model, CanonicalModel, ModelMapping};
pub use settings::{resolve_settings, EffectiveSettings, ProviderConfig, ProviderKind, RawSettings};
