//! LLM provider domain models and traits

mod chunk;
mod message;
mod provider;
mod request;
mod response;
mod validation;

pub use chunk::{ChatStreamChunk, ChunkChoice, ChunkDelta, ChunkError};
pub use message::{Message, MessageRole};
pub use provider::{LlmProvider, LlmStream};
pub use request::{ChatRequest, ChatRequestBuilder};
pub use response::{ChatResponse, FinishReason, StreamChunk, Usage};
pub use validation::{validate_request, RequestValidationError};
