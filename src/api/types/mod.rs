//! OpenAI-compatible API types

pub mod chat;
pub mod error;
pub mod json;
pub mod models;

pub use chat::{
    ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ChatMessageRole, ContentPart, MessageContent, StopSequence, Usage,
};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse};
pub use json::Json;
pub use models::{Model as ApiModel, ModelsResponse};
