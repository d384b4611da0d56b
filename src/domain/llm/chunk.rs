use serde::{Deserialize, Serialize};

use super::{FinishReason, MessageRole, StreamChunk, Usage};
use crate::domain::DomainError;

/// Error marker carried in-band by a stream chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkError {
    pub message: String,
    pub code: u16,
}

impl From<&DomainError> for ChunkError {
    fn from(err: &DomainError) -> Self {
        Self {
            message: err.public_message(),
            code: err.status_code(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Normalized streaming chunk, identical in shape for every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Random-length filler obscuring the true payload size on the wire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ChunkError>,
    /// Terminal sentinel, framed by the HTTP layer rather than serialized
    #[serde(skip)]
    pub done: bool,
}

impl ChatStreamChunk {
    fn empty(created: i64) -> Self {
        Self {
            id: String::new(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: String::new(),
            choices: Vec::new(),
            usage: None,
            padding: None,
            error: None,
            done: false,
        }
    }

    pub fn from_native(chunk: StreamChunk, created: i64) -> Self {
        let mut normalized = Self::empty(created);
        normalized.id = chunk.id;
        normalized.model = chunk.model;
        normalized.usage = chunk.usage;
        normalized.choices.push(ChunkChoice {
            index: 0,
            delta: ChunkDelta {
                role: chunk.role,
                content: chunk.delta,
            },
            finish_reason: chunk.finish_reason,
        });
        normalized
    }

    pub fn error(err: &DomainError, created: i64) -> Self {
        let mut chunk = Self::empty(created);
        chunk.error = Some(ChunkError::from(err));
        chunk
    }

    pub fn done(created: i64) -> Self {
        let mut chunk = Self::empty(created);
        chunk.done = true;
        chunk
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}
