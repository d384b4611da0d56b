//! Chat request validation

use thiserror::Error;

use super::ChatRequest;
use crate::domain::DomainError;

/// Request validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    #[error("Messages cannot be empty")]
    EmptyMessages,

    #[error("Invalid temperature {value}: must be between 0 and 2")]
    InvalidTemperature { value: f32 },

    #[error("Invalid top_p {value}: must be between 0 and 1")]
    InvalidTopP { value: f32 },

    #[error("Invalid presence_penalty {value}: must be between -2 and 2")]
    InvalidPresencePenalty { value: f32 },

    #[error("Invalid frequency_penalty {value}: must be between -2 and 2")]
    InvalidFrequencyPenalty { value: f32 },

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,
}

impl RequestValidationError {
    /// Name of the offending request parameter
    pub fn param(&self) -> &'static str {
        match self {
            Self::EmptyMessages => "messages",
            Self::InvalidTemperature { .. } => "temperature",
            Self::InvalidTopP { .. } => "top_p",
            Self::InvalidPresencePenalty { .. } => "presence_penalty",
            Self::InvalidFrequencyPenalty { .. } => "frequency_penalty",
            Self::InvalidMaxTokens => "max_tokens",
        }
    }
}

impl From<RequestValidationError> for DomainError {
    fn from(err: RequestValidationError) -> Self {
        DomainError::bad_request(err.to_string())
    }
}

pub fn validate_request(request: &ChatRequest) -> Result<(), RequestValidationError> {
    if request.messages.is_empty() {
        return Err(RequestValidationError::EmptyMessages);
    }

    if let Some(value) = request.temperature {
        if !(0.0..=2.0).contains(&value) {
            return Err(RequestValidationError::InvalidTemperature { value });
        }
    }

    if let Some(value) = request.top_p {
        if !(0.0..=1.0).contains(&value) {
            return Err(RequestValidationError::InvalidTopP { value });
        }
    }

    if let Some(value) = request.presence_penalty {
        if !(-2.0..=2.0).contains(&value) {
            return Err(RequestValidationError::InvalidPresencePenalty { value });
        }
    }

    if let Some(value) = request.frequency_penalty {
        if !(-2.0..=2.0).contains(&value) {
            return Err(RequestValidationError::InvalidFrequencyPenalty { value });
        }
    }

    if request.max_tokens == Some(0) {
        return Err(RequestValidationError::InvalidMaxTokens);
    }

    Ok(())
}
