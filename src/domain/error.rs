use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Provider configuration is malformed or incomplete
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Caller input cannot be served; no upstream call was made
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The backend returned an error or could not be reached
    #[error("Upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Decode failure inside an already started stream
    #[error("Stream error: {message}")]
    Stream { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("LLM functionality is disabled")]
    Disabled,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn upstream_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Re-label an upstream error with the provider that issued the call
    pub fn for_provider(self, provider: &str) -> Self {
        match self {
            Self::Upstream {
                status, message, ..
            } => Self::Upstream {
                provider: provider.to_string(),
                status,
                message,
            },
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP-equivalent status code for the error envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::Upstream {
                status: Some(status),
                ..
            } if *status >= 400 => *status,
            Self::Upstream { .. } => 502,
            Self::Stream { .. } => 502,
            Self::Configuration { .. } | Self::Disabled => 503,
            // Client closed request
            Self::Cancelled => 499,
            Self::Internal { .. } => 500,
        }
    }

    /// Message surfaced to callers; upstream bodies are passed through verbatim
    pub fn public_message(&self) -> String {
        match self {
            Self::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
