//! Health summary types and the vector-store collaborator

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::CanonicalModel;

#[cfg(test)]
use mockall::automock;

/// Probe outcome for a single canonical model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelHealth {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate provider health; `configured` and `ok` are reported independently
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub configured: bool,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub models: BTreeMap<CanonicalModel, ModelHealth>,
}

impl ProviderHealth {
    pub fn not_configured() -> Self {
        Self {
            configured: false,
            ok: false,
            error: Some("LLM provider is not configured".to_string()),
            models: BTreeMap::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            configured: true,
            ok: false,
            error: Some("LLM provider is disabled".to_string()),
            models: BTreeMap::new(),
        }
    }
}

/// Pass-through status from the embedding/vector store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorHealth {
    pub enabled: bool,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub provider_health: ProviderHealth,
    pub vector_health: VectorHealth,
    pub version: String,
}

impl HealthSummary {
    pub fn new(provider_health: ProviderHealth, vector_health: VectorHealth) -> Self {
        Self {
            provider_health,
            vector_health,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.provider_health.ok
    }
}

/// Health source for the embedding/vector-search subsystem
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorHealthCheck: Send + Sync {
    async fn check(&self) -> VectorHealth;
}

/// Used when no vector store is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVectorHealth;

#[async_trait]
impl VectorHealthCheck for DisabledVectorHealth {
    async fn check(&self) -> VectorHealth {
        VectorHealth::default()
    }
}
