use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CanonicalModel;
use crate::domain::DomainError;

/// Maps canonical tiers onto concrete provider model names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMapping {
    pub default: CanonicalModel,
    #[serde(default)]
    pub mapping: BTreeMap<CanonicalModel, String>,
}

impl ModelMapping {
    pub fn new(default: CanonicalModel) -> Self {
        Self {
            default,
            mapping: BTreeMap::new(),
        }
    }

    pub fn with(mut self, model: CanonicalModel, concrete: impl Into<String>) -> Self {
        self.mapping.insert(model, concrete.into());
        self
    }

    /// Defaults for the OpenAI-compatible direct API
    pub fn openai_defaults() -> Self {
        Self::new(CanonicalModel::Base)
            .with(CanonicalModel::Base, "gpt-4o-mini")
            .with(CanonicalModel::Large, "gpt-4o")
    }

    /// Defaults for the Anthropic messages API
    pub fn anthropic_defaults() -> Self {
        Self::new(CanonicalModel::Base)
            .with(CanonicalModel::Base, "claude-3-5-haiku-latest")
            .with(CanonicalModel::Large, "claude-3-5-sonnet-latest")
    }

    /// Overlay `overrides` on top of `self`; non-empty override entries win
    pub fn merged_with(mut self, overrides: &ModelMapping) -> Self {
        self.default = overrides.default;

        for (model, concrete) in &overrides.mapping {
            if !concrete.trim().is_empty() {
                self.mapping.insert(*model, concrete.clone());
            }
        }

        self
    }

    fn lookup(&self, model: CanonicalModel) -> Option<&str> {
        self.mapping
            .get(&model)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Resolve a tier to its concrete name, falling back to the default tier once
    pub fn resolve(&self, model: CanonicalModel) -> Result<&str, DomainError> {
        self.lookup(model)
            .or_else(|| self.lookup(self.default))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "No concrete model configured for '{}' or default tier '{}'",
                    model, self.default
                ))
            })
    }
}

impl Default for ModelMapping {
    fn default() -> Self {
        Self::new(CanonicalModel::Base)
    }
}
