//! One-pass normalization of raw settings into `EffectiveSettings`

use tracing::warn;

use super::effective::{
    AnthropicConfig, AzureConfig, DeploymentMapping, EffectiveSettings, GatewayConfig,
    OpenAiConfig, ProviderConfig, TestConfig,
};
use super::raw::{RawModelSettings, RawSettings};
use super::ProviderKind;
use crate::domain::model::{parse_model, ModelMapping};
use crate::domain::DomainError;

/// The top-level `provider` field wins whenever it is non-empty
pub fn effective_provider<'a>(provider: &'a str, legacy_provider: &'a str) -> &'a str {
    if !provider.trim().is_empty() {
        provider.trim()
    } else {
        legacy_provider.trim()
    }
}

/// Either flag disables the instance
pub fn effective_disabled(disabled: bool, legacy_disabled: bool) -> bool {
    disabled || legacy_disabled
}

pub fn resolve_settings(raw: &RawSettings) -> Result<EffectiveSettings, DomainError> {
    let disabled = effective_disabled(raw.disabled, raw.open_ai.disabled);
    let provider = resolve_kind(raw);

    let config = match provider {
        None => ProviderConfig::None,
        Some(ProviderKind::DirectApi) => ProviderConfig::OpenAi(OpenAiConfig {
            url: raw.open_ai.url.trim().to_string(),
            api_key: raw.secrets.open_ai_key.clone(),
            organization_id: raw.open_ai.organization_id.trim().to_string(),
        }),
        Some(ProviderKind::ManagedDeployment) => ProviderConfig::Azure(AzureConfig {
            url: raw.open_ai.url.trim().to_string(),
            api_key: raw.secrets.open_ai_key.clone(),
            api_version: raw.open_ai.api_version.trim().to_string(),
            deployments: parse_deployments(&raw.open_ai.azure_model_mapping)?,
        }),
        Some(ProviderKind::SecondVendor) => ProviderConfig::Anthropic(AnthropicConfig {
            url: raw.anthropic.url.trim().to_string(),
            api_key: raw.secrets.anthropic_key.clone(),
        }),
        Some(ProviderKind::ManagedGateway) => ProviderConfig::Gateway(GatewayConfig {
            url: raw.gateway.url.trim().to_string(),
            tenant_id: raw.gateway.tenant_id.trim().to_string(),
            access_key: raw.secrets.gateway_access_key.clone(),
        }),
        Some(ProviderKind::TestDouble) => ProviderConfig::Test(TestConfig {
            content: raw.test.content.clone(),
            error: raw.test.error.clone(),
        }),
    };

    let mut models = default_models(provider);
    if let Some(overrides) = &raw.models {
        models = models.merged_with(&parse_model_settings(overrides)?);
    }

    Ok(EffectiveSettings {
        provider,
        config,
        models,
        disabled,
    })
}

/// Unknown kinds and an unreachable gateway degrade to no provider
fn resolve_kind(raw: &RawSettings) -> Option<ProviderKind> {
    let name = effective_provider(&raw.provider, &raw.open_ai.provider);

    if name.is_empty() {
        return None;
    }

    let Some(kind) = ProviderKind::parse(name) else {
        warn!(provider = %name, "Unknown LLM provider, starting disabled");
        return None;
    };

    if kind == ProviderKind::ManagedGateway && raw.gateway.url.trim().is_empty() {
        warn!("Managed gateway selected without a gateway URL, starting disabled");
        return None;
    }

    Some(kind)
}

fn default_models(provider: Option<ProviderKind>) -> ModelMapping {
    match provider {
        Some(ProviderKind::DirectApi) => ModelMapping::openai_defaults(),
        Some(ProviderKind::SecondVendor) => ModelMapping::anthropic_defaults(),
        _ => ModelMapping::default(),
    }
}

fn parse_deployments(pairs: &[Vec<String>]) -> Result<Vec<DeploymentMapping>, DomainError> {
    pairs
        .iter()
        .map(|pair| match pair.as_slice() {
            [model, deployment] => {
                let model = parse_model(model).map_err(|_| {
                    DomainError::configuration(format!(
                        "Invalid model '{}' in Azure model mapping",
                        model
                    ))
                })?;

                Ok(DeploymentMapping {
                    model,
                    deployment: deployment.trim().to_string(),
                })
            }
            _ => Err(DomainError::configuration(format!(
                "Azure model mapping entries need exactly two values, got {}",
                pair.len()
            ))),
        })
        .collect()
}

fn parse_model_settings(raw: &RawModelSettings) -> Result<ModelMapping, DomainError> {
    let default = if raw.default.trim().is_empty() {
        ModelMapping::default().default
    } else {
        parse_model(&raw.default).map_err(|_| {
            DomainError::configuration(format!("Invalid default model '{}'", raw.default))
        })?
    };

    let mut mapping = ModelMapping::new(default);

    for (model, concrete) in &raw.mapping {
        let model = parse_model(model).map_err(|_| {
            DomainError::configuration(format!("Invalid model '{}' in model mapping", model))
        })?;
        mapping = mapping.with(model, concrete.trim());
    }

    Ok(mapping)
}
