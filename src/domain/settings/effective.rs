use crate::domain::model::{CanonicalModel, ModelMapping};

use super::ProviderKind;

/// Model tier bound to a named Azure deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentMapping {
    pub model: CanonicalModel,
    pub deployment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub url: String,
    pub api_key: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureConfig {
    pub url: String,
    pub api_key: String,
    pub api_version: String,
    pub deployments: Vec<DeploymentMapping>,
}

impl AzureConfig {
    /// Deployment serving a tier, if one is mapped
    pub fn deployment_for(&self, model: CanonicalModel) -> Option<&str> {
        self.deployments
            .iter()
            .find(|m| m.model == model && !m.deployment.trim().is_empty())
            .map(|m| m.deployment.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnthropicConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    pub url: String,
    pub tenant_id: String,
    pub access_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestConfig {
    pub content: Option<String>,
    pub error: Option<String>,
}

/// Per-kind connection data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderConfig {
    #[default]
    None,
    OpenAi(OpenAiConfig),
    Azure(AzureConfig),
    Anthropic(AnthropicConfig),
    Gateway(GatewayConfig),
    Test(TestConfig),
}

/// Canonical settings of one plugin instance; replaced wholesale on reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub provider: Option<ProviderKind>,
    pub config: ProviderConfig,
    pub models: ModelMapping,
    pub disabled: bool,
}

impl EffectiveSettings {
    /// Whether requests should reach a provider at all
    pub fn is_active(&self) -> bool {
        !self.disabled && self.provider.is_some()
    }

    /// Credentials-present check, independent of reachability
    pub fn is_configured(&self) -> bool {
        if self.disabled {
            return true;
        }

        match (&self.provider, &self.config) {
            (Some(ProviderKind::DirectApi), ProviderConfig::OpenAi(c)) => !c.api_key.is_empty(),
            (Some(ProviderKind::SecondVendor), ProviderConfig::Anthropic(c)) => {
                !c.api_key.is_empty()
            }
            (Some(ProviderKind::ManagedDeployment), ProviderConfig::Azure(c)) => {
                !c.api_key.is_empty()
                    && c.deployments
                        .iter()
                        .any(|m| !m.deployment.trim().is_empty())
            }
            (Some(ProviderKind::ManagedGateway), _) | (Some(ProviderKind::TestDouble), _) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: Option<ProviderKind>, config: ProviderConfig) -> EffectiveSettings {
        EffectiveSettings {
            provider,
            config,
            models: ModelMapping::default(),
            disabled: false,
        }
    }

    #[test]
    fn test_openai_requires_key() {
        let missing = settings(
            Some(ProviderKind::DirectApi),
            ProviderConfig::OpenAi(OpenAiConfig::default()),
        );
        assert!(!missing.is_configured());

        let present = settings(
            Some(ProviderKind::DirectApi),
            ProviderConfig::OpenAi(OpenAiConfig {
                api_key: "sk".to_string(),
                ..Default::default()
            }),
        );
        assert!(present.is_configured());
    }

    #[test]
    fn test_azure_requires_non_empty_deployment() {
        let mut config = AzureConfig {
            api_key: "key".to_string(),
            deployments: vec![DeploymentMapping {
                model: CanonicalModel::Base,
                deployment: " ".to_string(),
            }],
            ..Default::default()
        };

        let blank = settings(
            Some(ProviderKind::ManagedDeployment),
            ProviderConfig::Azure(config.clone()),
        );
        assert!(!blank.is_configured());

        config.deployments[0].deployment = "gpt-35-turbo".to_string();
        let mapped = settings(
            Some(ProviderKind::ManagedDeployment),
            ProviderConfig::Azure(config),
        );
        assert!(mapped.is_configured());
    }

    #[test]
    fn test_gateway_and_test_always_configured() {
        assert!(settings(Some(ProviderKind::ManagedGateway), ProviderConfig::None).is_configured());
        assert!(settings(Some(ProviderKind::TestDouble), ProviderConfig::None).is_configured());
    }

    #[test]
    fn test_no_provider_is_not_configured() {
        let empty = EffectiveSettings::default();
        assert!(!empty.is_configured());
        assert!(!empty.is_active());
    }

    #[test]
    fn test_disabled_counts_as_configured() {
        let mut disabled = EffectiveSettings::default();
        disabled.disabled = true;

        assert!(disabled.is_configured());
        assert!(!disabled.is_active());
    }

    #[test]
    fn test_deployment_for() {
        let config = AzureConfig {
            deployments: vec![DeploymentMapping {
                model: CanonicalModel::Base,
                deployment: "gpt-35-turbo".to_string(),
            }],
            ..Default::default()
        };

        assert_eq!(config.deployment_for(CanonicalModel::Base), Some("gpt-35-turbo"));
        assert_eq!(config.deployment_for(CanonicalModel::Large), None);
    }
}
