use std::sync::Arc;

use tracing::info;

use super::http_client::HttpClient;
use super::{AnthropicProvider, AzureOpenAiProvider, GatewayProvider, OpenAiProvider, TestProvider};
use crate::config::HttpConfig;
use crate::domain::{DomainError, EffectiveSettings, LlmProvider, ProviderConfig, ProviderKind};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Build the adapter for resolved settings.
    ///
    /// Returns `Ok(None)` when the instance is disabled or has no provider.
    pub fn create(
        settings: &EffectiveSettings,
        http: &HttpConfig,
    ) -> Result<Option<Arc<dyn LlmProvider>>, DomainError> {
        let Some(kind) = settings.provider.filter(|_| !settings.disabled) else {
            return Ok(None);
        };

        if !settings.is_configured() {
            return Err(DomainError::configuration(format!(
                "Provider '{}' is missing required credentials",
                kind
            )));
        }

        let provider: Arc<dyn LlmProvider> = match (kind, &settings.config) {
            (ProviderKind::DirectApi, ProviderConfig::OpenAi(config)) => Arc::new(
                OpenAiProvider::with_base_url(
                    HttpClient::new(http)?,
                    config.api_key.clone(),
                    config.url.clone(),
                    settings.models.clone(),
                )
                .with_organization(config.organization_id.clone()),
            ),
            (ProviderKind::ManagedDeployment, ProviderConfig::Azure(config)) => Arc::new(
                AzureOpenAiProvider::new(HttpClient::new(http)?, config.clone())?,
            ),
            (ProviderKind::SecondVendor, ProviderConfig::Anthropic(config)) => {
                Arc::new(AnthropicProvider::with_base_url(
                    HttpClient::new(http)?,
                    config.api_key.clone(),
                    config.url.clone(),
                    settings.models.clone(),
                ))
            }
            (ProviderKind::ManagedGateway, ProviderConfig::Gateway(config)) => {
                Arc::new(GatewayProvider::new(HttpClient::new(http)?, config)?)
            }
            (ProviderKind::TestDouble, ProviderConfig::Test(config)) => {
                Arc::new(TestProvider::from_config(config))
            }
            (kind, _) => {
                return Err(DomainError::configuration(format!(
                    "Settings for provider '{}' are incomplete",
                    kind
                )));
            }
        };

        info!(provider = %kind, "LLM provider initialized");
        Ok(Some(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::{
        AnthropicConfig, AzureConfig, DeploymentMapping, GatewayConfig, OpenAiConfig, TestConfig,
    };
    use crate::domain::{CanonicalModel, ModelMapping};

    fn settings(provider: ProviderKind, config: ProviderConfig) -> EffectiveSettings {
        EffectiveSettings {
            provider: Some(provider),
            config,
            models: ModelMapping::openai_defaults(),
            disabled: false,
        }
    }

    fn create(settings: &EffectiveSettings) -> Result<Option<Arc<dyn LlmProvider>>, DomainError> {
        LlmProviderFactory::create(settings, &HttpConfig::default())
    }

    #[test]
    fn test_create_openai_provider() {
        let settings = settings(
            ProviderKind::DirectApi,
            ProviderConfig::OpenAi(OpenAiConfig {
                api_key: "sk".to_string(),
                ..Default::default()
            }),
        );

        let provider = create(&settings).unwrap().unwrap();
        assert_eq!(provider.kind(), ProviderKind::DirectApi);
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_create_anthropic_provider() {
        let settings = settings(
            ProviderKind::SecondVendor,
            ProviderConfig::Anthropic(AnthropicConfig {
                api_key: "key".to_string(),
                ..Default::default()
            }),
        );

        let provider = create(&settings).unwrap().unwrap();
        assert_eq!(provider.kind(), ProviderKind::SecondVendor);
    }

    #[test]
    fn test_create_azure_provider() {
        let settings = settings(
            ProviderKind::ManagedDeployment,
            ProviderConfig::Azure(AzureConfig {
                url: "https://test.openai.azure.com".to_string(),
                api_key: "key".to_string(),
                api_version: String::new(),
                deployments: vec![DeploymentMapping {
                    model: CanonicalModel::Base,
                    deployment: "dep".to_string(),
                }],
            }),
        );

        let provider = create(&settings).unwrap().unwrap();
        assert_eq!(provider.provider_name(), "azure");
    }

    #[test]
    fn test_create_gateway_requires_access_key() {
        let settings = settings(
            ProviderKind::ManagedGateway,
            ProviderConfig::Gateway(GatewayConfig {
                url: "https://gateway.example.com".to_string(),
                tenant_id: "1".to_string(),
                access_key: String::new(),
            }),
        );

        assert!(matches!(
            create(&settings),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let settings = settings(
            ProviderKind::DirectApi,
            ProviderConfig::OpenAi(OpenAiConfig::default()),
        );

        assert!(matches!(
            create(&settings),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_disabled_or_empty_settings_yield_no_provider() {
        assert!(create(&EffectiveSettings::default()).unwrap().is_none());

        let mut disabled = settings(ProviderKind::TestDouble, ProviderConfig::Test(TestConfig::default()));
        disabled.disabled = true;
        assert!(create(&disabled).unwrap().is_none());
    }

    #[test]
    fn test_create_test_provider() {
        let settings = settings(ProviderKind::TestDouble, ProviderConfig::Test(TestConfig::default()));

        let provider = create(&settings).unwrap().unwrap();
        assert_eq!(provider.kind(), ProviderKind::TestDouble);
    }
}
