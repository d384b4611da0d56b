//! One configured broker instance: resolved settings, dispatcher and probe

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{DispatchService, HealthProbe, ProbeTarget};
use crate::config::HttpConfig;
use crate::domain::{
    resolve_settings, DomainError, EffectiveSettings, HealthSummary, RawSettings,
    VectorHealthCheck,
};
use crate::infrastructure::llm::LlmProviderFactory;

/// Built once per settings revision and swapped wholesale on reload
#[derive(Debug)]
pub struct PluginInstance {
    settings: Option<EffectiveSettings>,
    dispatcher: DispatchService,
    probe: HealthProbe,
}

impl PluginInstance {
    /// Build from raw settings. Invalid settings yield an instance whose
    /// calls fail with the configuration error instead of an `Err`.
    pub fn build(raw: &RawSettings, http: &HttpConfig) -> Self {
        match resolve_settings(raw) {
            Ok(settings) => Self::from_settings(settings, http),
            Err(e) => {
                warn!(error = %e, "Invalid LLM settings");
                Self {
                    settings: None,
                    dispatcher: DispatchService::unavailable(e.clone()),
                    probe: HealthProbe::new(ProbeTarget::Misconfigured(e)),
                }
            }
        }
    }

    pub fn from_settings(settings: EffectiveSettings, http: &HttpConfig) -> Self {
        let (dispatcher, target) = match LlmProviderFactory::create(&settings, http) {
            Ok(Some(provider)) => (
                DispatchService::new(provider.clone()),
                ProbeTarget::Provider(provider),
            ),
            Ok(None) if settings.disabled => {
                info!("LLM functionality is disabled");
                (
                    DispatchService::unavailable(DomainError::Disabled),
                    ProbeTarget::Disabled,
                )
            }
            Ok(None) => {
                info!("No LLM provider configured");
                (
                    DispatchService::unavailable(DomainError::Disabled),
                    ProbeTarget::NotConfigured,
                )
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize LLM provider");
                let target = if settings.is_configured() {
                    ProbeTarget::Misconfigured(e.clone())
                } else {
                    ProbeTarget::NotConfigured
                };
                (DispatchService::unavailable(e), target)
            }
        };

        Self {
            settings: Some(settings),
            dispatcher,
            probe: HealthProbe::new(target),
        }
    }

    /// `None` when the raw settings could not be resolved
    pub fn settings(&self) -> Option<&EffectiveSettings> {
        self.settings.as_ref()
    }

    pub fn dispatcher(&self) -> &DispatchService {
        &self.dispatcher
    }

    pub fn probe(&self) -> &HealthProbe {
        &self.probe
    }

    pub async fn health_summary(
        &self,
        vector: &dyn VectorHealthCheck,
        cancel: &CancellationToken,
    ) -> HealthSummary {
        let (provider_health, vector_health) =
            tokio::join!(self.probe.check(cancel), vector.check());
        HealthSummary::new(provider_health, vector_health)
    }
}
