//! Provider health probe.
//!
//! Each model reported by the provider gets a one-token completion. Cycles are
//! serialized so concurrent callers share one set of upstream calls, and only
//! healthy results are cached.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    CanonicalModel, ChatRequest, DomainError, LlmProvider, ModelHealth, ProviderHealth,
};
use crate::infrastructure::observability::record_health_probe;

const PROBE_PROMPT: &str = "Hello";
const NO_FUNCTIONING_MODELS: &str = "No functioning models are available";

/// What the probe exercises
#[derive(Debug, Clone)]
pub enum ProbeTarget {
    Provider(Arc<dyn LlmProvider>),
    Disabled,
    NotConfigured,
    /// Settings were present but the provider could not be built
    Misconfigured(DomainError),
}

#[derive(Debug)]
pub struct HealthProbe {
    target: ProbeTarget,
    cycle: Mutex<()>,
    cached: RwLock<Option<ProviderHealth>>,
}

impl HealthProbe {
    pub fn new(target: ProbeTarget) -> Self {
        Self {
            target,
            cycle: Mutex::new(()),
            cached: RwLock::new(None),
        }
    }

    pub async fn check(&self, cancel: &CancellationToken) -> ProviderHealth {
        let provider = match &self.target {
            ProbeTarget::Provider(provider) => provider,
            ProbeTarget::Disabled => return ProviderHealth::disabled(),
            ProbeTarget::NotConfigured => return ProviderHealth::not_configured(),
            ProbeTarget::Misconfigured(e) => return failure(e.public_message(), BTreeMap::new()),
        };

        if let Some(health) = self.cached() {
            return health;
        }

        let _cycle = self.cycle.lock().await;

        // Another caller may have finished a cycle while we waited
        if let Some(health) = self.cached() {
            debug!("Health probe served from cache");
            return health;
        }

        let health = probe(provider.as_ref(), cancel).await;

        if health.ok {
            if let Ok(mut slot) = self.cached.write() {
                *slot = Some(health.clone());
            }
        }

        health
    }

    /// Drop the cached result so the next check probes again
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.cached.write() {
            *slot = None;
        }
    }

    fn cached(&self) -> Option<ProviderHealth> {
        self.cached.read().ok().and_then(|slot| slot.clone())
    }
}

async fn probe(provider: &dyn LlmProvider, cancel: &CancellationToken) -> ProviderHealth {
    let provider_name = provider.provider_name();

    let models = match provider.list_models(cancel).await {
        Ok(models) => models,
        Err(e) => {
            warn!(provider = provider_name, error = %e, "Health probe could not list models");
            return failure(e.public_message(), BTreeMap::new());
        }
    };

    let results = join_all(
        models
            .iter()
            .map(|model| probe_model(provider, *model, cancel)),
    )
    .await;

    let models: BTreeMap<_, _> = models.into_iter().zip(results).collect();

    if models.values().any(|m| m.ok) {
        info!(provider = provider_name, models = models.len(), "Health probe passed");
        ProviderHealth {
            configured: true,
            ok: true,
            error: None,
            models,
        }
    } else {
        warn!(provider = provider_name, "Health probe found no functioning models");
        failure(NO_FUNCTIONING_MODELS.to_string(), models)
    }
}

async fn probe_model(
    provider: &dyn LlmProvider,
    model: CanonicalModel,
    cancel: &CancellationToken,
) -> ModelHealth {
    let request = ChatRequest::builder(model)
        .user(PROBE_PROMPT)
        .max_tokens(1)
        .build();

    let health = match provider.chat(request, cancel).await {
        Ok(_) => ModelHealth::healthy(),
        Err(e) => {
            debug!(model = %model, error = %e, "Model probe failed");
            ModelHealth::failed(e.public_message())
        }
    };

    record_health_probe(provider.provider_name(), model.as_str(), health.ok);
    health
}

fn failure(error: String, models: BTreeMap<CanonicalModel, ModelHealth>) -> ProviderHealth {
    ProviderHealth {
        configured: true,
        ok: false,
        error: Some(error),
        models,
    }
}
