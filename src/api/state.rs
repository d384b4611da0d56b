//! Application state shared by all handlers

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{DisabledVectorHealth, RawSettings, VectorHealthCheck};
use crate::infrastructure::services::PluginInstance;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub vector_health: Arc<dyn VectorHealthCheck>,
    instance: Arc<RwLock<Arc<PluginInstance>>>,
}

impl AppState {
    pub fn new(config: AppConfig, settings: &RawSettings) -> Self {
        let instance = PluginInstance::build(settings, &config.http);

        Self {
            config: Arc::new(config),
            vector_health: Arc::new(DisabledVectorHealth),
            instance: Arc::new(RwLock::new(Arc::new(instance))),
        }
    }

    pub fn with_vector_health(mut self, vector_health: Arc<dyn VectorHealthCheck>) -> Self {
        self.vector_health = vector_health;
        self
    }

    /// Snapshot of the current instance; in-flight requests keep theirs across reloads
    pub async fn instance(&self) -> Arc<PluginInstance> {
        self.instance.read().await.clone()
    }

    /// Replace the instance with one built from `settings`
    pub async fn reload(&self, settings: &RawSettings) -> Arc<PluginInstance> {
        let fresh = Arc::new(PluginInstance::build(settings, &self.config.http));

        let previous = {
            let mut slot = self.instance.write().await;
            std::mem::replace(&mut *slot, fresh.clone())
        };
        previous.probe().invalidate();

        info!(
            provider = ?fresh.settings().and_then(|s| s.provider),
            "LLM settings reloaded"
        );
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderKind;

    #[tokio::test]
    async fn test_reload_swaps_instance() {
        let state = AppState::new(AppConfig::default(), &RawSettings::default());
        let before = state.instance().await;
        assert!(before.settings().unwrap().provider.is_none());

        let settings: RawSettings = serde_json::from_str(r#"{"provider": "test"}"#).unwrap();
        state.reload(&settings).await;

        let after = state.instance().await;
        assert_eq!(
            after.settings().unwrap().provider,
            Some(ProviderKind::TestDouble)
        );
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
