//! Provider settings admin endpoints

use axum::extract::State;
use serde::Serialize;
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::{ModelMapping, ProviderKind, RawSettings};
use crate::infrastructure::services::PluginInstance;

/// Effective settings summary; secrets are never echoed back
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub provider: Option<ProviderKind>,
    pub disabled: bool,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PluginInstance> for SettingsResponse {
    fn from(instance: &PluginInstance) -> Self {
        let error = instance
            .dispatcher()
            .provider()
            .err()
            .map(|e| e.public_message());

        match instance.settings() {
            Some(settings) => Self {
                provider: settings.provider,
                disabled: settings.disabled,
                configured: settings.is_configured(),
                models: Some(settings.models.clone()),
                error,
            },
            None => Self {
                provider: None,
                disabled: false,
                configured: false,
                models: None,
                error,
            },
        }
    }
}

/// GET /admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Json<SettingsResponse> {
    let instance = state.instance().await;
    Json(SettingsResponse::from(instance.as_ref()))
}

/// PUT /admin/settings
///
/// Rebuilds the plugin instance. Invalid settings are accepted and reported
/// in `error`; requests then fail with the same message.
pub async fn update_settings(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(settings): Json<RawSettings>,
) -> Json<SettingsResponse> {
    let instance = state.reload(&settings).await;
    let response = SettingsResponse::from(instance.as_ref());

    info!(
        provider = ?response.provider,
        disabled = response.disabled,
        configured = response.configured,
        "Settings updated via admin API"
    );

    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn test_response_omits_secrets() {
        let settings: RawSettings = serde_json::from_str(
            r#"{"provider": "openai", "secrets": {"openAIKey": "sk-hidden"}}"#,
        )
        .unwrap();
        let instance = PluginInstance::build(&settings, &HttpConfig::default());

        let json = serde_json::to_string(&SettingsResponse::from(&instance)).unwrap();

        assert!(json.contains("\"provider\":\"openai\""));
        assert!(!json.contains("sk-hidden"));
    }

    #[test]
    fn test_response_reports_resolution_error() {
        let settings: RawSettings = serde_json::from_str(
            r#"{"provider": "azure", "openAI": {"azureModelMapping": [["base"]]}}"#,
        )
        .unwrap();
        let instance = PluginInstance::build(&settings, &HttpConfig::default());

        let response = SettingsResponse::from(&instance);

        assert!(!response.configured);
        assert!(response.error.is_some());
    }
}
