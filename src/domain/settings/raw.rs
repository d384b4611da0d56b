//! Settings as stored by the host, including deprecated fields

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw plugin settings with secrets already decrypted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    pub provider: String,
    pub disabled: bool,
    #[serde(rename = "openAI")]
    pub open_ai: RawOpenAiSettings,
    pub anthropic: RawAnthropicSettings,
    pub gateway: RawGatewaySettings,
    pub test: RawTestSettings,
    pub models: Option<RawModelSettings>,
    pub secrets: RawSecrets,
}

/// Nested OpenAI block; `provider` and `disabled` here are deprecated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOpenAiSettings {
    pub provider: String,
    pub url: String,
    pub organization_id: String,
    pub api_version: String,
    pub azure_model_mapping: Vec<Vec<String>>,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnthropicSettings {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGatewaySettings {
    pub url: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTestSettings {
    pub content: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModelSettings {
    pub default: String,
    pub mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSecrets {
    #[serde(rename = "openAIKey")]
    pub open_ai_key: String,
    #[serde(rename = "anthropicKey")]
    pub anthropic_key: String,
    #[serde(rename = "gatewayAccessKey")]
    pub gateway_access_key: String,
}
