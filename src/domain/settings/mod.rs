//! Provider settings: raw host configuration and its canonical resolution

mod effective;
mod kind;
mod raw;
mod resolver;

pub use effective::{
    AnthropicConfig, AzureConfig, DeploymentMapping, EffectiveSettings, GatewayConfig,
    OpenAiConfig, ProviderConfig, TestConfig,
};
pub use kind::ProviderKind;
pub use raw::{
    RawAnthropicSettings, RawGatewaySettings, RawModelSettings, RawOpenAiSettings, RawSecrets,
    RawSettings, RawTestSettings,
};
pub use resolver::{effective_disabled, effective_provider, resolve_settings};
