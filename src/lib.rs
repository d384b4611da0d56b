//! LLM Broker
//!
//! One chat-completion contract over interchangeable LLM backends:
//! - Canonical model tiers mapped onto each provider's concrete models
//! - Adapters for OpenAI, Azure OpenAI, Anthropic and a managed gateway
//! - Uniform streaming with padded chunks and a single terminal sentinel
//! - End-to-end health probing with a success-only cache

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use tracing::info;

/// Build application state from the configured settings file
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let settings = config.load_settings()?;

    let state = AppState::new(config, &settings);
    info!("Application state initialized");

    Ok(state)
}
