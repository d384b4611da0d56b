//! Health command - probes the configured provider once

use std::path::PathBuf;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::DisabledVectorHealth;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::services::PluginInstance;

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Settings file, overriding `settings_path` from the configuration
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// Print the health summary as JSON; returns whether the provider is OK
pub async fn run(args: HealthArgs) -> anyhow::Result<bool> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    if args.settings.is_some() {
        config.settings_path = args.settings;
    }

    let settings = config.load_settings()?;
    let instance = PluginInstance::build(&settings, &config.http);

    let summary = instance
        .health_summary(&DisabledVectorHealth, &CancellationToken::new())
        .await;
    debug!(ok = summary.is_ok(), "Health probe finished");

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(summary.is_ok())
}
