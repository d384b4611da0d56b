use std::process::ExitCode;

use clap::Parser;
use llm_broker::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await.map(|()| ExitCode::SUCCESS),
        Command::Health(args) => Ok(if cli::health::run(args).await? {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
    }
}
