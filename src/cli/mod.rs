//! CLI module for the LLM broker
//!
//! - `serve`: HTTP server (default deployment mode)
//! - `health`: one-shot provider probe for scripts and container checks

pub mod health;
pub mod serve;

use clap::{Parser, Subcommand};

/// LLM Broker - one chat-completion contract over interchangeable LLM providers
#[derive(Parser)]
#[command(name = "llm-broker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Probe the configured provider once and print the health summary
    Health(health::HealthArgs),
}
