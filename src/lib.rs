pub mod analysis;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod report;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Command};
use crate::llm::ollama::OllamaClient;

/// Logs go to stderr so stdout carries only results.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    let settings = cli.endpoint.settings();
    tracing::debug!(?settings, "Resolved inference settings");

    match cli.command {
        Command::Run { file, columns, periods, ask, export } => {
            commands::run::run(&file, &columns, periods, ask, export.as_deref(), &settings).await
        }
        Command::Shell { columns } => {
            let client = OllamaClient::new(settings)?;
            commands::shell::run(columns, Box::new(client)).await
        }
        Command::Check => commands::endpoint::check(&settings).await,
        Command::Models => commands::endpoint::models(&settings).await,
    }
}
