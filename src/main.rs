//! KFX signal bot CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use kfx_config::load_config;
use kfx_monitor::setup_logging;
use std::path::Path;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path();
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })?;

    // Setup logging
    let level = cli
        .log_level
        .as_ref()
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.is_json();
    let _log_guard = setup_logging(&level, json, config.logging.file.as_deref().map(Path::new))
        .context("Failed to initialize logging")?;

    debug!(config = ?config_path, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, config).await,
        Commands::Replay(args) => cli::commands::replay::run(args, config).await,
        Commands::Evaluate(args) => cli::commands::evaluate::run(args, config).await,
        Commands::ValidateConfig => cli::commands::validate::run(config_path.as_deref(), &config),
    }
}
