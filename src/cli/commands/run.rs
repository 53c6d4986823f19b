//! Live polling command implementation.

use anyhow::{Context, Result};
use kfx_broker::{BridgeConfig, PaperSink, TerminalBridge};
use kfx_config::AppConfig;
use kfx_core::traits::{MarketData, OrderSink};
use kfx_engine::{Engine, IntervalTicker};
use std::sync::Arc;
use tracing::{info, warn};

use super::{build_strategy, engine_config};
use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    config.validate()?;
    let (strategy, template) = build_strategy(&config)?;
    let engine_config = engine_config(&config, &args.symbols);

    let bridge_config = BridgeConfig::new(&config.terminal.base_url)
        .with_token_env(&config.terminal.token_env)
        .with_timeout(config.terminal.timeout());
    if bridge_config.token.is_none() {
        warn!(
            "{} is not set; connecting to the terminal without a token",
            config.terminal.token_env
        );
    }
    let bridge = Arc::new(TerminalBridge::new(bridge_config).context("Failed to create terminal client")?);

    let sink: Arc<dyn OrderSink> = if args.dry_run {
        info!("Dry run: orders go to a paper sink");
        Arc::new(PaperSink::default())
    } else {
        bridge.clone()
    };
    let market: Arc<dyn MarketData> = bridge;

    let mut engine = Engine::new(engine_config, Box::new(strategy), template, market, sink);
    engine.check_connection().await.with_context(|| {
        format!("Failed to connect to terminal at {}", config.terminal.base_url)
    })?;

    info!(
        interval_secs = config.bot.poll_interval_secs,
        "Starting signal loop"
    );

    let mut ticks = IntervalTicker::new(config.bot.poll_interval());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    let report = engine.run(&mut ticks, shutdown).await;
    println!("{}", report.summary());

    Ok(())
}
