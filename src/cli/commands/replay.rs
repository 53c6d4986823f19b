//! Replay command implementation.

use anyhow::{Context, Result};
use kfx_broker::PaperSink;
use kfx_config::AppConfig;
use kfx_core::traits::Strategy;
use kfx_data::ReplayFeed;
use kfx_engine::{Engine, ReplayTicker};
use std::sync::Arc;
use tracing::info;

use super::{build_strategy, engine_config};
use crate::cli::{OutputFormat, ReplayArgs};

pub async fn run(args: ReplayArgs, config: AppConfig) -> Result<()> {
    let (strategy, template) = build_strategy(&config)?;
    let engine_config = engine_config(&config, &args.symbols);

    if !args.data.is_dir() {
        anyhow::bail!(
            "Data path '{}' is not a directory. Provide a directory containing {{SYMBOL}}.csv files (e.g. --data ./data)",
            args.data.display()
        );
    }

    let feed = ReplayFeed::from_dir(&args.data, &engine_config.symbols, config.replay.clone())
        .with_context(|| format!("Failed to load replay data from {}", args.data.display()))?;
    info!(candles = feed.len(), symbols = engine_config.symbols.len(), "Replay data loaded");
    let feed = Arc::new(feed);

    // First cursor position with a full lookback window behind it
    let start = strategy.lookback().saturating_sub(1);
    let mut ticks = ReplayTicker::new(feed.clone(), start);

    let sink = Arc::new(PaperSink::default());
    let mut engine = Engine::new(engine_config, Box::new(strategy), template, feed, sink);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let report = engine.run(&mut ticks, shutdown).await;

    // Output results
    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    // Save if requested
    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {}", save_path.display());
    }

    Ok(())
}
