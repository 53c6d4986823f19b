//! One-shot evaluation of a candle file.

use anyhow::{Context, Result};
use kfx_config::AppConfig;
use kfx_core::traits::{MarketData, Strategy};
use kfx_core::types::{MarketSnapshot, Signal};
use kfx_data::{load_candles, ReplayFeed};
use tracing::info;

use super::build_strategy;
use crate::cli::EvaluateArgs;

pub async fn run(args: EvaluateArgs, config: AppConfig) -> Result<()> {
    let (strategy, template) = build_strategy(&config)?;

    let symbol = match &args.symbol {
        Some(symbol) => symbol.clone(),
        None => args
            .data
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("Cannot derive a symbol from the data path; pass --symbol")?,
    };

    let candles = load_candles(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    if candles.is_empty() {
        anyhow::bail!("{} contains no candles", args.data.display());
    }
    info!(symbol = %symbol, candles = candles.len(), "Evaluating newest candle");

    // Serve the file through a replay feed positioned on its last candle
    let mut feed = ReplayFeed::new(config.replay.clone());
    feed.insert(symbol.clone(), candles);
    feed.seek(feed.len() - 1);

    let info = feed.symbol_info(&symbol).await?;
    let tick = feed.latest_tick(&symbol).await?;
    let window = feed
        .recent_candles(&symbol, config.bot.timeframe, strategy.lookback())
        .await?;
    let snapshot = MarketSnapshot::new(info, tick, window);

    let evaluation = strategy.evaluate(&snapshot);

    println!("Symbol:   {}", symbol);
    println!("Signal:   {}", evaluation.signal);
    println!("Reason:   {}", evaluation.metadata.reason);
    if !evaluation.metadata.indicators.is_empty() {
        println!("Indicators:");
        for (name, value) in &evaluation.metadata.indicators {
            println!("  {:<18} {}", name, value);
        }
    }

    if let (Signal::Buy(_) | Signal::Sell(_), Some(tick)) = (&evaluation.signal, &snapshot.tick) {
        if let Some(order) = template.build(&evaluation.signal, &snapshot.info, tick)? {
            println!();
            println!("Order preview:");
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}
