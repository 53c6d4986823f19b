//! CLI command implementations.

pub mod evaluate;
pub mod replay;
pub mod run;
pub mod validate;

use kfx_config::AppConfig;
use kfx_engine::EngineConfig;
use kfx_strategy::{EngulfingStrategy, OrderTemplate};

/// Strategy and order template from configuration.
pub(crate) fn build_strategy(config: &AppConfig) -> anyhow::Result<(EngulfingStrategy, OrderTemplate)> {
    let strategy = EngulfingStrategy::new(config.strategy.clone())?;
    let template = OrderTemplate::new(config.strategy.lot, config.order.clone());
    Ok((strategy, template))
}

/// Symbols from the command line, falling back to configuration.
pub(crate) fn engine_config(config: &AppConfig, symbols: &[String]) -> EngineConfig {
    let symbols = if symbols.is_empty() {
        config.bot.symbols.clone()
    } else {
        symbols.to_vec()
    };
    EngineConfig {
        symbols,
        timeframe: config.bot.timeframe,
    }
}
