//! Validate configuration command.

use anyhow::Result;
use kfx_config::AppConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>, config: &AppConfig) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("Validating configuration: built-in defaults + environment"),
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Terminal: {}", config.terminal.base_url);
    println!("Symbols: {}", config.bot.symbols.join(", "));
    println!("Timeframe: {}", config.bot.timeframe);
    println!("Poll interval: {}s", config.bot.poll_interval_secs);
    println!("Lot: {}", config.strategy.lot);
    println!(
        "Max spread / SL / TP: {} / {} / {} points",
        config.strategy.max_spread_points, config.strategy.sl_points, config.strategy.tp_points
    );
    println!();
    println!("Effective configuration:");
    println!("{}", config.to_toml()?);

    Ok(())
}
