//! Configuration structures.

use kfx_core::error::{KfxError, KfxResult};
use kfx_core::traits::StrategyConfig;
use kfx_core::types::Timeframe;
use kfx_data::ReplaySettings;
use kfx_strategy::{EngulfingConfig, OrderSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub strategy: EngulfingConfig,
    #[serde(default)]
    pub order: OrderSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
}

impl AppConfig {
    /// Check values the type system cannot.
    pub fn validate(&self) -> KfxResult<()> {
        if self.bot.symbols.is_empty() {
            return Err(KfxError::Config("bot.symbols must not be empty".into()));
        }
        if self.bot.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(KfxError::Config("bot.symbols contains an empty symbol".into()));
        }
        if self.bot.poll_interval_secs == 0 {
            return Err(KfxError::Config(
                "bot.poll_interval_secs must be greater than 0".into(),
            ));
        }
        if self.terminal.base_url.is_empty() {
            return Err(KfxError::Config("terminal.base_url must be set".into()));
        }
        if !(self.replay.point > 0.0) || !(self.replay.spread_points >= 0.0) {
            return Err(KfxError::Config(
                "replay.point must be positive and replay.spread_points non-negative".into(),
            ));
        }
        self.strategy
            .validate()
            .map_err(|e| KfxError::Config(format!("strategy: {}", e)))?;
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> KfxResult<String> {
        toml::to_string_pretty(self).map_err(|e| KfxError::Serialization(e.to_string()))
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "kfx".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional daily-rolling log file
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Terminal gateway connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    pub token_env: String,
    pub timeout_secs: u64,
}

impl TerminalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8228".to_string(),
            token_env: "KFX_TERMINAL_TOKEN".to_string(),
            timeout_secs: 10,
        }
    }
}

/// What to trade and how often to look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    pub poll_interval_secs: u64,
}

impl BotSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            symbols: ["XAUUSDm", "GBPUSDm", "USDJPYm", "EURUSDm", "US30m"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeframe: Timeframe::M1,
            poll_interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_config;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot.symbols.len(), 5);
        assert_eq!(config.bot.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.strategy.lot, dec!(0.1));
        assert_eq!(config.order.magic, 100_000);
    }

    #[test]
    fn test_validate_rejects_empty_symbols() {
        let mut config = AppConfig::default();
        config.bot.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_strategy() {
        let mut config = AppConfig::default();
        config.strategy.structure_candles = 0;
        assert!(matches!(config.validate(), Err(KfxError::Config(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("kfx-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[bot]
symbols = ["EURUSDm"]
timeframe = "M5"

[strategy]
max_spread_points = 150.0
ma_kind = "ema"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path));
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.bot.symbols, vec!["EURUSDm".to_string()]);
        assert_eq!(config.bot.timeframe, Timeframe::M5);
        assert_eq!(config.bot.poll_interval_secs, 60);
        assert_eq!(config.strategy.max_spread_points, 150.0);
        assert_eq!(config.strategy.sl_points, 60.0);
        assert_eq!(config.order.comment, "KFX Bot Entry");
        assert!(config.to_toml().unwrap().contains("[strategy]"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Some(std::path::Path::new("/nonexistent/kfx.toml"))).is_err());
    }
}
