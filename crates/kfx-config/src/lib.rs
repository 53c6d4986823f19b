//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, BotSettings, LoggingConfig, TerminalConfig};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from an optional file and the environment.
///
/// Environment variables use the `KFX` prefix and `__` between section and
/// key, e.g. `KFX__STRATEGY__MAX_SPREAD_POINTS=150`. `KFX__BOT__SYMBOLS`
/// takes a comma-separated list.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("KFX")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("bot.symbols")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
