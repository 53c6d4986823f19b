//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Used when `--config` is not given and the file exists.
const DEFAULT_CONFIG: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "kfx")]
#[command(author, version, about = "Engulfing-pattern signal bot for a trading terminal")]
pub struct Cli {
    /// Configuration file path [default: config/default.toml if present]
    #[arg(short, long, env = "KFX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides logging.level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The configuration file to read, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG);
            default.is_file().then_some(default)
        })
    }
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the terminal and trade on signals
    Run(RunArgs),
    /// Replay recorded candles through the strategy into a paper sink
    Replay(ReplayArgs),
    /// Evaluate the newest candle of a CSV file once
    Evaluate(EvaluateArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Send orders to a paper sink instead of the terminal
    #[arg(long)]
    pub dry_run: bool,

    /// Symbols to trade (comma-separated, overrides bot.symbols)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Directory containing one {SYMBOL}.csv per symbol
    #[arg(long)]
    pub data: PathBuf,

    /// Symbols to replay (comma-separated, overrides bot.symbols)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON report to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Candle file (CSV)
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol name [default: file name without extension]
    #[arg(short, long)]
    pub symbol: Option<String>,
}
