//! Historical candle data for the KFX bot.

mod csv_source;
mod replay;

pub use csv_source::{load_candles, CsvCandleSource};
pub use replay::{ReplayFeed, ReplaySettings};
