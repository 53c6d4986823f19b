//! Core traits for the signal bot.

mod indicator;
mod market_data;
mod order_sink;
mod strategy;

pub use indicator::Indicator;
pub use market_data::MarketData;
pub use order_sink::OrderSink;
pub use strategy::{Strategy, StrategyConfig};
