//! Core types and traits for the KFX signal bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Tick, SymbolInfo, MarketSnapshot)
//! - Signals and order requests
//! - Capability traits for market data, order sinks, indicators and strategies

pub mod error;
pub mod traits;
pub mod types;

pub use error::{KfxError, KfxResult};
pub use traits::*;
pub use types::*;
