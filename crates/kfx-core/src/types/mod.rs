//! Core data types for the signal bot.

mod candle;
mod market;
mod order;
mod signal;
mod timeframe;

pub use candle::Candle;
pub use market::{MarketSnapshot, SymbolInfo, Tick};
pub use order::{AccountInfo, FillPolicy, OrderReceipt, OrderRequest, Side, TimeInForce, RETCODE_DONE};
pub use signal::{EntryLevels, Evaluation, NoSignal, Signal, SignalMetadata, Trend};
pub use timeframe::Timeframe;
