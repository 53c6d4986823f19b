//! Order sinks and market data providers backed by a trading terminal.

mod bridge;
mod paper;

pub use bridge::{BridgeConfig, TerminalBridge};
pub use paper::PaperSink;
