//! Market data provider trait.

use crate::error::DataError;
use crate::types::{Candle, SymbolInfo, Tick, Timeframe};
use async_trait::async_trait;

/// Source of candles, ticks and symbol metadata.
///
/// Implementations wrap a trading terminal or a recorded history. An
/// insufficient history is not an error here: providers return what they
/// have and the caller decides whether the window is complete.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Make the symbol available for quoting.
    ///
    /// Returns `false` when the provider does not know the symbol.
    async fn select_symbol(&self, _symbol: &str) -> Result<bool, DataError> {
        Ok(true)
    }

    /// Get quoting properties for a symbol.
    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, DataError>;

    /// Get the latest tick, or `None` if the provider has no quote.
    async fn latest_tick(&self, symbol: &str) -> Result<Option<Tick>, DataError>;

    /// Get up to `count` of the most recent candles.
    ///
    /// # Returns
    /// Candles ordered from oldest to newest; the last one is the current,
    /// possibly still forming, candle.
    async fn recent_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
