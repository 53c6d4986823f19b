//! Tick, symbol metadata and the per-evaluation market snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Candle;

/// Latest bid/ask for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Symbol
    pub symbol: String,
    /// Best bid price
    pub bid: f64,
    /// Best ask price
    pub ask: f64,
    /// Timestamp (Unix milliseconds)
    pub timestamp: i64,
}

impl Tick {
    /// Ask minus bid, in price units.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Spread expressed in price increments (points).
    pub fn spread_points(&self, point: f64) -> f64 {
        self.spread() / point
    }
}

/// Quoting properties of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Symbol
    pub symbol: String,
    /// Smallest quoted price movement
    pub point: f64,
    /// Number of decimal places in a quote
    pub digits: u32,
}

impl SymbolInfo {
    /// Create symbol info.
    pub fn new(symbol: impl Into<String>, point: f64, digits: u32) -> Self {
        Self {
            symbol: symbol.into(),
            point,
            digits,
        }
    }

    /// Convert a price to `Decimal` rounded to the symbol's quote precision.
    ///
    /// Returns `None` for non-finite input.
    pub fn normalize_price(&self, price: f64) -> Option<Decimal> {
        Decimal::from_f64_retain(price).map(|d| d.round_dp(self.digits))
    }
}

/// Everything the evaluator may look at for one instrument in one cycle.
///
/// Candles are ordered oldest to newest. The last candle is the current
/// (possibly still forming) one, the candle before it is the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol quoting properties
    pub info: SymbolInfo,
    /// Latest tick, if the terminal returned one
    pub tick: Option<Tick>,
    /// Recent candles, oldest first
    pub candles: Vec<Candle>,
}

impl MarketSnapshot {
    /// Create a snapshot.
    pub fn new(info: SymbolInfo, tick: Option<Tick>, candles: Vec<Candle>) -> Self {
        Self {
            info,
            tick,
            candles,
        }
    }

    /// Symbol of this snapshot.
    pub fn symbol(&self) -> &str {
        &self.info.symbol
    }

    /// Current spread in points, if a tick is available.
    pub fn spread_points(&self) -> Option<f64> {
        self.tick
            .as_ref()
            .map(|tick| tick.spread_points(self.info.point))
    }

    /// The current (newest) candle.
    pub fn current(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The previous and current candles, in that order.
    pub fn last_pair(&self) -> Option<(&Candle, &Candle)> {
        match self.candles.as_slice() {
            [.., prev, cur] => Some((prev, cur)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 60_000, 1.0, 1.1, 0.9, 1.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_tick_spread_points() {
        let tick = Tick {
            symbol: "EURUSDm".to_string(),
            bid: 1.08500,
            ask: 1.08520,
            timestamp: 0,
        };
        assert!((tick.spread_points(0.00001) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_price() {
        let info = SymbolInfo::new("XAUUSDm", 0.001, 3);
        assert_eq!(info.normalize_price(10.5 - 60.0 * 0.001), Some(dec!(10.44)));
        assert_eq!(info.normalize_price(f64::NAN), None);
    }

    #[test]
    fn test_snapshot_windows() {
        let snapshot = MarketSnapshot::new(SymbolInfo::new("X", 0.01, 2), None, candles(5));

        let (prev, cur) = snapshot.last_pair().unwrap();
        assert_eq!(prev.close, 4.0);
        assert_eq!(cur.close, 5.0);
        assert!(snapshot.spread_points().is_none());
    }

    #[test]
    fn test_last_pair_needs_two_candles() {
        let snapshot = MarketSnapshot::new(SymbolInfo::new("X", 0.01, 2), None, candles(1));
        assert!(snapshot.last_pair().is_none());
        assert!(snapshot.current().is_some());
    }
}
