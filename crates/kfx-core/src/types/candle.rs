//! Candle (OHLC) data type.

use serde::{Deserialize, Serialize};

/// One fixed-duration price bucket as reported by the terminal.
///
/// Prices are `f64` for fast indicator calculations; conversion to
/// `Decimal` happens only when an order is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, Unix milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing (or latest, for a forming candle) price
    pub close: f64,
    /// Number of ticks in the bucket
    #[serde(default)]
    pub tick_volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            tick_volume: 0.0,
        }
    }

    /// Set the tick volume.
    pub fn with_tick_volume(mut self, tick_volume: f64) -> Self {
        self.tick_volume = tick_volume;
        self
    }

    /// High minus low.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute distance between open and close.
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Distance from the top of the body to the high.
    #[inline]
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Distance from the bottom of the body to the low.
    #[inline]
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Close strictly above open.
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close strictly below open.
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_geometry() {
        let candle = Candle::new(1000, 100.0, 110.0, 95.0, 105.0);

        assert!((candle.range() - 15.0).abs() < 1e-9);
        assert!((candle.body() - 5.0).abs() < 1e-9);
        assert!((candle.upper_wick() - 5.0).abs() < 1e-9);
        assert!((candle.lower_wick() - 5.0).abs() < 1e-9);
        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
    }

    #[test]
    fn test_flat_candle_is_neither_direction() {
        let candle = Candle::new(0, 1.1, 1.2, 1.0, 1.1);
        assert!(!candle.is_bullish());
        assert!(!candle.is_bearish());
        assert_eq!(candle.body(), 0.0);
    }
}
