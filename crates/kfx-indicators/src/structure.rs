//! Market structure: support/resistance range and trendline direction.

use kfx_core::types::Candle;
use serde::{Deserialize, Serialize};

/// Lowest low and highest high over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub support: f64,
    pub resistance: f64,
}

/// Direction of the short-term trendline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendlineDirection {
    /// Higher high and higher low
    Up,
    /// Lower high and lower low
    Down,
    /// Anything else
    Flat,
}

impl TrendlineDirection {
    /// Numeric encoding for metadata maps: 1 up, -1 down, 0 flat.
    pub fn as_f64(&self) -> f64 {
        match self {
            TrendlineDirection::Up => 1.0,
            TrendlineDirection::Down => -1.0,
            TrendlineDirection::Flat => 0.0,
        }
    }
}

/// Support (minimum low) and resistance (maximum high) over the newest
/// `count` candles.
///
/// Returns `None` when fewer than `count` candles are available or `count`
/// is zero.
pub fn support_resistance(candles: &[Candle], count: usize) -> Option<PriceRange> {
    if count == 0 || candles.len() < count {
        return None;
    }
    let window = &candles[candles.len() - count..];

    let support = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let resistance = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);

    Some(PriceRange {
        support,
        resistance,
    })
}

/// Trendline direction over the newest `count` candles, comparing the first
/// and last candle of the window.
///
/// Returns `None` when fewer than `count` candles are available or `count`
/// is below two.
pub fn trendline_direction(candles: &[Candle], count: usize) -> Option<TrendlineDirection> {
    if count < 2 || candles.len() < count {
        return None;
    }
    let window = &candles[candles.len() - count..];
    let (first, last) = (window.first()?, window.last()?);

    let direction = if last.high > first.high && last.low > first.low {
        TrendlineDirection::Up
    } else if last.high < first.high && last.low < first.low {
        TrendlineDirection::Down
    } else {
        TrendlineDirection::Flat
    };
    Some(direction)
}
