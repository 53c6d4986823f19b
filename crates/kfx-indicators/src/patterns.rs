//! Candlestick pattern detectors.
//!
//! Engulfing detection drives entries. Doji and pin bar are standalone
//! readings and are not consulted by any entry rule.

use kfx_core::types::Candle;
use serde::{Deserialize, Serialize};

/// Maximum body/range ratio for a doji.
const DOJI_BODY_RATIO: f64 = 0.1;

/// Minimum dominant-wick/body ratio for a pin bar.
const PIN_BAR_WICK_RATIO: f64 = 2.0;

/// Pin bar orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinBar {
    /// Long lower wick after a higher close
    Bullish,
    /// Long upper wick after a lower close
    Bearish,
}

impl PinBar {
    /// Numeric encoding for metadata maps: 1 bullish, -1 bearish.
    pub fn as_f64(&self) -> f64 {
        match self {
            PinBar::Bullish => 1.0,
            PinBar::Bearish => -1.0,
        }
    }
}

/// Bullish engulfing: a bearish candle followed by a bullish candle whose
/// body contains it (current open below previous close, current close above
/// previous open).
pub fn is_bullish_engulfing(prev: &Candle, current: &Candle) -> bool {
    current.is_bullish()
        && prev.is_bearish()
        && current.open < prev.close
        && current.close > prev.open
}

/// Bearish engulfing: a bullish candle followed by a bearish candle whose
/// body contains it (current open above previous close, current close below
/// previous open).
pub fn is_bearish_engulfing(prev: &Candle, current: &Candle) -> bool {
    current.is_bearish()
        && prev.is_bullish()
        && current.open > prev.close
        && current.close < prev.open
}

/// Small body relative to the range, with both wicks longer than the body.
///
/// A candle with zero range is not a doji.
pub fn is_doji(candle: &Candle) -> bool {
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }
    let body = candle.body();

    body / range < DOJI_BODY_RATIO && candle.upper_wick() > body && candle.lower_wick() > body
}

/// Pin bar: one wick at least twice the body while the other is shorter than
/// the body, confirmed by the close relative to the previous candle.
///
/// Returns `None` for candles without a body.
pub fn pin_bar(candle: &Candle, prev: &Candle) -> Option<PinBar> {
    let body = candle.body();
    if body <= 0.0 {
        return None;
    }
    let upper = candle.upper_wick();
    let lower = candle.lower_wick();

    let long_upper = upper > body * PIN_BAR_WICK_RATIO && lower < body;
    let long_lower = lower > body * PIN_BAR_WICK_RATIO && upper < body;
    if !(long_upper || long_lower) {
        return None;
    }

    if candle.close > prev.close && lower > upper {
        Some(PinBar::Bullish)
    } else if candle.close < prev.close && upper > lower {
        Some(PinBar::Bearish)
    } else {
        None
    }
}
