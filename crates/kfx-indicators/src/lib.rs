//! Technical indicators used by the signal evaluator.
//!
//! - Moving averages (SMA, EMA)
//! - Market structure (support/resistance range, trendline direction)
//! - Candlestick patterns (engulfing, doji, pin bar)
//!
//! Everything here is a pure function of its input window.

pub mod moving_average;
pub mod patterns;
pub mod structure;

pub use moving_average::{Ema, MovingAverageKind, Sma};
pub use patterns::{is_bearish_engulfing, is_bullish_engulfing, is_doji, pin_bar, PinBar};
pub use structure::{support_resistance, trendline_direction, PriceRange, TrendlineDirection};
