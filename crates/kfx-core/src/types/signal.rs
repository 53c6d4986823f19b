//! Entry signals produced by a strategy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Side;

/// Price levels attached to an entry signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryLevels {
    /// Close of the current candle the levels are offset from
    pub reference_price: f64,
    /// Protective stop
    pub stop_loss: f64,
    /// Profit target
    pub take_profit: f64,
}

/// Why a strategy abstained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoSignal {
    /// Spread above the configured ceiling (both in points)
    SpreadTooWide { spread: f64, max: f64 },
    /// A required input was missing or shorter than its window
    DataUnavailable { what: String },
    /// Inputs were complete but no rule matched
    NoSetup,
}

impl NoSignal {
    /// Data-unavailable reason for the named input.
    pub fn unavailable(what: impl Into<String>) -> Self {
        NoSignal::DataUnavailable { what: what.into() }
    }

    /// Stable key for counting abstentions.
    pub fn kind(&self) -> &'static str {
        match self {
            NoSignal::SpreadTooWide { .. } => "spread_too_wide",
            NoSignal::DataUnavailable { .. } => "data_unavailable",
            NoSignal::NoSetup => "no_setup",
        }
    }
}

impl fmt::Display for NoSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoSignal::SpreadTooWide { spread, max } => {
                write!(f, "Spread too high ({:.1} > {:.1})", spread, max)
            }
            NoSignal::DataUnavailable { what } => write!(f, "{} not available", what),
            NoSignal::NoSetup => write!(f, "No valid signal"),
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "detail", rename_all = "lowercase")]
pub enum Signal {
    Buy(EntryLevels),
    Sell(EntryLevels),
    None(NoSignal),
}

impl Signal {
    /// True when no order should be placed.
    pub fn is_none(&self) -> bool {
        matches!(self, Signal::None(_))
    }

    /// Order side, for entry signals.
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::Buy(_) => Some(Side::Buy),
            Signal::Sell(_) => Some(Side::Sell),
            Signal::None(_) => None,
        }
    }

    /// Entry levels, for entry signals.
    pub fn levels(&self) -> Option<&EntryLevels> {
        match self {
            Signal::Buy(levels) | Signal::Sell(levels) => Some(levels),
            Signal::None(_) => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy(l) => write!(f, "BUY sl={} tp={}", l.stop_loss, l.take_profit),
            Signal::Sell(l) => write!(f, "SELL sl={} tp={}", l.stop_loss, l.take_profit),
            Signal::None(reason) => write!(f, "NONE ({})", reason),
        }
    }
}

/// Close relative to the trend average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "Up"),
            Trend::Down => write!(f, "Down"),
        }
    }
}

/// Indicator readings and explanation behind a signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMetadata {
    /// Name of the strategy that produced the signal
    pub strategy_name: String,
    /// Indicator values at evaluation time
    pub indicators: BTreeMap<String, f64>,
    /// Trend reading, when the evaluation got far enough to take one
    pub trend: Option<Trend>,
    /// Human-readable reason
    pub reason: String,
}

/// A signal together with the readings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub signal: Signal,
    pub metadata: SignalMetadata,
}

impl Evaluation {
    /// An abstention with only a reason attached.
    pub fn abstain(strategy_name: impl Into<String>, reason: NoSignal) -> Self {
        let metadata = SignalMetadata {
            strategy_name: strategy_name.into(),
            reason: reason.to_string(),
            ..Default::default()
        };
        Self {
            signal: Signal::None(reason),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accessors() {
        let levels = EntryLevels {
            reference_price: 10.5,
            stop_loss: 10.44,
            take_profit: 10.62,
        };
        let buy = Signal::Buy(levels);
        assert_eq!(buy.side(), Some(Side::Buy));
        assert_eq!(buy.levels(), Some(&levels));
        assert!(!buy.is_none());

        let none = Signal::None(NoSignal::NoSetup);
        assert!(none.is_none());
        assert!(none.side().is_none());
        assert!(none.levels().is_none());
    }

    #[test]
    fn test_no_signal_display_and_kind() {
        let wide = NoSignal::SpreadTooWide {
            spread: 250.0,
            max: 200.0,
        };
        assert_eq!(wide.to_string(), "Spread too high (250.0 > 200.0)");
        assert_eq!(wide.kind(), "spread_too_wide");
        assert_eq!(
            NoSignal::unavailable("moving average").to_string(),
            "moving average not available"
        );
    }

    #[test]
    fn test_abstain_evaluation() {
        let eval = Evaluation::abstain("Engulfing", NoSignal::NoSetup);
        assert!(eval.signal.is_none());
        assert_eq!(eval.metadata.reason, "No valid signal");
        assert!(eval.metadata.indicators.is_empty());
        assert!(eval.metadata.trend.is_none());
    }
}
