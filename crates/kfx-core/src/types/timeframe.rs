//! Candle timeframes as the terminal names them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timeframe of a candle series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    /// 1 minute candles
    #[default]
    M1,
    /// 5 minute candles
    M5,
    /// 15 minute candles
    M15,
    /// 30 minute candles
    M30,
    /// 1 hour candles
    H1,
    /// 4 hour candles
    H4,
    /// Daily candles
    D1,
    /// Weekly candles
    W1,
    /// Monthly candles
    MN1,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
            Timeframe::MN1 => "MN1",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_display_matches_terminal_names() {
        assert_eq!(Timeframe::M15.to_string(), "M15");
        assert_eq!(Timeframe::MN1.to_string(), "MN1");
        assert_eq!(Timeframe::default(), Timeframe::M1);
    }

    #[test]
    fn test_timeframe_serde_uses_terminal_names() {
        assert_eq!(serde_json::to_string(&Timeframe::H4).unwrap(), "\"H4\"");
        let parsed: Timeframe = serde_json::from_str("\"D1\"").unwrap();
        assert_eq!(parsed, Timeframe::D1);
    }
}
