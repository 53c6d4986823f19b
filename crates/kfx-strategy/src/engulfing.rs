//! Engulfing Strategy.
//!
//! Buys a bullish engulfing candle that closes above the moving average and
//! above support; sells a bearish engulfing candle that closes below the
//! moving average and below resistance. Stop-loss and take-profit are fixed
//! point offsets from the current close.

use kfx_core::error::StrategyError;
use kfx_core::traits::{Strategy, StrategyConfig};
use kfx_core::types::{
    Candle, EntryLevels, Evaluation, MarketSnapshot, NoSignal, Signal, SignalMetadata, Trend,
};
use kfx_indicators::{
    is_bearish_engulfing, is_bullish_engulfing, is_doji, pin_bar, support_resistance,
    trendline_direction, MovingAverageKind, PinBar, TrendlineDirection,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for the engulfing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngulfingConfig {
    /// Order volume in lots
    pub lot: Decimal,
    /// Highest spread, in points, at which the strategy still evaluates
    pub max_spread_points: f64,
    /// Stop-loss distance from the current close, in points
    pub sl_points: f64,
    /// Take-profit distance from the current close, in points
    pub tp_points: f64,
    /// Moving average period (closes)
    pub ma_period: usize,
    /// Moving average flavour
    pub ma_kind: MovingAverageKind,
    /// Candles used for support/resistance
    pub structure_candles: usize,
    /// Candles used for the trendline reading
    pub trendline_candles: usize,
}

impl Default for EngulfingConfig {
    fn default() -> Self {
        Self {
            lot: dec!(0.1),
            max_spread_points: 200.0,
            sl_points: 60.0,
            tp_points: 120.0,
            ma_period: 200,
            ma_kind: MovingAverageKind::Sma,
            structure_candles: 10,
            trendline_candles: 3,
        }
    }
}

impl StrategyConfig for EngulfingConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lot <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig("Lot must be positive".into()));
        }
        if !(self.max_spread_points >= 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Max spread must be zero or positive".into(),
            ));
        }
        if !(self.sl_points > 0.0) || !(self.tp_points > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Stop-loss and take-profit offsets must be positive".into(),
            ));
        }
        if self.ma_period == 0 || self.structure_candles == 0 {
            return Err(StrategyError::InvalidConfig(
                "Moving average and support/resistance windows must be greater than 0".into(),
            ));
        }
        if self.trendline_candles < 2 {
            return Err(StrategyError::InvalidConfig(
                "Trendline window needs at least 2 candles".into(),
            ));
        }
        Ok(())
    }
}

/// Indicator readings for one evaluation.
///
/// `trendline`, `doji` and `pin_bar` are reported but never used by
/// [`EngulfingStrategy::decide`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub moving_average: f64,
    pub support: f64,
    pub resistance: f64,
    pub trend: Trend,
    pub bullish_engulfing: bool,
    pub bearish_engulfing: bool,
    pub trendline: TrendlineDirection,
    pub doji: bool,
    pub pin_bar: Option<PinBar>,
}

impl IndicatorSnapshot {
    fn to_map(&self, spread_points: f64) -> BTreeMap<String, f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut map: BTreeMap<String, f64> = [
            ("moving_average", self.moving_average),
            ("support", self.support),
            ("resistance", self.resistance),
            ("spread_points", spread_points),
            ("trend", if self.trend == Trend::Up { 1.0 } else { -1.0 }),
            ("bullish_engulfing", flag(self.bullish_engulfing)),
            ("bearish_engulfing", flag(self.bearish_engulfing)),
            ("trendline", self.trendline.as_f64()),
            ("doji", flag(self.doji)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        if let Some(pin) = self.pin_bar {
            map.insert("pin_bar".to_string(), pin.as_f64());
        }
        map
    }
}

/// Engulfing signal evaluator.
#[derive(Debug, Clone)]
pub struct EngulfingStrategy {
    config: EngulfingConfig,
}

impl EngulfingStrategy {
    /// Create a new engulfing strategy from a validated configuration.
    pub fn new(config: EngulfingConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngulfingConfig {
        &self.config
    }

    /// Compute every indicator the strategy reads.
    ///
    /// Fails with the name of the first window that is not fully available.
    pub fn indicators(&self, snapshot: &MarketSnapshot) -> Result<IndicatorSnapshot, NoSignal> {
        let candles = snapshot.candles.as_slice();

        let (prev, current) = snapshot
            .last_pair()
            .ok_or_else(|| NoSignal::unavailable("candles"))?;

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let moving_average = self
            .config
            .ma_kind
            .build(self.config.ma_period)
            .latest(&closes)
            .ok_or_else(|| NoSignal::unavailable("moving average"))?;

        let range = support_resistance(candles, self.config.structure_candles)
            .ok_or_else(|| NoSignal::unavailable("support/resistance"))?;

        let trendline = trendline_direction(candles, self.config.trendline_candles)
            .ok_or_else(|| NoSignal::unavailable("trendline"))?;

        let trend = if current.close > moving_average {
            Trend::Up
        } else {
            Trend::Down
        };

        Ok(IndicatorSnapshot {
            moving_average,
            support: range.support,
            resistance: range.resistance,
            trend,
            bullish_engulfing: is_bullish_engulfing(prev, current),
            bearish_engulfing: is_bearish_engulfing(prev, current),
            trendline,
            doji: is_doji(current),
            pin_bar: pin_bar(current, prev),
        })
    }

    /// Entry rule over already computed indicators.
    pub fn decide(&self, indicators: &IndicatorSnapshot, current: &Candle, point: f64) -> Signal {
        let close = current.close;
        let sl_offset = self.config.sl_points * point;
        let tp_offset = self.config.tp_points * point;

        if indicators.trend == Trend::Up && indicators.bullish_engulfing && close > indicators.support
        {
            Signal::Buy(EntryLevels {
                reference_price: close,
                stop_loss: close - sl_offset,
                take_profit: close + tp_offset,
            })
        } else if indicators.trend == Trend::Down
            && indicators.bearish_engulfing
            && close < indicators.resistance
        {
            Signal::Sell(EntryLevels {
                reference_price: close,
                stop_loss: close + sl_offset,
                take_profit: close - tp_offset,
            })
        } else {
            Signal::None(NoSignal::NoSetup)
        }
    }

    fn reason(signal: &Signal, indicators: &IndicatorSnapshot) -> String {
        match signal {
            Signal::Buy(levels) => format!(
                "Bullish engulfing above MA ({:.5}) and support ({:.5}) at {:.5}",
                indicators.moving_average, indicators.support, levels.reference_price
            ),
            Signal::Sell(levels) => format!(
                "Bearish engulfing below MA ({:.5}) and resistance ({:.5}) at {:.5}",
                indicators.moving_average, indicators.resistance, levels.reference_price
            ),
            Signal::None(reason) => reason.to_string(),
        }
    }
}

impl Strategy for EngulfingStrategy {
    fn name(&self) -> &str {
        "Engulfing"
    }

    fn description(&self) -> &str {
        "Engulfing candles in the direction of the moving average, filtered by support/resistance"
    }

    fn lookback(&self) -> usize {
        (self.config.ma_kind.warmup(self.config.ma_period) + 1)
            .max(self.config.structure_candles)
            .max(self.config.trendline_candles)
            .max(2)
    }

    fn evaluate(&self, snapshot: &MarketSnapshot) -> Evaluation {
        let point = snapshot.info.point;
        if !(point > 0.0) {
            return Evaluation::abstain(self.name(), NoSignal::unavailable("symbol point"));
        }

        let Some(spread) = snapshot.spread_points() else {
            return Evaluation::abstain(self.name(), NoSignal::unavailable("tick"));
        };
        if spread > self.config.max_spread_points {
            return Evaluation::abstain(
                self.name(),
                NoSignal::SpreadTooWide {
                    spread,
                    max: self.config.max_spread_points,
                },
            );
        }

        let indicators = match self.indicators(snapshot) {
            Ok(indicators) => indicators,
            Err(reason) => return Evaluation::abstain(self.name(), reason),
        };
        let Some(current) = snapshot.current() else {
            return Evaluation::abstain(self.name(), NoSignal::unavailable("candles"));
        };

        let signal = self.decide(&indicators, current, point);

        Evaluation {
            metadata: SignalMetadata {
                strategy_name: self.name().to_string(),
                indicators: indicators.to_map(spread),
                trend: Some(indicators.trend),
                reason: Self::reason(&signal, &indicators),
            },
            signal,
        }
    }
}
