//! Moving average indicators.

use kfx_core::traits::Indicator;
use serde::{Deserialize, Serialize};

/// Closes of history, per period, an EMA needs before its seed has decayed.
const EMA_WARMUP_PERIODS: usize = 4;

/// Which average to use as the trend threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAverageKind {
    /// Arithmetic mean of the window
    #[default]
    Sma,
    /// Exponential average seeded with the SMA
    Ema,
}

impl MovingAverageKind {
    /// Build the indicator for the given period.
    pub fn build(self, period: usize) -> Box<dyn Indicator<Output = f64>> {
        match self {
            MovingAverageKind::Sma => Box::new(Sma::new(period)),
            MovingAverageKind::Ema => Box::new(Ema::new(period)),
        }
    }

    /// Closes to feed the average so its latest value is settled.
    ///
    /// An SMA needs exactly one window. An EMA seeded with the SMA of its
    /// first window keeps most of that seed for about a period, so it gets
    /// several periods of history.
    pub fn warmup(self, period: usize) -> usize {
        match self {
            MovingAverageKind::Sma => period,
            MovingAverageKind::Ema => period * EMA_WARMUP_PERIODS,
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        let period_f64 = self.period as f64;

        let mut sum: f64 = data[..self.period].iter().sum();
        result.push(sum / period_f64);

        // Sliding window
        for i in self.period..data.len() {
            sum = sum - data[i - self.period] + data[i];
            result.push(sum / period_f64);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }

    /// Mean of the newest `period` values, summed directly so long inputs
    /// don't accumulate sliding-window drift.
    fn latest(&self, data: &[f64]) -> Option<f64> {
        if data.len() < self.period {
            return None;
        }
        let window = &data[data.len() - self.period..];
        Some(window.iter().sum::<f64>() / self.period as f64)
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let mut result = Vec::with_capacity(data.len() - self.period + 1);

        // Initialize with SMA
        let initial_sma: f64 = data[..self.period].iter().sum::<f64>() / self.period as f64;
        result.push(initial_sma);

        let mut ema = initial_sma;
        let one_minus_mult = 1.0 - self.multiplier;

        for &price in &data[self.period..] {
            ema = price * self.multiplier + ema * one_minus_mult;
            result.push(ema);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
