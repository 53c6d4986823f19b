//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{Evaluation, MarketSnapshot};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A strategy turns one market snapshot into one evaluation. Evaluation
/// takes `&self`: strategies hold only their immutable configuration, so the
/// same snapshot always yields the same signal.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Number of candles the snapshot should contain for every window to be
    /// complete.
    fn lookback(&self) -> usize;

    /// Evaluate a snapshot.
    ///
    /// Missing or short inputs produce `Signal::None`, never an error.
    fn evaluate(&self, snapshot: &MarketSnapshot) -> Evaluation;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
