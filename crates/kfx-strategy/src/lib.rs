//! Signal evaluation.
//!
//! [`EngulfingStrategy`] decides BUY, SELL or NONE from one market snapshot;
//! [`OrderTemplate`] turns an entry signal into an order request.

mod engulfing;
mod order;

pub use engulfing::{EngulfingConfig, EngulfingStrategy, IndicatorSnapshot};
pub use kfx_core::types::Trend;
pub use order::{OrderSettings, OrderTemplate};
