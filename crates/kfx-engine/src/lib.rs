//! Polling engine.

mod engine;
mod report;
mod ticker;

pub use engine::{Engine, EngineConfig, Outcome, SymbolOutcome};
pub use report::{Rejection, SessionReport, RECENT_ORDERS};
pub use ticker::{IntervalTicker, ReplayTicker, TickSource};
