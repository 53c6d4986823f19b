//! Tick sources that pace the engine.

use async_trait::async_trait;
use kfx_data::ReplayFeed;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

/// Decides when the next evaluation cycle starts.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next cycle. Returns `false` when the session is over.
    async fn next_tick(&mut self) -> bool;
}

/// Fires on a fixed wall-clock interval, starting immediately.
///
/// A cycle that overruns delays the following ticks instead of bursting.
pub struct IntervalTicker {
    interval: Interval,
    limit: Option<u64>,
    fired: u64,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            limit: None,
            fired: 0,
        }
    }

    /// Stop after `cycles` ticks.
    pub fn with_limit(mut self, cycles: u64) -> Self {
        self.limit = Some(cycles);
        self
    }
}

#[async_trait]
impl TickSource for IntervalTicker {
    async fn next_tick(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.fired >= limit) {
            return false;
        }
        self.interval.tick().await;
        self.fired += 1;
        true
    }
}

/// Steps a [`ReplayFeed`] cursor one candle per cycle.
pub struct ReplayTicker {
    feed: Arc<ReplayFeed>,
    start: usize,
    started: bool,
}

impl ReplayTicker {
    /// Start at candle `start`, typically the first index with a full
    /// lookback window behind it.
    pub fn new(feed: Arc<ReplayFeed>, start: usize) -> Self {
        Self {
            feed,
            start,
            started: false,
        }
    }
}

#[async_trait]
impl TickSource for ReplayTicker {
    async fn next_tick(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return self.feed.seek(self.start);
        }
        self.feed.advance()
    }
}
