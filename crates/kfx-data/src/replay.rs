//! Replay of recorded candles as a market data provider.

use async_trait::async_trait;
use kfx_core::error::DataError;
use kfx_core::traits::MarketData;
use kfx_core::types::{Candle, SymbolInfo, Tick, Timeframe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::csv_source::load_candles;

/// Quote properties used when synthesizing ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Spread added to the close to form the ask, in points
    pub spread_points: f64,
    /// Price increment
    pub point: f64,
    /// Quote precision
    pub digits: u32,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            spread_points: 20.0,
            point: 0.00001,
            digits: 5,
        }
    }
}

/// Recorded candles served one step at a time.
///
/// Every symbol shares one timeline: the sorted union of all candle
/// timestamps. The cursor indexes that timeline, so each step shows every
/// symbol at the same moment. Candles after the current time are invisible,
/// and a symbol with no candle at exactly the current time has no tick.
pub struct ReplayFeed {
    candles: HashMap<String, Vec<Candle>>,
    timeline: Vec<i64>,
    overrides: HashMap<String, SymbolInfo>,
    settings: ReplaySettings,
    cursor: AtomicUsize,
}

impl ReplayFeed {
    /// Create an empty feed.
    pub fn new(settings: ReplaySettings) -> Self {
        Self {
            candles: HashMap::new(),
            timeline: Vec::new(),
            overrides: HashMap::new(),
            settings,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Load `{SYMBOL}.csv` for every symbol from `dir`.
    pub fn from_dir(
        dir: impl AsRef<Path>,
        symbols: &[String],
        settings: ReplaySettings,
    ) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let mut feed = Self::new(settings);

        for symbol in symbols {
            let path = dir.join(format!("{}.csv", symbol));
            if !path.is_file() {
                return Err(DataError::SymbolNotFound(format!(
                    "{} (no {})",
                    symbol,
                    path.display()
                )));
            }
            let candles = load_candles(&path)?;
            info!(symbol = %symbol, candles = candles.len(), "Loaded replay data");
            feed.insert(symbol.clone(), candles);
        }

        Ok(feed)
    }

    /// Add or replace a symbol's history.
    pub fn insert(&mut self, symbol: impl Into<String>, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.timestamp);
        self.candles.insert(symbol.into(), candles);

        let mut timeline: Vec<i64> = self
            .candles
            .values()
            .flatten()
            .map(|c| c.timestamp)
            .collect();
        timeline.sort_unstable();
        timeline.dedup();
        self.timeline = timeline;
    }

    /// Use specific quote properties for one symbol.
    pub fn with_symbol_info(mut self, info: SymbolInfo) -> Self {
        self.overrides.insert(info.symbol.clone(), info);
        self
    }

    /// Number of distinct timestamps across all symbols.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the current step on the timeline.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Timestamp of the current step, `None` past the end.
    pub fn current_time(&self) -> Option<i64> {
        self.timeline.get(self.cursor()).copied()
    }

    /// Move the cursor to `index`. Returns `false` past the end of the data.
    pub fn seek(&self, index: usize) -> bool {
        self.cursor.store(index, Ordering::SeqCst);
        index < self.len()
    }

    /// Step the cursor forward. Returns `false` once every history is exhausted.
    pub fn advance(&self) -> bool {
        let next = self.cursor.fetch_add(1, Ordering::SeqCst) + 1;
        next < self.len()
    }

    fn history(&self, symbol: &str) -> Result<&[Candle], DataError> {
        self.candles
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }

    /// A symbol's candles up to and including `now`.
    fn visible<'a>(history: &'a [Candle], now: i64) -> &'a [Candle] {
        let end = history.partition_point(|c| c.timestamp <= now);
        &history[..end]
    }

    fn info_for(&self, symbol: &str) -> SymbolInfo {
        self.overrides.get(symbol).cloned().unwrap_or_else(|| {
            SymbolInfo::new(symbol, self.settings.point, self.settings.digits)
        })
    }
}

#[async_trait]
impl MarketData for ReplayFeed {
    async fn select_symbol(&self, symbol: &str) -> Result<bool, DataError> {
        Ok(self.candles.contains_key(symbol))
    }

    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, DataError> {
        self.history(symbol)?;
        Ok(self.info_for(symbol))
    }

    async fn latest_tick(&self, symbol: &str) -> Result<Option<Tick>, DataError> {
        let history = self.history(symbol)?;
        let Some(now) = self.current_time() else {
            return Ok(None);
        };
        let Some(candle) = Self::visible(history, now)
            .last()
            .filter(|c| c.timestamp == now)
        else {
            return Ok(None);
        };
        let info = self.info_for(symbol);

        Ok(Some(Tick {
            symbol: symbol.to_string(),
            bid: candle.close,
            ask: candle.close + self.settings.spread_points * info.point,
            timestamp: candle.timestamp,
        }))
    }

    /// Candles up to and including the current time. The timeframe is
    /// whatever the recording was made at.
    async fn recent_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let history = self.history(symbol)?;
        let now = self.current_time().ok_or(DataError::NoDataAvailable)?;
        let visible = Self::visible(history, now);
        if visible.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        let start = visible.len().saturating_sub(count);
        Ok(visible[start..].to_vec())
    }

    fn name(&self) -> &str {
        "Replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 1.0 + i as f64 * 0.01;
                Candle::new(i as i64 * 60_000, close, close + 0.01, close - 0.01, close)
            })
            .collect()
    }

    fn feed() -> ReplayFeed {
        let mut feed = ReplayFeed::new(ReplaySettings::default());
        feed.insert("EURUSDm", candles(5));
        feed
    }

    #[tokio::test]
    async fn test_candles_end_at_cursor() {
        let feed = feed();
        assert!(feed.seek(2));

        let window = feed
            .recent_candles("EURUSDm", Timeframe::M1, 10)
            .await
            .unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.last().unwrap().timestamp, 120_000);

        let window = feed
            .recent_candles("EURUSDm", Timeframe::M1, 2)
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, 60_000);
    }

    #[tokio::test]
    async fn test_tick_synthesized_from_close() {
        let feed = feed();
        feed.seek(1);

        let tick = feed.latest_tick("EURUSDm").await.unwrap().unwrap();
        assert!((tick.bid - 1.01).abs() < 1e-12);
        assert!((tick.spread_points(0.00001) - 20.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_symbol_override() {
        let feed = feed().with_symbol_info(SymbolInfo::new("EURUSDm", 0.001, 3));
        let info = feed.symbol_info("EURUSDm").await.unwrap();
        assert_eq!(info.digits, 3);

        let tick = feed.latest_tick("EURUSDm").await.unwrap().unwrap();
        assert!((tick.spread() - 0.02).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let feed = feed();
        assert!(!feed.select_symbol("GBPUSDm").await.unwrap());
        assert!(matches!(
            feed.symbol_info("GBPUSDm").await,
            Err(DataError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let feed = feed();
        feed.seek(3);
        assert!(feed.advance());
        assert!(!feed.advance());

        assert!(feed.latest_tick("EURUSDm").await.unwrap().is_none());
        assert!(matches!(
            feed.recent_candles("EURUSDm", Timeframe::M1, 3).await,
            Err(DataError::NoDataAvailable)
        ));
    }

    #[tokio::test]
    async fn test_symbols_with_different_ranges_share_the_clock() {
        let mut feed = feed();
        // Starts two minutes after EURUSDm and runs two minutes longer
        let later: Vec<Candle> = (2..7)
            .map(|i| Candle::new(i * 60_000, 2.0, 2.1, 1.9, 2.0 + i as f64 * 0.01))
            .collect();
        feed.insert("GBPUSDm", later);
        assert_eq!(feed.len(), 7);

        feed.seek(0);
        assert_eq!(feed.current_time(), Some(0));
        assert!(feed.latest_tick("GBPUSDm").await.unwrap().is_none());
        assert!(matches!(
            feed.recent_candles("GBPUSDm", Timeframe::M1, 5).await,
            Err(DataError::NoDataAvailable)
        ));

        feed.seek(3);
        let eur = feed.recent_candles("EURUSDm", Timeframe::M1, 10).await.unwrap();
        let gbp = feed.recent_candles("GBPUSDm", Timeframe::M1, 10).await.unwrap();
        assert_eq!(eur.last().unwrap().timestamp, 180_000);
        assert_eq!(gbp.last().unwrap().timestamp, 180_000);
        assert_eq!(gbp.len(), 2);
        let tick = feed.latest_tick("GBPUSDm").await.unwrap().unwrap();
        assert_eq!(tick.timestamp, 180_000);

        // EURUSDm has run out: no quote, but its history stays readable
        feed.seek(6);
        assert!(feed.latest_tick("EURUSDm").await.unwrap().is_none());
        let eur = feed.recent_candles("EURUSDm", Timeframe::M1, 2).await.unwrap();
        assert_eq!(eur.last().unwrap().timestamp, 240_000);
        assert!(feed.latest_tick("GBPUSDm").await.unwrap().is_some());
        assert!(!feed.advance());
    }

    #[test]
    fn test_from_dir_requires_every_symbol() {
        let dir = std::env::temp_dir().join(format!("kfx-replay-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("EURUSDm.csv"),
            "time,open,high,low,close\n2024-01-15 10:00:00,1.0,1.2,0.9,1.1\n",
        )
        .unwrap();

        let ok = ReplayFeed::from_dir(&dir, &["EURUSDm".to_string()], ReplaySettings::default());
        let missing = ReplayFeed::from_dir(
            &dir,
            &["EURUSDm".to_string(), "US30m".to_string()],
            ReplaySettings::default(),
        );
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(ok.unwrap().len(), 1);
        assert!(matches!(missing, Err(DataError::SymbolNotFound(_))));
    }
}
