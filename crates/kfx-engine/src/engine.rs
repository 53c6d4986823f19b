//! Polling engine.
//!
//! Each cycle visits the configured symbols one after another: gather a
//! snapshot from the market data provider, let the strategy decide, and
//! hand any entry to the order sink. Nothing that goes wrong for one symbol
//! stops the cycle or the session.

use kfx_core::error::BrokerError;
use kfx_core::traits::{MarketData, OrderSink, Strategy};
use kfx_core::types::{
    AccountInfo, Evaluation, MarketSnapshot, NoSignal, OrderReceipt, Side, Signal, Timeframe,
};
use kfx_strategy::OrderTemplate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::report::SessionReport;
use crate::ticker::TickSource;

/// What the engine trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
}

/// What happened to one symbol in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The symbol could not be prepared for evaluation
    Skipped { reason: String },
    /// Evaluated without an entry
    NoOrder,
    /// An entry that never reached the sink
    NotSent { reason: String },
    /// The sink executed the order
    Executed(OrderReceipt),
    /// The sink refused the order
    Rejected { side: Side, reason: String },
}

/// Per-symbol result of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: String,
    /// The evaluator's decision, absent when the symbol was skipped
    pub signal: Option<Signal>,
    pub outcome: Outcome,
}

/// Signal loop over a market data provider and an order sink.
pub struct Engine {
    config: EngineConfig,
    strategy: Box<dyn Strategy>,
    template: OrderTemplate,
    market: Arc<dyn MarketData>,
    sink: Arc<dyn OrderSink>,
    report: SessionReport,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        strategy: Box<dyn Strategy>,
        template: OrderTemplate,
        market: Arc<dyn MarketData>,
        sink: Arc<dyn OrderSink>,
    ) -> Self {
        Self {
            config,
            strategy,
            template,
            market,
            sink,
            report: SessionReport::new(),
        }
    }

    /// Counters so far.
    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Single startup check against the order sink.
    pub async fn check_connection(&self) -> Result<AccountInfo, BrokerError> {
        let account = self.sink.account().await?;
        info!(
            sink = self.sink.name(),
            login = account.login,
            server = %account.server,
            balance = %account.balance,
            currency = %account.currency,
            "Connected"
        );
        Ok(account)
    }

    /// Run cycles until the tick source ends or `shutdown` resolves.
    pub async fn run<F>(&mut self, ticks: &mut dyn TickSource, shutdown: F) -> SessionReport
    where
        F: Future<Output = ()>,
    {
        info!(
            strategy = self.strategy.name(),
            market = self.market.name(),
            sink = self.sink.name(),
            symbols = ?self.config.symbols,
            "Bot started"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Bot stopped by user");
                    break;
                }
                more = ticks.next_tick() => {
                    if !more {
                        info!("No more ticks");
                        break;
                    }
                    self.run_cycle().await;
                }
            }
        }

        self.report.finish();
        self.report.clone()
    }

    /// Evaluate every symbol once.
    pub async fn run_cycle(&mut self) -> Vec<SymbolOutcome> {
        let symbols = self.config.symbols.clone();
        let mut outcomes = Vec::with_capacity(symbols.len());

        for symbol in &symbols {
            let outcome = self.process_symbol(symbol).await;
            self.report.record(&outcome);
            outcomes.push(outcome);
        }

        self.report.cycles += 1;
        debug!(cycle = self.report.cycles, "Cycle complete");
        outcomes
    }

    async fn process_symbol(&self, symbol: &str) -> SymbolOutcome {
        match self.market.select_symbol(symbol).await {
            Ok(true) => {}
            Ok(false) => return skipped(symbol, format!("Failed to select {}", symbol)),
            Err(e) => return skipped(symbol, format!("Failed to select {}: {}", symbol, e)),
        }

        let evaluation = match self.snapshot(symbol).await {
            Ok(snapshot) => self.strategy.evaluate(&snapshot),
            Err(reason) => Evaluation::abstain(self.strategy.name(), reason),
        };
        log_evaluation(symbol, &evaluation);

        let signal = evaluation.signal;
        let outcome = match signal.side() {
            Some(side) => self.place_order(symbol, side, &signal).await,
            None => Outcome::NoOrder,
        };

        SymbolOutcome {
            symbol: symbol.to_string(),
            signal: Some(signal),
            outcome,
        }
    }

    /// Gather everything the strategy needs. Provider failures become a
    /// data-unavailable reason.
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, NoSignal> {
        let info = self.market.symbol_info(symbol).await.map_err(|e| {
            warn!(error = %e, "{}: Failed to get symbol info", symbol);
            NoSignal::unavailable("symbol info")
        })?;

        let tick = self.market.latest_tick(symbol).await.map_err(|e| {
            warn!(error = %e, "{}: Failed to get tick data", symbol);
            NoSignal::unavailable("tick")
        })?;

        let candles = self
            .market
            .recent_candles(symbol, self.config.timeframe, self.strategy.lookback())
            .await
            .map_err(|e| {
                warn!(error = %e, "{}: Failed to fetch candles", symbol);
                NoSignal::unavailable("candles")
            })?;

        Ok(MarketSnapshot::new(info, tick, candles))
    }

    async fn place_order(&self, symbol: &str, side: Side, signal: &Signal) -> Outcome {
        // Price the order off a fresh quote, not the one evaluated
        let tick = match self.market.latest_tick(symbol).await {
            Ok(Some(tick)) => tick,
            Ok(None) => return not_sent(symbol, "Failed to get tick data".to_string()),
            Err(e) => return not_sent(symbol, format!("Failed to get tick data: {}", e)),
        };
        let info = match self.market.symbol_info(symbol).await {
            Ok(info) => info,
            Err(e) => return not_sent(symbol, format!("Failed to get symbol info: {}", e)),
        };

        let request = match self.template.build(signal, &info, &tick) {
            Ok(Some(request)) => request,
            Ok(None) => return Outcome::NoOrder,
            Err(e) => return not_sent(symbol, e.to_string()),
        };

        match self.sink.submit_order(request).await {
            Ok(receipt) => {
                info!(ticket = receipt.ticket, "{}: {} executed at {}", symbol, side, receipt.price);
                Outcome::Executed(receipt)
            }
            Err(BrokerError::OrderRejected(reason)) => {
                warn!("Order send failed for {}: {}", symbol, reason);
                Outcome::Rejected { side, reason }
            }
            Err(e) => {
                warn!("Order send failed for {}: {}", symbol, e);
                Outcome::Rejected {
                    side,
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn skipped(symbol: &str, reason: String) -> SymbolOutcome {
    warn!("{}", reason);
    SymbolOutcome {
        symbol: symbol.to_string(),
        signal: None,
        outcome: Outcome::Skipped { reason },
    }
}

fn not_sent(symbol: &str, reason: String) -> Outcome {
    warn!("{}: {}", symbol, reason);
    Outcome::NotSent { reason }
}

fn log_evaluation(symbol: &str, evaluation: &Evaluation) {
    if let Some(trend) = evaluation.metadata.trend {
        info!("Trend for {}: {}", symbol, trend);
    }

    match &evaluation.signal {
        Signal::Buy(levels) | Signal::Sell(levels) => info!(
            sl = levels.stop_loss,
            tp = levels.take_profit,
            "{}: {}",
            symbol,
            evaluation.metadata.reason
        ),
        Signal::None(NoSignal::DataUnavailable { .. }) => {
            warn!("{}: {}", symbol, evaluation.metadata.reason)
        }
        Signal::None(_) => info!("{}: {}", symbol, evaluation.metadata.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kfx_broker::PaperSink;
    use kfx_core::error::DataError;
    use kfx_core::types::{Candle, OrderRequest, SymbolInfo, Tick};
    use kfx_data::{ReplayFeed, ReplaySettings};
    use kfx_strategy::{EngulfingConfig, EngulfingStrategy, OrderSettings};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::ticker::ReplayTicker;

    const SYMBOL: &str = "XAUUSDm";

    fn strategy_config() -> EngulfingConfig {
        EngulfingConfig {
            ma_period: 3,
            structure_candles: 3,
            trendline_candles: 3,
            ..Default::default()
        }
    }

    /// Flat candles ending in a bullish engulfing pair.
    fn bullish_history() -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..6)
            .map(|i| Candle::new(i * 60_000, 10.0, 10.3, 9.0, 10.0))
            .collect();
        candles.push(Candle::new(6 * 60_000, 10.2, 10.3, 9.7, 9.8));
        candles.push(Candle::new(7 * 60_000, 9.5, 10.6, 9.4, 10.5));
        candles
    }

    fn replay_feed() -> Arc<ReplayFeed> {
        let mut feed = ReplayFeed::new(ReplaySettings {
            spread_points: 20.0,
            point: 0.001,
            digits: 3,
        });
        feed.insert(SYMBOL, bullish_history());
        Arc::new(feed)
    }

    fn engine(market: Arc<dyn MarketData>, sink: Arc<dyn OrderSink>) -> Engine {
        Engine::new(
            EngineConfig {
                symbols: vec![SYMBOL.to_string()],
                timeframe: Timeframe::M1,
            },
            Box::new(EngulfingStrategy::new(strategy_config()).unwrap()),
            OrderTemplate::new(dec!(0.1), OrderSettings::default()),
            market,
            sink,
        )
    }

    /// Provider whose every call fails.
    struct BrokenMarket;

    #[async_trait]
    impl MarketData for BrokenMarket {
        async fn symbol_info(&self, _symbol: &str) -> Result<SymbolInfo, DataError> {
            Err(DataError::ConnectionError("terminal offline".into()))
        }

        async fn latest_tick(&self, _symbol: &str) -> Result<Option<Tick>, DataError> {
            Err(DataError::ConnectionError("terminal offline".into()))
        }

        async fn recent_candles(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _count: usize,
        ) -> Result<Vec<Candle>, DataError> {
            Err(DataError::ConnectionError("terminal offline".into()))
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    /// Sink that refuses and counts attempts.
    struct RefusingSink {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl OrderSink for RefusingSink {
        async fn account(&self) -> Result<AccountInfo, BrokerError> {
            Err(BrokerError::Connection("unused".into()))
        }

        async fn submit_order(&self, _request: OrderRequest) -> Result<OrderReceipt, BrokerError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(BrokerError::OrderRejected("Invalid stops".into()))
        }

        fn name(&self) -> &str {
            "Refusing"
        }
    }

    #[tokio::test]
    async fn test_replay_places_order() {
        let feed = replay_feed();
        let sink = Arc::new(PaperSink::default());
        let mut engine = engine(feed.clone(), sink.clone());

        let mut ticks = ReplayTicker::new(feed, 2);
        let report = engine.run(&mut ticks, std::future::pending()).await;

        assert_eq!(report.cycles, 6);
        assert_eq!(report.buy_signals, 1);
        assert_eq!(report.orders_accepted, 1);
        assert_eq!(report.abstentions_total(), 5);

        let receipts = sink.receipts();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].side, Side::Buy);
        assert_eq!(receipts[0].price, dec!(10.52));
        assert!(report.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_order_levels_from_signal() {
        let feed = replay_feed();
        feed.seek(7);
        let mut engine = engine(feed, Arc::new(PaperSink::default()));

        let outcomes = engine.run_cycle().await;
        assert_eq!(outcomes.len(), 1);
        let Outcome::Executed(receipt) = &outcomes[0].outcome else {
            panic!("expected execution, got {:?}", outcomes[0].outcome);
        };
        assert_eq!(receipt.symbol, SYMBOL);
        assert_eq!(receipt.comment, "KFX Bot Entry");
        assert!(matches!(outcomes[0].signal, Some(Signal::Buy(_))));
    }

    #[tokio::test]
    async fn test_rejection_counted_not_retried() {
        let feed = replay_feed();
        feed.seek(7);
        let sink = Arc::new(RefusingSink {
            attempts: AtomicUsize::new(0),
        });
        let mut engine = engine(feed, sink.clone());

        let outcomes = engine.run_cycle().await;

        assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcomes[0].outcome,
            Outcome::Rejected {
                side: Side::Buy,
                reason: "Invalid stops".to_string()
            }
        );
        assert_eq!(engine.report().orders_rejected, 1);
        assert_eq!(engine.report().orders_accepted, 0);
    }

    #[tokio::test]
    async fn test_provider_errors_degrade_to_no_signal() {
        let sink = Arc::new(PaperSink::default());
        let mut engine = engine(Arc::new(BrokenMarket), sink.clone());

        let outcomes = engine.run_cycle().await;

        assert_eq!(outcomes[0].outcome, Outcome::NoOrder);
        assert_eq!(
            outcomes[0].signal,
            Some(Signal::None(NoSignal::unavailable("symbol info")))
        );
        assert_eq!(engine.report().abstentions["data_unavailable"], 1);
        assert!(sink.receipts().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_skipped() {
        let feed = replay_feed();
        let mut engine = Engine::new(
            EngineConfig {
                symbols: vec!["NOPE".to_string(), SYMBOL.to_string()],
                timeframe: Timeframe::M1,
            },
            Box::new(EngulfingStrategy::new(strategy_config()).unwrap()),
            OrderTemplate::new(dec!(0.1), OrderSettings::default()),
            feed,
            Arc::new(PaperSink::default()),
        );

        let outcomes = engine.run_cycle().await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0].outcome, Outcome::Skipped { .. }));
        assert!(outcomes[0].signal.is_none());
        assert!(outcomes[1].signal.is_some());
        assert_eq!(engine.report().skipped, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_session() {
        let feed = replay_feed();
        let mut engine = engine(feed.clone(), Arc::new(PaperSink::default()));
        let mut ticks = ReplayTicker::new(feed, 0);

        let report = engine.run(&mut ticks, std::future::ready(())).await;
        assert_eq!(report.cycles, 0);
    }

    #[tokio::test]
    async fn test_check_connection() {
        let engine = engine(replay_feed(), Arc::new(PaperSink::default()));
        let account = engine.check_connection().await.unwrap();
        assert_eq!(account.server, "paper");
    }
}
