//! Replay of CSV history through the engine into a paper sink.

use kfx_broker::PaperSink;
use kfx_core::traits::Strategy;
use kfx_core::types::{Side, Timeframe};
use kfx_data::{ReplayFeed, ReplaySettings};
use kfx_engine::{Engine, EngineConfig, ReplayTicker};
use kfx_strategy::{EngulfingConfig, EngulfingStrategy, OrderSettings, OrderTemplate};
use rust_decimal_macros::dec;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// 200 flat candles, a bearish candle, then a bullish engulfing candle.
fn history_csv() -> String {
    let mut csv = String::from("time,open,high,low,close,tick_volume\n");
    let mut minute = 0;
    let mut row = |csv: &mut String, o: f64, h: f64, l: f64, c: f64| {
        writeln!(csv, "{},{},{},{},{},10", 1_700_000_000 + minute * 60, o, h, l, c).unwrap();
        minute += 1;
    };
    for _ in 0..200 {
        row(&mut csv, 10.0, 10.3, 9.0, 10.0);
    }
    row(&mut csv, 10.2, 10.3, 9.7, 9.8);
    row(&mut csv, 9.5, 10.6, 9.4, 10.5);
    csv
}

fn data_dir(symbols: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kfx-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    for symbol in symbols {
        std::fs::write(dir.join(format!("{}.csv", symbol)), history_csv()).unwrap();
    }
    dir
}

#[tokio::test]
async fn test_replay_emits_single_buy() {
    let symbols = vec!["XAUUSDm".to_string(), "EURUSDm".to_string()];
    let dir = data_dir(&["XAUUSDm", "EURUSDm"]);

    let settings = ReplaySettings {
        spread_points: 20.0,
        point: 0.001,
        digits: 3,
    };
    let feed = ReplayFeed::from_dir(&dir, &symbols, settings);
    std::fs::remove_dir_all(&dir).ok();
    let feed = Arc::new(feed.unwrap());

    let strategy = EngulfingStrategy::new(EngulfingConfig::default()).unwrap();
    let start = strategy.lookback() - 1;
    let template = OrderTemplate::new(dec!(0.1), OrderSettings::default());
    let sink = Arc::new(PaperSink::default());

    let mut engine = Engine::new(
        EngineConfig {
            symbols,
            timeframe: Timeframe::M1,
        },
        Box::new(strategy),
        template,
        feed.clone(),
        sink.clone(),
    );
    let mut ticks = ReplayTicker::new(feed, start);
    let report = engine.run(&mut ticks, std::future::pending()).await;

    // Only the last candle completes a setup, and it does for both symbols
    assert_eq!(report.cycles, 2);
    assert_eq!(report.buy_signals, 2);
    assert_eq!(report.orders_accepted, 2);
    assert_eq!(report.abstentions["no_setup"], 2);

    let receipts = sink.receipts();
    assert_eq!(receipts.len(), 2);
    assert!(receipts.iter().all(|r| r.side == Side::Buy));
    assert!(receipts.iter().all(|r| r.price == dec!(10.52)));
    assert!(receipts.iter().all(|r| r.volume == dec!(0.1)));
}

#[tokio::test]
async fn test_replay_rejecting_sink_reports_reason() {
    let symbols = vec!["US30m".to_string()];
    let dir = data_dir(&["US30m"]);

    let feed = ReplayFeed::from_dir(
        &dir,
        &symbols,
        ReplaySettings {
            spread_points: 20.0,
            point: 0.001,
            digits: 3,
        },
    );
    std::fs::remove_dir_all(&dir).ok();
    let feed = Arc::new(feed.unwrap());

    let strategy = EngulfingStrategy::new(EngulfingConfig::default()).unwrap();
    let start = strategy.lookback() - 1;
    let mut engine = Engine::new(
        EngineConfig {
            symbols,
            timeframe: Timeframe::M1,
        },
        Box::new(strategy),
        OrderTemplate::new(dec!(0.1), OrderSettings::default()),
        feed.clone(),
        Arc::new(PaperSink::default().rejecting("Market is closed")),
    );
    let mut ticks = ReplayTicker::new(feed, start);
    let report = engine.run(&mut ticks, std::future::pending()).await;

    assert_eq!(report.buy_signals, 1);
    assert_eq!(report.orders_rejected, 1);
    assert_eq!(report.rejections[0].reason, "Market is closed");
    assert!(report.summary().contains("refused: Market is closed"));
}
