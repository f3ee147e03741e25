//! Trading Cycle Integration Tests
//!
//! Verifies the engine, cycle and orchestration loop working together:
//! 1. Full replay of the demo frames through the paper executor
//! 2. Executor failures leave the ledger untouched
//! 3. Buy followed by sell restores the ledger
//! 4. Cooperative stop from another task
//!
//! All tests are deterministic (no real network calls) and use mock data.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::tempdir;

use odin_trader::adapters::{PaperConfig, PaperExecutor, ReplayMarketData};
use odin_trader::application::{run_cycle, BotSettings, MarketView, TradingBot, TradingError};
use odin_trader::config::load_config;
use odin_trader::domain::{Action, ExitReason, PositionLedger, TokenSnapshot, LEDGER_FILE};
use odin_trader::ports::mocks::{MockMarketData, RecordingExecutor, TradeSide};
use odin_trader::ports::{Clock, ManualClock, MarketDataError};
use odin_trader::strategy::{DecisionEngine, TradingConfig};

// ============================================================================
// Test Fixtures
// ============================================================================

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn start_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap())
}

fn engine() -> DecisionEngine {
    DecisionEngine::new(TradingConfig::default()).unwrap()
}

fn token(id: &str, price: Decimal, volume: Decimal) -> TokenSnapshot {
    TokenSnapshot {
        id: id.to_string(),
        symbol: id.to_uppercase(),
        price_usd: price,
        market_cap_usd: dec!(45000),
        volume_usd_24h: volume,
        bonding_curve_progress: dec!(35),
        is_graduated: false,
        change_24h: dec!(2.5),
    }
}

fn fast_settings(max_cycles: u64) -> BotSettings {
    BotSettings {
        poll_interval: Duration::from_millis(1),
        max_cycles: Some(max_cycles),
        ..BotSettings::default()
    }
}

// ============================================================================
// Replay through paper execution
// ============================================================================

#[tokio::test]
async fn test_demo_replay_with_paper_executor() {
    let dir = tempdir().unwrap();
    let ledger_path = dir.path().join(LEDGER_FILE);

    let config = load_config(manifest_path("config/paper.toml")).unwrap();
    let replay = ReplayMarketData::from_path(&manifest_path("demos/replay.json")).unwrap();
    let frames = replay.len() as u64;
    assert_eq!(frames, 6);

    let executor = Arc::new(PaperExecutor::new(config.paper.clone()).unwrap());
    let settings = BotSettings {
        ledger_path: Some(ledger_path.clone()),
        ..fast_settings(frames)
    };

    let mut bot = TradingBot::new(
        DecisionEngine::new(config.trading.clone()).unwrap(),
        Arc::new(replay),
        executor.clone(),
        Arc::new(start_clock()),
        settings,
    );
    bot.run().await.unwrap();

    assert_eq!(bot.cycles(), 6);

    // RUNE taken twice, HAMR stopped out, SKOL and VALK still open
    assert_eq!(bot.ledger().token_ids(), vec!["2k1a", "2k1f", "2k1g"]);
    assert_eq!(
        bot.ledger().get("2k1a").unwrap().entry_price,
        dec!(0.00121)
    );

    let stats = executor.stats().await;
    assert_eq!(stats.buy_count, 5);
    assert_eq!(stats.sell_count, 2);
    assert_eq!(stats.losing_trades, 1);

    // Graduated, oversized and falling tokens are never bought
    for excluded in ["2k1c", "2k1d", "2k1e"] {
        assert!(executor.holding(excluded).await.is_none());
    }

    let saved = PositionLedger::load(&ledger_path).unwrap().unwrap();
    assert_eq!(&saved, bot.ledger());
}

#[tokio::test]
async fn test_restored_positions_are_managed() {
    let dir = tempdir().unwrap();
    let ledger_path = dir.path().join(LEDGER_FILE);
    let clock = start_clock();

    // First run opens a position and persists it
    let market = MockMarketData::new().with_batch(vec![token("alpha", dec!(0.01), dec!(5000))]);
    let mut first = TradingBot::new(
        engine(),
        Arc::new(market),
        Arc::new(RecordingExecutor::default()),
        Arc::new(clock.clone()),
        BotSettings {
            ledger_path: Some(ledger_path.clone()),
            ..fast_settings(1)
        },
    );
    first.run().await.unwrap();
    assert!(first.ledger().contains("alpha"));

    // Second run three hours later closes it on time
    clock.advance(chrono::Duration::hours(3));
    let market = MockMarketData::new()
        .with_batch(vec![])
        .with_token(token("alpha", dec!(0.0102), dec!(5000)));
    let executor = RecordingExecutor::default();
    let mut second = TradingBot::new(
        engine(),
        Arc::new(market),
        Arc::new(executor.clone()),
        Arc::new(clock.clone()),
        BotSettings {
            ledger_path: Some(ledger_path.clone()),
            ..fast_settings(1)
        },
    );
    second.run().await.unwrap();

    assert!(second.ledger().is_empty());
    assert_eq!(executor.count(TradeSide::Sell), 1);
    assert!(PositionLedger::load(&ledger_path).unwrap().unwrap().is_empty());
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn test_failed_buy_is_retried_next_cycle_only() {
    let market = MockMarketData::new()
        .with_batch(vec![token("alpha", dec!(0.01), dec!(9000))])
        .with_batch(vec![token("alpha", dec!(0.01), dec!(9000))]);
    let executor = RecordingExecutor::default().with_failing_buy("alpha");

    let mut bot = TradingBot::new(
        engine(),
        Arc::new(market),
        Arc::new(executor.clone()),
        Arc::new(start_clock()),
        fast_settings(2),
    );
    bot.run().await.unwrap();

    // One attempt per cycle, never more
    assert_eq!(executor.count(TradeSide::Buy), 2);
    assert!(bot.ledger().is_empty());
    assert_eq!(bot.last_summary().unwrap().failures, 1);
}

#[tokio::test]
async fn test_failed_sell_keeps_position_for_next_cycle() {
    let now = start_clock().now();
    let executor = RecordingExecutor::default().with_failing_sell("alpha");

    let bought = run_cycle(
        &engine(),
        &executor,
        &MarketView::new(vec![token("alpha", dec!(1), dec!(9000))]),
        PositionLedger::new(),
        now,
    )
    .await;
    assert_eq!(bought.summary.buys, 1);

    let market = MarketView::unavailable(MarketDataError::Network("timeout".to_string()))
        .with_price("alpha", dec!(0.5));
    let result = run_cycle(&engine(), &executor, &market, bought.ledger.clone(), now).await;

    assert_eq!(result.ledger, bought.ledger);
    assert_eq!(result.summary.failures, 2);
    assert!(result
        .failures
        .iter()
        .any(|f| matches!(f, TradingError::ExecutionFailed { token_id, .. } if token_id == "alpha")));
    assert!(result
        .failures
        .iter()
        .any(|f| matches!(f, TradingError::DataUnavailable(_))));
}

// ============================================================================
// Ledger properties
// ============================================================================

#[tokio::test]
async fn test_buy_then_sell_restores_ledger() {
    let executor = RecordingExecutor::new(BigUint::from(123_456u32));
    let clock = start_clock();

    let mut initial = PositionLedger::new();
    initial
        .open(
            odin_trader::domain::Position::new(
                "keep",
                "KEEP",
                dec!(1),
                BigUint::from(10u32),
                clock.now(),
            )
            .unwrap(),
        )
        .unwrap();

    let bought = run_cycle(
        &engine(),
        &executor,
        &MarketView::new(vec![token("flip", dec!(2), dec!(7000))]).with_price("keep", dec!(1)),
        initial.clone(),
        clock.now(),
    )
    .await;
    assert_eq!(bought.ledger.len(), 2);

    clock.advance(chrono::Duration::minutes(1));
    let sold = run_cycle(
        &engine(),
        &executor,
        &MarketView::unavailable(MarketDataError::Exhausted)
            .with_price("keep", dec!(1))
            .with_price("flip", dec!(2.4)),
        bought.ledger,
        clock.now(),
    )
    .await;

    assert_eq!(sold.ledger, initial);
    let sell = sold.actions.iter().find(|a| a.is_sell()).unwrap();
    assert!(matches!(sell.exit_reason(), Some(ExitReason::ProfitTarget { .. })));
    match sell {
        Action::Sell { position, .. } => assert_eq!(position.amount, BigUint::from(123_456u32)),
        other => panic!("expected sell, got {:?}", other),
    }
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_stop_from_another_task() {
    let market = MockMarketData::new();
    for _ in 0..100 {
        market.push_batch(vec![]);
    }

    let mut bot = TradingBot::new(
        engine(),
        Arc::new(market),
        Arc::new(RecordingExecutor::default()),
        Arc::new(start_clock()),
        BotSettings {
            poll_interval: Duration::from_millis(20),
            ..BotSettings::default()
        },
    );
    let stop = bot.stop_handle();

    let handle = tokio::spawn(async move {
        bot.run().await.unwrap();
        bot.cycles()
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop.stop();

    let cycles = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(cycles >= 1);
    assert!(cycles < 100);
}

#[test]
fn test_paper_config_defaults_match_demo_config() {
    let config = load_config(manifest_path("config/paper.toml")).unwrap();
    assert_eq!(config.paper, PaperConfig::default());
    assert_eq!(config.trading, TradingConfig::default());
}
