//! Trading Bot Orchestrator
//!
//! Owns the position ledger and drives one [`run_cycle`] per poll interval:
//! - Fetches the hot-token batch and current prices of held tokens
//! - Applies exit and entry decisions through the trade executor
//! - Persists the ledger after cycles that traded
//! - Stops cooperatively between cycles via [`StopHandle`]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use super::cycle::{run_cycle, CycleSummary, MarketView};
use super::error::TradingError;
use crate::domain::PositionLedger;
use crate::ports::{Clock, MarketDataSource, TradeExecutor};
use crate::strategy::DecisionEngine;

/// Loop parameters
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub poll_interval: Duration,
    /// Size of the hot-token batch requested each cycle
    pub hot_token_limit: usize,
    /// Where to persist the ledger; None disables persistence
    pub ledger_path: Option<PathBuf>,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            hot_token_limit: 20,
            ledger_path: None,
            max_cycles: None,
        }
    }
}

/// Cooperative stop signal. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. The running cycle finishes first.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` or until stopped. Returns true if stopped.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.notify.notified() => {}
        }
        self.is_stopped()
    }
}

pub struct TradingBot {
    engine: DecisionEngine,
    market: Arc<dyn MarketDataSource>,
    executor: Arc<dyn TradeExecutor>,
    clock: Arc<dyn Clock>,
    settings: BotSettings,
    ledger: PositionLedger,
    stop: StopHandle,
    cycles: u64,
    last_summary: Option<CycleSummary>,
    restored: bool,
}

impl TradingBot {
    pub fn new(
        engine: DecisionEngine,
        market: Arc<dyn MarketDataSource>,
        executor: Arc<dyn TradeExecutor>,
        clock: Arc<dyn Clock>,
        settings: BotSettings,
    ) -> Self {
        Self {
            engine,
            market,
            executor,
            clock,
            settings,
            ledger: PositionLedger::new(),
            stop: StopHandle::new(),
            cycles: 0,
            last_summary: None,
            restored: false,
        }
    }

    /// Start from an existing ledger. Skips restoring from disk in [`TradingBot::run`].
    pub fn with_ledger(mut self, ledger: PositionLedger) -> Self {
        self.ledger = ledger;
        self.restored = true;
        self
    }

    /// Handle that stops [`TradingBot::run`] from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_summary(&self) -> Option<&CycleSummary> {
        self.last_summary.as_ref()
    }

    /// Load the persisted ledger if one exists. Returns the number of restored positions.
    ///
    /// [`TradingBot::run`] calls this unless it has already been done.
    pub fn restore_ledger(&mut self) -> Result<usize, TradingError> {
        self.restored = true;
        let Some(path) = &self.settings.ledger_path else {
            return Ok(0);
        };

        match PositionLedger::load(path).map_err(|e| TradingError::Persistence(e.to_string()))? {
            Some(ledger) => {
                for position in ledger.positions() {
                    tracing::info!(
                        "Recovered position: {} ({}) entered at ${} on {}",
                        position.symbol,
                        position.token_id,
                        position.entry_price,
                        position.entry_timestamp
                    );
                }
                self.ledger = ledger;
                Ok(self.ledger.len())
            }
            None => Ok(0),
        }
    }

    /// Save the ledger if persistence is enabled
    pub fn persist_ledger(&self) -> Result<(), TradingError> {
        if let Some(path) = &self.settings.ledger_path {
            self.ledger
                .save(path, self.clock.now())
                .map_err(|e| TradingError::Persistence(e.to_string()))?;
        }
        Ok(())
    }

    /// Run the main trading loop until stopped or the cycle limit is reached
    pub async fn run(&mut self) -> Result<(), TradingError> {
        tracing::info!(
            "Starting trading bot - poll interval: {}s, max positions: {}",
            self.settings.poll_interval.as_secs(),
            self.engine.config().max_positions
        );

        if !self.restored {
            let restored = self.restore_ledger()?;
            if restored > 0 {
                tracing::info!("Restored {} open positions", restored);
            }
        }

        while !self.stop.is_stopped() {
            if let Err(e) = self.tick().await {
                tracing::error!("Tick error: {}", e);
                // Continue running despite errors
            }

            if let Some(max) = self.settings.max_cycles {
                if self.cycles >= max {
                    tracing::info!("Reached cycle limit of {}", max);
                    break;
                }
            }

            if self.stop.sleep(self.settings.poll_interval).await {
                break;
            }
        }

        tracing::info!(
            "Trading bot stopped after {} cycles with {} open positions",
            self.cycles,
            self.ledger.len()
        );
        Ok(())
    }

    /// Execute one trading cycle
    pub async fn tick(&mut self) -> Result<CycleSummary, TradingError> {
        let now = self.clock.now();
        let market = self.market_view().await;

        let ledger = std::mem::take(&mut self.ledger);
        let result = run_cycle(&self.engine, self.executor.as_ref(), &market, ledger, now).await;
        self.ledger = result.ledger;
        self.cycles += 1;

        for failure in &result.failures {
            tracing::warn!("Cycle {} failure: {}", self.cycles, failure);
        }
        tracing::info!("Cycle {} complete: {}", self.cycles, result.summary);

        let summary = result.summary;
        self.last_summary = Some(summary.clone());

        if summary.traded() {
            self.persist_ledger()?;
        }

        Ok(summary)
    }

    /// Gather the hot-token batch plus fresh prices for every held token
    async fn market_view(&self) -> MarketView {
        let mut view = match self.market.fetch_hot_tokens(self.settings.hot_token_limit).await {
            Ok(tokens) => {
                tracing::debug!("Fetched {} hot tokens", tokens.len());
                MarketView::new(tokens)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch hot tokens: {}", e);
                MarketView::unavailable(e)
            }
        };

        for token_id in self.ledger.token_ids() {
            match self.market.fetch_token(&token_id).await {
                Ok(token) => {
                    view = view.with_price(token_id, token.price_usd);
                }
                Err(e) => {
                    // Batch price, if any, stays in place
                    tracing::warn!("Failed to fetch price for {}: {}", token_id, e);
                }
            }
        }

        view
    }
}
