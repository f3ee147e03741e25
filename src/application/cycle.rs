//! One Trading Cycle
//!
//! `run_cycle` evaluates every open position for exit, then looks for a new
//! entry if there is room. Trades go through the injected executor; the
//! ledger only changes when the executor reports success. Nothing is retried
//! within a cycle.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use num_traits::Zero;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::TradingError;
use crate::domain::{Action, BuyOrder, Position, PositionLedger, TokenSnapshot};
use crate::ports::{ExecutionError, MarketDataError, TradeExecutor, TradeRequest};
use crate::strategy::DecisionEngine;

/// Market inputs for one cycle
#[derive(Debug, Clone)]
pub struct MarketView {
    /// Hot-token batch, or the error that prevented fetching it
    pub hot_tokens: Result<Vec<TokenSnapshot>, MarketDataError>,
    /// Current USD price per token id
    pub prices: HashMap<String, Decimal>,
}

impl MarketView {
    /// View over a fetched batch; prices are taken from the batch
    pub fn new(hot_tokens: Vec<TokenSnapshot>) -> Self {
        let prices = hot_tokens
            .iter()
            .map(|t| (t.id.clone(), t.price_usd))
            .collect();
        Self {
            hot_tokens: Ok(hot_tokens),
            prices,
        }
    }

    /// View for a cycle where the batch could not be fetched
    pub fn unavailable(error: MarketDataError) -> Self {
        Self {
            hot_tokens: Err(error),
            prices: HashMap::new(),
        }
    }

    /// Set or override the price for a token
    pub fn with_price(mut self, token_id: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(token_id.into(), price);
        self
    }

    pub fn price_of(&self, token_id: &str) -> Option<Decimal> {
        self.prices.get(token_id).copied()
    }
}

/// Counts for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
    pub failures: usize,
    /// Open positions skipped because no price was available
    pub unpriced: usize,
    /// Open positions after the cycle
    pub open_positions: usize,
}

impl CycleSummary {
    /// True when the ledger changed during the cycle
    pub fn traded(&self) -> bool {
        self.buys > 0 || self.sells > 0
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buys={} sells={} holds={} failures={} unpriced={} open={}",
            self.buys, self.sells, self.holds, self.failures, self.unpriced, self.open_positions
        )
    }
}

/// Outcome of [`run_cycle`]
#[derive(Debug)]
pub struct CycleResult {
    /// Completed actions in execution order, including holds. Failed trades
    /// are reported in `failures` instead.
    pub actions: Vec<Action>,
    pub failures: Vec<TradingError>,
    pub summary: CycleSummary,
    pub ledger: PositionLedger,
}

/// Run one decision cycle over `ledger` and hand back the updated ledger
pub async fn run_cycle(
    engine: &DecisionEngine,
    executor: &dyn TradeExecutor,
    market: &MarketView,
    mut ledger: PositionLedger,
    now: DateTime<Utc>,
) -> CycleResult {
    let mut actions = Vec::new();
    let mut failures = Vec::new();
    let mut summary = CycleSummary::default();

    // Exits first, so freed capacity is visible to the entry decision
    let open: Vec<Position> = ledger.positions().cloned().collect();
    for position in open {
        let Some(price) = market.price_of(&position.token_id) else {
            tracing::warn!(
                "No price for held {} ({}), holding",
                position.symbol,
                position.token_id
            );
            summary.unpriced += 1;
            summary.holds += 1;
            actions.push(Action::Hold);
            continue;
        };

        let Some(profit_pct) = position.profit_pct(price) else {
            tracing::warn!(
                "Cannot compute P/L for {} ({}) at ${} from ${}, holding",
                position.symbol,
                position.token_id,
                price,
                position.entry_price
            );
            summary.unpriced += 1;
            summary.holds += 1;
            actions.push(Action::Hold);
            continue;
        };

        let action = engine.decide_exit(&position, price, now);
        match action {
            Action::Sell { .. } => match execute_sell(engine, executor, &mut ledger, &action).await {
                Ok(()) => {
                    summary.sells += 1;
                    actions.push(action);
                }
                Err(e) => {
                    tracing::warn!("Sell failed: {}", e);
                    failures.push(e);
                }
            },
            _ => {
                tracing::debug!(
                    "Holding {}: {:+.2}% after {} minutes",
                    position.symbol,
                    profit_pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                    position.held_minutes(now)
                );
                summary.holds += 1;
                actions.push(Action::Hold);
            }
        }
    }

    tracing::info!(
        "Current positions: {}/{}",
        ledger.len(),
        engine.config().max_positions
    );

    if engine.has_capacity(&ledger) {
        match &market.hot_tokens {
            Ok(tokens) => {
                let ranked = engine.find_opportunities(tokens, &ledger);
                tracing::info!("Found {} opportunities in {} tokens", ranked.len(), tokens.len());
                for (index, token) in ranked.iter().enumerate() {
                    tracing::info!("  {}", describe_opportunity(index + 1, token));
                }

                match engine.decide_entry(&ranked, &ledger) {
                    Action::Buy(order) => {
                        match execute_buy(engine, executor, &mut ledger, &order, now).await {
                            Ok(()) => {
                                summary.buys += 1;
                                actions.push(Action::Buy(order));
                            }
                            Err(e) => {
                                tracing::warn!("Buy failed: {}", e);
                                failures.push(e);
                            }
                        }
                    }
                    other => {
                        summary.holds += 1;
                        actions.push(other);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping entry search: {}", e);
                failures.push(TradingError::DataUnavailable(e.clone()));
            }
        }
    } else {
        tracing::debug!(
            "At capacity ({} positions), skipping entry search",
            ledger.len()
        );
    }

    summary.failures = failures.len();
    summary.open_positions = ledger.len();

    CycleResult {
        actions,
        failures,
        summary,
        ledger,
    }
}

/// One line per ranked opportunity in the cycle log
fn describe_opportunity(rank: usize, token: &TokenSnapshot) -> String {
    format!(
        "{}. {} ({}) - price ${}, curve {}%, volume ${}",
        rank,
        token.symbol,
        token.id,
        token.price_usd,
        token.bonding_curve_progress,
        token.volume_usd_24h
    )
}

async fn execute_sell(
    engine: &DecisionEngine,
    executor: &dyn TradeExecutor,
    ledger: &mut PositionLedger,
    action: &Action,
) -> Result<(), TradingError> {
    let Action::Sell {
        position,
        current_price,
        reason,
    } = action
    else {
        return Ok(());
    };

    let request = TradeRequest {
        token_id: position.token_id.clone(),
        amount: position.amount.clone(),
        slippage_pct: engine.config().slippage_tolerance_pct,
        reference_price_usd: *current_price,
    };

    executor
        .submit_sell(&request)
        .await
        .map_err(|reason| TradingError::ExecutionFailed {
            token_id: position.token_id.clone(),
            reason,
        })?;

    ledger.close(&position.token_id)?;

    tracing::info!(
        "SELL {} ({}) at ${} - {}",
        position.symbol,
        position.token_id,
        current_price,
        reason
    );
    Ok(())
}

async fn execute_buy(
    engine: &DecisionEngine,
    executor: &dyn TradeExecutor,
    ledger: &mut PositionLedger,
    order: &BuyOrder,
    now: DateTime<Utc>,
) -> Result<(), TradingError> {
    let token = &order.token;
    if token.price_usd <= Decimal::ZERO {
        return Err(TradingError::ExecutionFailed {
            token_id: token.id.clone(),
            reason: ExecutionError::InvalidParameters(format!(
                "non-positive price {}",
                token.price_usd
            )),
        });
    }

    let request = TradeRequest {
        token_id: token.id.clone(),
        amount: order.amount_sats.clone(),
        slippage_pct: engine.config().slippage_tolerance_pct,
        reference_price_usd: token.price_usd,
    };

    let received = executor
        .submit_buy(&request)
        .await
        .map_err(|reason| TradingError::ExecutionFailed {
            token_id: token.id.clone(),
            reason,
        })?;

    if received.is_zero() {
        tracing::error!(
            "BUY {} ({}) reported success with an empty fill; {} sats spent are untracked",
            token.symbol,
            token.id,
            order.amount_sats
        );
        return Err(TradingError::ExecutionFailed {
            token_id: token.id.clone(),
            reason: ExecutionError::Rejected("executor reported an empty fill".to_string()),
        });
    }

    let position = Position::new(
        token.id.clone(),
        token.symbol.clone(),
        token.price_usd,
        received,
        now,
    )?;
    ledger.open(position)?;

    tracing::info!(
        "BUY {} ({}) for {} BTC at ${} | mcap ${} | vol ${}",
        token.symbol,
        token.id,
        order.btc_amount,
        token.price_usd,
        token.market_cap_usd,
        token.volume_usd_24h
    );
    Ok(())
}
