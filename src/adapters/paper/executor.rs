//! Paper Trading Executor
//!
//! Simulates fills without touching any exchange. Tracks a BTC balance in
//! sats, token holdings with their cost basis, and realized P/L.
//!
//! Fills are priced from the request's reference price with a fixed simulated
//! slippage: buys pay more, sells receive less. A request whose tolerance is
//! below the simulated slippage is rejected.

use std::collections::HashMap;

use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{units, Position};
use crate::ports::{ExecutionError, TradeExecutor, TradeRequest};

/// `[paper]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Starting balance in BTC
    #[serde(default = "default_initial_btc")]
    pub initial_btc: Decimal,

    /// BTC/USD rate used to turn BTC spent into USD
    #[serde(default = "default_btc_price_usd")]
    pub btc_price_usd: Decimal,

    /// Slippage applied to every fill, percent
    #[serde(default = "default_simulated_slippage_pct")]
    pub simulated_slippage_pct: Decimal,
}

fn default_initial_btc() -> Decimal {
    dec!(0.1)
}
fn default_btc_price_usd() -> Decimal {
    dec!(60000)
}
fn default_simulated_slippage_pct() -> Decimal {
    dec!(0.5)
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            initial_btc: default_initial_btc(),
            btc_price_usd: default_btc_price_usd(),
            simulated_slippage_pct: default_simulated_slippage_pct(),
        }
    }
}

impl PaperConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_btc < Decimal::ZERO {
            return Err(format!("initial_btc must be >= 0, got {}", self.initial_btc));
        }
        if self.btc_price_usd <= Decimal::ZERO {
            return Err(format!("btc_price_usd must be > 0, got {}", self.btc_price_usd));
        }
        if self.simulated_slippage_pct < Decimal::ZERO
            || self.simulated_slippage_pct >= Decimal::ONE_HUNDRED
        {
            return Err(format!(
                "simulated_slippage_pct must be 0-100, got {}",
                self.simulated_slippage_pct
            ));
        }
        Ok(())
    }
}

/// Simulated holding of one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperHolding {
    #[serde(with = "units::biguint_string")]
    pub amount: BigUint,
    /// Sats spent on the amount still held
    #[serde(with = "units::biguint_string")]
    pub cost_sats: BigUint,
}

/// Paper trading statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperStats {
    pub buy_count: u32,
    pub sell_count: u32,
    /// Sells that returned more sats than they cost
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// Realized P/L in sats, signed
    pub realized_pnl_sats: Decimal,
}

impl PaperStats {
    /// Win rate as a percentage (0-100)
    pub fn win_rate(&self) -> Decimal {
        let closed = self.winning_trades + self.losing_trades;
        if closed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.winning_trades) / Decimal::from(closed) * Decimal::ONE_HUNDRED
    }
}

#[derive(Debug)]
struct PaperState {
    balance_sats: BigUint,
    holdings: HashMap<String, PaperHolding>,
    stats: PaperStats,
}

/// Trade executor that fills against a simulated balance
#[derive(Debug)]
pub struct PaperExecutor {
    config: PaperConfig,
    state: Mutex<PaperState>,
}

impl PaperExecutor {
    pub fn new(config: PaperConfig) -> Result<Self, ExecutionError> {
        config.validate().map_err(ExecutionError::InvalidParameters)?;
        let balance_sats = units::btc_to_sats(config.initial_btc).ok_or_else(|| {
            ExecutionError::InvalidParameters(format!("invalid initial_btc {}", config.initial_btc))
        })?;

        info!(
            "Paper executor initialized with {} BTC ({} sats)",
            config.initial_btc, balance_sats
        );

        Ok(Self {
            config,
            state: Mutex::new(PaperState {
                balance_sats,
                holdings: HashMap::new(),
                stats: PaperStats::default(),
            }),
        })
    }

    /// Register a position opened in an earlier run so it can be sold.
    /// Cost basis is derived from the entry price.
    pub async fn adopt_position(&self, position: &Position) -> Result<(), ExecutionError> {
        let tokens = position.token_amount().ok_or_else(|| overflow("amount"))?;
        let btc = tokens
            .checked_mul(position.entry_price)
            .and_then(|usd| usd.checked_div(self.config.btc_price_usd))
            .ok_or_else(|| overflow("cost basis"))?;
        let cost_sats = units::btc_to_sats(btc).ok_or_else(|| overflow("cost basis"))?;

        let mut state = self.state.lock().await;
        let holding = state
            .holdings
            .entry(position.token_id.clone())
            .or_insert_with(|| PaperHolding {
                amount: BigUint::zero(),
                cost_sats: BigUint::zero(),
            });
        holding.amount += &position.amount;
        holding.cost_sats += &cost_sats;

        info!(
            "[PAPER] Adopted {} {} with cost basis {} sats",
            tokens.round_dp(4),
            position.symbol,
            cost_sats
        );
        Ok(())
    }

    pub async fn balance_sats(&self) -> BigUint {
        self.state.lock().await.balance_sats.clone()
    }

    pub async fn holding(&self, token_id: &str) -> Option<PaperHolding> {
        self.state.lock().await.holdings.get(token_id).cloned()
    }

    pub async fn stats(&self) -> PaperStats {
        self.state.lock().await.stats.clone()
    }

    fn check_request(&self, request: &TradeRequest) -> Result<(), ExecutionError> {
        if request.amount.is_zero() {
            return Err(ExecutionError::InvalidParameters(
                "amount must be positive".to_string(),
            ));
        }
        if request.reference_price_usd <= Decimal::ZERO {
            return Err(ExecutionError::InvalidParameters(format!(
                "price must be positive, got {}",
                request.reference_price_usd
            )));
        }
        if self.config.simulated_slippage_pct > request.slippage_pct {
            return Err(ExecutionError::SlippageExceeded {
                actual_pct: self.config.simulated_slippage_pct,
                tolerance_pct: request.slippage_pct,
            });
        }
        Ok(())
    }

    fn slippage_factor(&self) -> Decimal {
        self.config.simulated_slippage_pct / Decimal::ONE_HUNDRED
    }
}

fn overflow(what: &str) -> ExecutionError {
    ExecutionError::InvalidParameters(format!("{} out of range", what))
}

#[async_trait]
impl TradeExecutor for PaperExecutor {
    async fn submit_buy(&self, request: &TradeRequest) -> Result<BigUint, ExecutionError> {
        self.check_request(request)?;

        let mut state = self.state.lock().await;
        if request.amount > state.balance_sats {
            return Err(ExecutionError::InsufficientBalance {
                needed: request.amount.clone(),
                available: state.balance_sats.clone(),
            });
        }

        // Buy = worse price = higher
        let effective_price = request
            .reference_price_usd
            .checked_mul(Decimal::ONE + self.slippage_factor())
            .ok_or_else(|| overflow("price"))?;
        let btc = units::sats_to_btc(&request.amount).ok_or_else(|| overflow("amount"))?;
        let usd = btc
            .checked_mul(self.config.btc_price_usd)
            .ok_or_else(|| overflow("trade value"))?;
        let tokens = usd
            .checked_div(effective_price)
            .ok_or_else(|| overflow("token amount"))?;
        let received = units::from_token_amount(tokens).ok_or_else(|| overflow("token amount"))?;

        if received.is_zero() {
            return Err(ExecutionError::Rejected(format!(
                "{} sats buys less than one base unit of {}",
                request.amount, request.token_id
            )));
        }

        state.balance_sats -= &request.amount;
        let holding = state
            .holdings
            .entry(request.token_id.clone())
            .or_insert_with(|| PaperHolding {
                amount: BigUint::zero(),
                cost_sats: BigUint::zero(),
            });
        holding.amount += &received;
        holding.cost_sats += &request.amount;
        state.stats.buy_count += 1;

        info!(
            "[PAPER] BUY {} {} @ ${} for {} sats (slippage: {}%)",
            tokens.round_dp(4),
            request.token_id,
            effective_price,
            request.amount,
            self.config.simulated_slippage_pct
        );

        Ok(received)
    }

    async fn submit_sell(&self, request: &TradeRequest) -> Result<(), ExecutionError> {
        self.check_request(request)?;

        let mut state = self.state.lock().await;
        let held = state
            .holdings
            .get(&request.token_id)
            .cloned()
            .ok_or_else(|| ExecutionError::UnknownHolding(request.token_id.clone()))?;

        if request.amount > held.amount {
            return Err(ExecutionError::InvalidParameters(format!(
                "selling {} of {} but only {} held",
                request.amount, request.token_id, held.amount
            )));
        }

        // Sell = worse price = lower
        let effective_price = request
            .reference_price_usd
            .checked_mul(Decimal::ONE - self.slippage_factor())
            .ok_or_else(|| overflow("price"))?;
        let tokens = units::to_token_amount(&request.amount).ok_or_else(|| overflow("amount"))?;
        let usd = tokens
            .checked_mul(effective_price)
            .ok_or_else(|| overflow("trade value"))?;
        let btc = usd
            .checked_div(self.config.btc_price_usd)
            .ok_or_else(|| overflow("trade value"))?;
        let proceeds_sats = units::btc_to_sats(btc).ok_or_else(|| overflow("proceeds"))?;

        // Cost basis of the sold fraction
        let cost_sats = &held.cost_sats * &request.amount / &held.amount;
        let proceeds = units::biguint_to_decimal(&proceeds_sats).ok_or_else(|| overflow("proceeds"))?;
        let cost = units::biguint_to_decimal(&cost_sats).ok_or_else(|| overflow("cost basis"))?;
        let pnl_sats = proceeds - cost;

        state.balance_sats += &proceeds_sats;
        let remaining = &held.amount - &request.amount;
        if remaining.is_zero() {
            state.holdings.remove(&request.token_id);
        } else {
            state.holdings.insert(
                request.token_id.clone(),
                PaperHolding {
                    amount: remaining,
                    cost_sats: &held.cost_sats - &cost_sats,
                },
            );
        }

        let stats = &mut state.stats;
        stats.sell_count += 1;
        stats.realized_pnl_sats = stats
            .realized_pnl_sats
            .checked_add(pnl_sats)
            .ok_or_else(|| overflow("realized P/L"))?;
        if pnl_sats > Decimal::ZERO {
            stats.winning_trades += 1;
        } else if pnl_sats < Decimal::ZERO {
            stats.losing_trades += 1;
        }

        info!(
            "[PAPER] SELL {} {} @ ${} for {} sats (P/L: {} sats)",
            tokens.round_dp(4),
            request.token_id,
            effective_price,
            proceeds_sats,
            pnl_sats
        );

        Ok(())
    }
}
