//! Trading Policy Configuration
//!
//! Maps to the `[trading]` section in config.toml. Every key is optional;
//! defaults reproduce the reference bot's settings.

use num_traits::Zero;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::units;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    // ===== Trade Size =====
    /// Largest BTC amount to spend on one buy
    #[serde(default = "default_max_buy_amount_btc")]
    pub max_buy_amount_btc: Decimal,

    /// Hard cap per trade, applied on top of `max_buy_amount_btc`
    #[serde(default = "default_per_trade_cap_btc")]
    pub per_trade_cap_btc: Decimal,

    // ===== Entry Filters =====
    #[serde(default = "default_min_market_cap_usd")]
    pub min_market_cap_usd: Decimal,

    #[serde(default = "default_max_market_cap_usd")]
    pub max_market_cap_usd: Decimal,

    /// Minimum 24h volume in USD
    #[serde(default = "default_min_volume_usd")]
    pub min_volume_usd: Decimal,

    /// Minimum bonding curve completion (0-100)
    #[serde(default = "default_min_bonding_curve_progress")]
    pub min_bonding_curve_progress: Decimal,

    // ===== Exits =====
    #[serde(default = "default_profit_target_pct")]
    pub profit_target_pct: Decimal,

    /// Positive number; a position is stopped out at `-stop_loss_pct`
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,

    /// Positions older than this are closed regardless of P/L
    #[serde(default = "default_max_hold_minutes")]
    pub max_hold_minutes: u32,

    // ===== Execution =====
    /// Slippage tolerance passed to the executor, percent
    #[serde(default = "default_slippage_tolerance_pct")]
    pub slippage_tolerance_pct: Decimal,

    /// Maximum concurrent open positions
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
}

fn default_max_buy_amount_btc() -> Decimal {
    dec!(0.005)
}
fn default_per_trade_cap_btc() -> Decimal {
    dec!(0.01)
}
fn default_min_market_cap_usd() -> Decimal {
    dec!(10000)
}
fn default_max_market_cap_usd() -> Decimal {
    dec!(100000)
}
fn default_min_volume_usd() -> Decimal {
    dec!(1000)
}
fn default_min_bonding_curve_progress() -> Decimal {
    dec!(10)
}
fn default_profit_target_pct() -> Decimal {
    dec!(15)
}
fn default_stop_loss_pct() -> Decimal {
    dec!(10)
}
fn default_max_hold_minutes() -> u32 {
    120
}
fn default_slippage_tolerance_pct() -> Decimal {
    dec!(2.0)
}
fn default_max_positions() -> usize {
    3
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_buy_amount_btc: default_max_buy_amount_btc(),
            per_trade_cap_btc: default_per_trade_cap_btc(),
            min_market_cap_usd: default_min_market_cap_usd(),
            max_market_cap_usd: default_max_market_cap_usd(),
            min_volume_usd: default_min_volume_usd(),
            min_bonding_curve_progress: default_min_bonding_curve_progress(),
            profit_target_pct: default_profit_target_pct(),
            stop_loss_pct: default_stop_loss_pct(),
            max_hold_minutes: default_max_hold_minutes(),
            slippage_tolerance_pct: default_slippage_tolerance_pct(),
            max_positions: default_max_positions(),
        }
    }
}

impl TradingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.min_market_cap_usd < Decimal::ZERO {
            return Err(invalid(format!(
                "min_market_cap_usd must be >= 0, got {}",
                self.min_market_cap_usd
            )));
        }

        if self.min_market_cap_usd > self.max_market_cap_usd {
            return Err(invalid(format!(
                "min_market_cap_usd ({}) must be <= max_market_cap_usd ({})",
                self.min_market_cap_usd, self.max_market_cap_usd
            )));
        }

        if self.min_volume_usd < Decimal::ZERO {
            return Err(invalid(format!(
                "min_volume_usd must be >= 0, got {}",
                self.min_volume_usd
            )));
        }

        if self.min_bonding_curve_progress < Decimal::ZERO
            || self.min_bonding_curve_progress > Decimal::ONE_HUNDRED
        {
            return Err(invalid(format!(
                "min_bonding_curve_progress must be 0-100, got {}",
                self.min_bonding_curve_progress
            )));
        }

        if self.profit_target_pct <= Decimal::ZERO {
            return Err(invalid(format!(
                "profit_target_pct must be > 0, got {}",
                self.profit_target_pct
            )));
        }

        if self.stop_loss_pct <= Decimal::ZERO || self.stop_loss_pct > Decimal::ONE_HUNDRED {
            return Err(invalid(format!(
                "stop_loss_pct must be 0-100, got {}",
                self.stop_loss_pct
            )));
        }

        if self.slippage_tolerance_pct < Decimal::ZERO
            || self.slippage_tolerance_pct > Decimal::ONE_HUNDRED
        {
            return Err(invalid(format!(
                "slippage_tolerance_pct must be 0-100, got {}",
                self.slippage_tolerance_pct
            )));
        }

        if self.max_positions == 0 {
            return Err(invalid("max_positions must be > 0".to_string()));
        }

        if self.max_hold_minutes == 0 {
            return Err(invalid("max_hold_minutes must be > 0".to_string()));
        }

        if self.max_buy_amount_btc <= Decimal::ZERO || self.per_trade_cap_btc <= Decimal::ZERO {
            return Err(invalid(
                "max_buy_amount_btc and per_trade_cap_btc must be > 0".to_string(),
            ));
        }

        match units::btc_to_sats(self.trade_size_btc()) {
            Some(sats) if !sats.is_zero() => Ok(()),
            _ => Err(invalid(format!(
                "trade size {} BTC is below one sat ({} sats per BTC)",
                self.trade_size_btc(),
                units::SATS_PER_BTC
            ))),
        }
    }

    /// BTC spent per buy: the smaller of the configured maximum and the per-trade cap
    pub fn trade_size_btc(&self) -> Decimal {
        self.max_buy_amount_btc.min(self.per_trade_cap_btc)
    }
}

fn invalid(message: String) -> StrategyError {
    StrategyError::InvalidConfig(message)
}
