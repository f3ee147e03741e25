//! Decision Engine
//!
//! Bundles a validated [`TradingConfig`] with the filter, ranking, entry and
//! exit rules. The engine never reads the clock or touches the network;
//! callers pass in snapshots, the ledger and the current time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::config::{StrategyError, TradingConfig};
use super::{entry, exit, opportunity};
use crate::domain::{Action, Position, PositionLedger, TokenSnapshot};

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: TradingConfig,
}

impl DecisionEngine {
    /// Create an engine, rejecting an inconsistent config
    pub fn new(config: TradingConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    pub fn is_eligible(&self, token: &TokenSnapshot, ledger: &PositionLedger) -> bool {
        opportunity::is_eligible(token, ledger, &self.config)
    }

    pub fn find_opportunities(
        &self,
        tokens: &[TokenSnapshot],
        ledger: &PositionLedger,
    ) -> Vec<TokenSnapshot> {
        opportunity::find_opportunities(tokens, ledger, &self.config)
    }

    pub fn decide_entry(&self, ranked: &[TokenSnapshot], ledger: &PositionLedger) -> Action {
        entry::decide_entry(ranked, ledger, &self.config)
    }

    pub fn decide_exit(
        &self,
        position: &Position,
        current_price: Decimal,
        now: DateTime<Utc>,
    ) -> Action {
        exit::decide_exit(position, current_price, now, &self.config)
    }

    /// True while another position may be opened
    pub fn has_capacity(&self, ledger: &PositionLedger) -> bool {
        ledger.len() < self.config.max_positions
    }
}
