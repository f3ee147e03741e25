use chrono::{DateTime, Duration, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::{self, biguint_string};

/// An open holding in one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub token_id: String,
    pub symbol: String,
    /// Price paid, USD
    pub entry_price: Decimal,
    /// Held amount in token base units
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
    pub entry_timestamp: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PositionError {
    #[error("Invalid entry price: {0}")]
    InvalidEntryPrice(Decimal),
    #[error("Position amount must be greater than zero")]
    EmptyAmount,
}

impl Position {
    pub fn new(
        token_id: impl Into<String>,
        symbol: impl Into<String>,
        entry_price: Decimal,
        amount: BigUint,
        entry_timestamp: DateTime<Utc>,
    ) -> Result<Self, PositionError> {
        if entry_price <= Decimal::ZERO {
            return Err(PositionError::InvalidEntryPrice(entry_price));
        }
        if amount.is_zero() {
            return Err(PositionError::EmptyAmount);
        }

        Ok(Self {
            token_id: token_id.into(),
            symbol: symbol.into(),
            entry_price,
            amount,
            entry_timestamp,
        })
    }

    /// Unrealized profit in percent at `current_price`, `None` if out of range
    pub fn profit_pct(&self, current_price: Decimal) -> Option<Decimal> {
        units::percent_difference(self.entry_price, current_price)
    }

    /// Time held as of `now`. Negative spans (clock skew) clamp to zero.
    pub fn held_for(&self, now: DateTime<Utc>) -> Duration {
        let held = now - self.entry_timestamp;
        if held < Duration::zero() {
            Duration::zero()
        } else {
            held
        }
    }

    /// Whole minutes held as of `now`
    pub fn held_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.held_for(now).num_minutes()
    }

    /// Held amount in whole tokens, for display
    pub fn token_amount(&self) -> Option<Decimal> {
        units::to_token_amount(&self.amount)
    }
}
