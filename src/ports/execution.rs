use async_trait::async_trait;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::units::biguint_string;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Trade rejected: {0}")]
    Rejected(String),
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: BigUint, available: BigUint },
    #[error("No holding for token {0}")]
    UnknownHolding(String),
    #[error("Slippage {actual_pct}% exceeds tolerance {tolerance_pct}%")]
    SlippageExceeded {
        actual_pct: Decimal,
        tolerance_pct: Decimal,
    },
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// One buy or sell submission.
///
/// For a buy `amount` is the BTC to spend in sats; for a sell it is the
/// token amount in base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub token_id: String,
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
    pub slippage_pct: Decimal,
    /// Price the decision was made at, USD
    pub reference_price_usd: Decimal,
}

/// Submits trades. Each decision produces at most one call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Spend `request.amount` sats on the token; returns the token base units received
    async fn submit_buy(&self, request: &TradeRequest) -> Result<BigUint, ExecutionError>;

    /// Sell `request.amount` base units of the token
    async fn submit_sell(&self, request: &TradeRequest) -> Result<(), ExecutionError>;
}
