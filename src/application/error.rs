use thiserror::Error;

use crate::domain::{LedgerError, PositionError};
use crate::ports::{ExecutionError, MarketDataError};
use crate::strategy::StrategyError;

#[derive(Debug, Error)]
pub enum TradingError {
    /// Snapshot fetch failed; entry search is skipped this cycle
    #[error("Market data unavailable: {0}")]
    DataUnavailable(#[from] MarketDataError),

    /// Executor refused a trade; the ledger is untouched for this token
    #[error("Execution failed for {token_id}: {reason}")]
    ExecutionFailed {
        token_id: String,
        reason: ExecutionError,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] StrategyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] PositionError),

    #[error("Persistence error: {0}")]
    Persistence(String),
}
