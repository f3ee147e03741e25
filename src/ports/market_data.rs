use async_trait::async_trait;
use thiserror::Error;

use crate::domain::TokenSnapshot;

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Token not found: {0}")]
    NotFound(String),

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("Market data exhausted")]
    Exhausted,
}

/// Source of token snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Currently trending tokens, at most `limit`
    async fn fetch_hot_tokens(&self, limit: usize) -> Result<Vec<TokenSnapshot>, MarketDataError>;

    /// Latest snapshot for one token
    async fn fetch_token(&self, token_id: &str) -> Result<TokenSnapshot, MarketDataError>;
}
