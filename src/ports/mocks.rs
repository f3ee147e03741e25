//! Scripted port implementations for tests and dry runs
//!
//! Both doubles record every call and answer from responses configured with
//! builder methods. Unlike the `mockall` mocks they are usable from
//! integration tests and keep state between calls.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use num_bigint::BigUint;

use super::execution::{ExecutionError, TradeExecutor, TradeRequest};
use super::market_data::{MarketDataError, MarketDataSource};
use crate::domain::TokenSnapshot;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Market data that serves queued hot-token batches and fixed per-token snapshots
#[derive(Debug, Default, Clone)]
pub struct MockMarketData {
    batches: Arc<Mutex<VecDeque<Result<Vec<TokenSnapshot>, MarketDataError>>>>,
    tokens: Arc<Mutex<HashMap<String, TokenSnapshot>>>,
    token_errors: Arc<Mutex<HashMap<String, MarketDataError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch for the next `fetch_hot_tokens` call
    pub fn with_batch(self, batch: Vec<TokenSnapshot>) -> Self {
        lock(&self.batches).push_back(Ok(batch));
        self
    }

    /// Queue a failure for the next `fetch_hot_tokens` call
    pub fn with_batch_error(self, error: MarketDataError) -> Self {
        lock(&self.batches).push_back(Err(error));
        self
    }

    /// Answer `fetch_token` for this token id
    pub fn with_token(self, token: TokenSnapshot) -> Self {
        lock(&self.tokens).insert(token.id.clone(), token);
        self
    }

    pub fn with_token_error(self, token_id: &str, error: MarketDataError) -> Self {
        lock(&self.token_errors).insert(token_id.to_string(), error);
        self
    }

    /// Replace the snapshot served for a token, e.g. to move its price between cycles
    pub fn set_token(&self, token: TokenSnapshot) {
        lock(&self.tokens).insert(token.id.clone(), token);
    }

    pub fn push_batch(&self, batch: Vec<TokenSnapshot>) {
        lock(&self.batches).push_back(Ok(batch));
    }

    /// Recorded calls, as `hot:<limit>` or `token:<id>`
    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn fetch_hot_tokens(&self, limit: usize) -> Result<Vec<TokenSnapshot>, MarketDataError> {
        lock(&self.calls).push(format!("hot:{}", limit));
        match lock(&self.batches).pop_front() {
            Some(Ok(mut batch)) => {
                batch.truncate(limit);
                Ok(batch)
            }
            Some(Err(e)) => Err(e),
            None => Err(MarketDataError::Exhausted),
        }
    }

    async fn fetch_token(&self, token_id: &str) -> Result<TokenSnapshot, MarketDataError> {
        lock(&self.calls).push(format!("token:{}", token_id));
        if let Some(error) = lock(&self.token_errors).get(token_id) {
            return Err(error.clone());
        }
        lock(&self.tokens)
            .get(token_id)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(token_id.to_string()))
    }
}

/// Side of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Executor that records requests. Buys fill at a fixed token amount unless
/// the token is configured to fail.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    fill_amount: BigUint,
    calls: Arc<Mutex<Vec<(TradeSide, TradeRequest)>>>,
    failing_buys: Arc<Mutex<HashSet<String>>>,
    failing_sells: Arc<Mutex<HashSet<String>>>,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new(BigUint::from(1_000_000_000_000u64))
    }
}

impl RecordingExecutor {
    pub fn new(fill_amount: BigUint) -> Self {
        Self {
            fill_amount,
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_buys: Arc::new(Mutex::new(HashSet::new())),
            failing_sells: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Reject buys of this token
    pub fn with_failing_buy(self, token_id: &str) -> Self {
        lock(&self.failing_buys).insert(token_id.to_string());
        self
    }

    /// Reject sells of this token
    pub fn with_failing_sell(self, token_id: &str) -> Self {
        lock(&self.failing_sells).insert(token_id.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<(TradeSide, TradeRequest)> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, side: TradeSide) -> usize {
        lock(&self.calls).iter().filter(|(s, _)| *s == side).count()
    }
}

#[async_trait]
impl TradeExecutor for RecordingExecutor {
    async fn submit_buy(&self, request: &TradeRequest) -> Result<BigUint, ExecutionError> {
        lock(&self.calls).push((TradeSide::Buy, request.clone()));
        if lock(&self.failing_buys).contains(&request.token_id) {
            return Err(ExecutionError::Rejected(format!(
                "buy of {} rejected",
                request.token_id
            )));
        }
        Ok(self.fill_amount.clone())
    }

    async fn submit_sell(&self, request: &TradeRequest) -> Result<(), ExecutionError> {
        lock(&self.calls).push((TradeSide::Sell, request.clone()));
        if lock(&self.failing_sells).contains(&request.token_id) {
            return Err(ExecutionError::Rejected(format!(
                "sell of {} rejected",
                request.token_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn token(id: &str) -> TokenSnapshot {
        TokenSnapshot {
            id: id.to_string(),
            symbol: id.to_uppercase(),
            price_usd: dec!(1),
            market_cap_usd: dec!(20000),
            volume_usd_24h: dec!(2000),
            bonding_curve_progress: dec!(20),
            is_graduated: false,
            change_24h: dec!(0),
        }
    }

    #[tokio::test]
    async fn test_mock_market_data_batches() {
        let mock = MockMarketData::new()
            .with_batch(vec![token("a"), token("b")])
            .with_batch_error(MarketDataError::Network("timeout".to_string()));

        let first = mock.fetch_hot_tokens(1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(matches!(
            mock.fetch_hot_tokens(10).await,
            Err(MarketDataError::Network(_))
        ));
        assert_eq!(mock.fetch_hot_tokens(10).await, Err(MarketDataError::Exhausted));
        assert_eq!(mock.get_calls(), vec!["hot:1", "hot:10", "hot:10"]);
    }

    #[tokio::test]
    async fn test_mock_market_data_tokens() {
        let mock = MockMarketData::new()
            .with_token(token("a"))
            .with_token_error("b", MarketDataError::Network("down".to_string()));

        assert_eq!(mock.fetch_token("a").await.unwrap().id, "a");
        assert!(matches!(mock.fetch_token("b").await, Err(MarketDataError::Network(_))));
        assert!(matches!(mock.fetch_token("c").await, Err(MarketDataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recording_executor() {
        let executor = RecordingExecutor::new(BigUint::from(42u32)).with_failing_sell("a");
        let request = TradeRequest {
            token_id: "a".to_string(),
            amount: BigUint::from(5u32),
            slippage_pct: dec!(2),
            reference_price_usd: dec!(1),
        };

        assert_eq!(executor.submit_buy(&request).await.unwrap(), BigUint::from(42u32));
        assert!(executor.submit_sell(&request).await.is_err());
        assert_eq!(executor.count(TradeSide::Buy), 1);
        assert_eq!(executor.count(TradeSide::Sell), 1);
    }
}
