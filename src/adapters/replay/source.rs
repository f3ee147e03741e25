//! Replay Market Data
//!
//! Serves recorded hot-token batches from a JSON file:
//!
//! ```json
//! { "frames": [ [ { "id": "...", "priceUsd": 0.01, ... } ], [ ... ] ] }
//! ```
//!
//! Each `fetch_hot_tokens` call advances to the next frame; `fetch_token`
//! answers from the frame served last (or the first frame before any fetch).
//! Once every frame has been served, further batch requests fail with
//! `MarketDataError::Exhausted`.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::TokenSnapshot;
use crate::ports::{MarketDataError, MarketDataSource};

#[derive(Debug, Deserialize)]
struct ReplayFile {
    frames: Vec<Vec<TokenSnapshot>>,
}

#[derive(Debug)]
pub struct ReplayMarketData {
    frames: Vec<Vec<TokenSnapshot>>,
    /// Index of the frame served last
    cursor: Mutex<Option<usize>>,
}

impl ReplayMarketData {
    pub fn from_frames(frames: Vec<Vec<TokenSnapshot>>) -> Self {
        Self {
            frames,
            cursor: Mutex::new(None),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MarketDataError> {
        let file: ReplayFile =
            serde_json::from_str(json).map_err(|e| MarketDataError::Parse(e.to_string()))?;
        Ok(Self::from_frames(file.frames))
    }

    pub fn from_path(path: &Path) -> Result<Self, MarketDataError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::Parse(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Total number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames not yet served
    pub fn remaining(&self) -> usize {
        let served = self.current().map_or(0, |i| i + 1);
        self.frames.len().saturating_sub(served)
    }

    fn current(&self) -> Option<usize> {
        match self.cursor.lock() {
            Ok(cursor) => *cursor,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn advance(&self) -> Option<usize> {
        let mut cursor = match self.cursor.lock() {
            Ok(cursor) => cursor,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = cursor.map_or(0, |i| i + 1);
        if next >= self.frames.len() {
            return None;
        }
        *cursor = Some(next);
        Some(next)
    }
}

#[async_trait]
impl MarketDataSource for ReplayMarketData {
    async fn fetch_hot_tokens(&self, limit: usize) -> Result<Vec<TokenSnapshot>, MarketDataError> {
        let index = self.advance().ok_or(MarketDataError::Exhausted)?;
        Ok(self.frames[index].iter().take(limit).cloned().collect())
    }

    async fn fetch_token(&self, token_id: &str) -> Result<TokenSnapshot, MarketDataError> {
        let index = self.current().unwrap_or(0);
        self.frames
            .get(index)
            .and_then(|frame| frame.iter().find(|t| t.id == token_id))
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(token_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REPLAY: &str = r#"{
        "frames": [
            [
                {"id": "a", "symbol": "A", "priceUsd": 0.01, "marketCapUsd": 20000,
                 "volumeUsd24h": 3000, "bondingCurveProgress": 15, "isGraduated": false, "change24h": 1},
                {"id": "b", "symbol": "B", "priceUsd": 0.02, "marketCapUsd": 30000,
                 "volumeUsd24h": 4000, "bondingCurveProgress": 25, "isGraduated": false, "change24h": 2}
            ],
            [
                {"id": "a", "symbol": "A", "priceUsd": 0.012, "marketCapUsd": 24000,
                 "volumeUsd24h": 3500, "bondingCurveProgress": 18, "isGraduated": false, "change24h": 5}
            ]
        ]
    }"#;

    #[tokio::test]
    async fn test_frames_served_in_order() {
        let replay = ReplayMarketData::from_json(REPLAY).unwrap();
        assert_eq!(replay.len(), 2);
        assert_eq!(replay.remaining(), 2);

        let first = replay.fetch_hot_tokens(10).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(replay.fetch_token("a").await.unwrap().price_usd, dec!(0.01));

        let second = replay.fetch_hot_tokens(10).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(replay.fetch_token("a").await.unwrap().price_usd, dec!(0.012));
        assert!(matches!(
            replay.fetch_token("b").await,
            Err(MarketDataError::NotFound(_))
        ));

        assert_eq!(replay.remaining(), 0);
        assert_eq!(replay.fetch_hot_tokens(10).await, Err(MarketDataError::Exhausted));
    }

    #[tokio::test]
    async fn test_limit_truncates_frame() {
        let replay = ReplayMarketData::from_json(REPLAY).unwrap();
        let batch = replay.fetch_hot_tokens(1).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, "a");
    }

    #[tokio::test]
    async fn test_fetch_token_before_first_batch() {
        let replay = ReplayMarketData::from_json(REPLAY).unwrap();
        assert_eq!(replay.fetch_token("b").await.unwrap().symbol, "B");
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(REPLAY.as_bytes()).unwrap();
        let replay = ReplayMarketData::from_path(file.path()).unwrap();
        assert_eq!(replay.len(), 2);

        let batch = tokio_test::block_on(replay.fetch_hot_tokens(5)).unwrap();
        assert_eq!(batch[1].symbol, "B");
        assert_eq!(replay.remaining(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ReplayMarketData::from_json("{\"frames\": 3}"),
            Err(MarketDataError::Parse(_))
        ));
    }
}
