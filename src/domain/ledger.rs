//! Position Ledger
//!
//! The only state carried from one trading cycle to the next. Holds at most
//! one open position per token id; iteration is ordered by token id so that
//! cycles evaluate positions in a stable order.
//!
//! The ledger can be written to disk after each cycle and restored on
//! startup, so a restarted bot keeps managing positions it already holds.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::position::Position;

/// Default ledger file name inside the data directory
pub const LEDGER_FILE: &str = "ledger.json";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Position already open for {0}")]
    AlreadyOpen(String),

    #[error("No open position for {0}")]
    NotFound(String),

    #[error("Ledger persistence error: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: BTreeMap<String, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new position. Fails if one is already open for the token.
    pub fn open(&mut self, position: Position) -> Result<(), LedgerError> {
        if self.positions.contains_key(&position.token_id) {
            return Err(LedgerError::AlreadyOpen(position.token_id));
        }
        self.positions.insert(position.token_id.clone(), position);
        Ok(())
    }

    /// Remove and return the position for `token_id`
    pub fn close(&mut self, token_id: &str) -> Result<Position, LedgerError> {
        self.positions
            .remove(token_id)
            .ok_or_else(|| LedgerError::NotFound(token_id.to_string()))
    }

    pub fn contains(&self, token_id: &str) -> bool {
        self.positions.contains_key(token_id)
    }

    pub fn get(&self, token_id: &str) -> Option<&Position> {
        self.positions.get(token_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn token_ids(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    /// Load a ledger saved by [`PositionLedger::save`]. `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, LedgerError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        let file: LedgerFile = serde_json::from_str(&content)
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;

        let mut ledger = Self::new();
        for position in file.positions {
            ledger.open(position)?;
        }
        Ok(Some(ledger))
    }

    /// Write the ledger as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        }
        let file = LedgerFile {
            positions: self.positions.values().cloned().collect(),
            last_updated: now,
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| LedgerError::Persistence(e.to_string()))?;
        Ok(())
    }
}

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    positions: Vec<Position>,
    last_updated: DateTime<Utc>,
}
