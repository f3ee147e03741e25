//! Strategy Layer - Entry and exit policy for bonding-curve tokens
//!
//! Deterministic rules over market snapshots and the position ledger:
//! - Opportunity filter (market cap, volume, bonding curve, graduation, 24h change)
//! - Ranking by 24h volume
//! - Entry decision bounded by position capacity
//! - Exit decision: profit target, stop loss, maximum hold time
//!
//! Nothing here performs I/O or reads the clock.

pub mod config;
pub mod engine;
pub mod entry;
pub mod exit;
pub mod opportunity;

pub use config::{StrategyError, TradingConfig};
pub use engine::DecisionEngine;
pub use entry::decide_entry;
pub use exit::decide_exit;
pub use opportunity::{find_opportunities, is_eligible, rank, screen, Rejection, MIN_CHANGE_24H_PCT};
