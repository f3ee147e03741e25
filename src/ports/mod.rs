//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (hot token lists, single token snapshots)
//! - Trade execution (buy/sell submission)
//! - Time

pub mod clock;
pub mod execution;
pub mod market_data;
pub mod mocks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use execution::{ExecutionError, TradeExecutor, TradeRequest};
pub use market_data::{MarketDataError, MarketDataSource};
