//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Paper: simulated trade execution
//! - Replay: recorded market data served from JSON
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod paper;
pub mod replay;

pub use cli::CliApp;
pub use paper::{PaperConfig, PaperExecutor};
pub use replay::ReplayMarketData;
