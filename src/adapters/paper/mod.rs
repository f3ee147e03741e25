//! Paper Trading Adapter
//!
//! Simulated trade execution for dry runs and tests.

mod executor;

pub use executor::{PaperConfig, PaperExecutor, PaperHolding, PaperStats};
