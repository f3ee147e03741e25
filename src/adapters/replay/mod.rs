//! Replay Adapter
//!
//! Offline market data recorded as JSON snapshot batches.

mod source;

pub use source::ReplayMarketData;
