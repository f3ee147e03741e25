pub mod cycle;
pub mod error;
pub mod orchestrator;

pub use cycle::{run_cycle, CycleResult, CycleSummary, MarketView};
pub use error::TradingError;
pub use orchestrator::{BotSettings, StopHandle, TradingBot};
