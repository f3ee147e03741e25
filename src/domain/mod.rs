//! Domain Layer - Core types for the trading bot
//!
//! Pure data types and bookkeeping with no I/O besides ledger persistence.
//! All external interactions happen through the ports layer.

pub mod action;
pub mod ledger;
pub mod position;
pub mod snapshot;
pub mod units;

pub use action::{Action, BuyOrder, ExitReason};
pub use ledger::{LedgerError, PositionLedger, LEDGER_FILE};
pub use position::{Position, PositionError};
pub use snapshot::TokenSnapshot;
