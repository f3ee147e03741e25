//! Odin Trader - Bonding-curve token trading bot library
//!
//! A deterministic decision engine for bonding-curve tokens plus the loop
//! that runs it against a market data source and a trade executor.
//!
//! # Modules
//!
//! - `domain`: Core types (TokenSnapshot, Position, PositionLedger, Action)
//! - `ports`: Trait abstractions (MarketDataSource, TradeExecutor, Clock)
//! - `strategy`: Entry/exit policy (filter, ranking, DecisionEngine)
//! - `adapters`: Paper executor, replay market data, CLI
//! - `config`: Configuration loading and validation
//! - `application`: Trading cycle and orchestration loop

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
