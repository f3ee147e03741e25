//! CLI Command Definitions
//!
//! Arguments for every odin-trader subcommand.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Odin Trader - Bonding-curve token trading bot
#[derive(Parser, Debug)]
#[command(
    name = "odin-trader",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Bonding-curve token trading bot",
    long_about = "Odin Trader buys the highest-volume bonding-curve tokens that pass its \
                  market cap, volume and progress filters, and exits on profit target, \
                  stop loss or maximum hold time."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Debug logging for odin-trader
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Trace logging for everything
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the trading loop against recorded market data with paper execution
    Run(RunCmd),

    /// Show the persisted position ledger
    Status(StatusCmd),

    /// Validate a configuration file and print the effective settings
    CheckConfig(CheckConfigCmd),
}

/// Start trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/paper.toml")]
    pub config: PathBuf,

    /// Recorded market data to replay
    #[arg(short, long, value_name = "FILE", default_value = "demos/replay.json")]
    pub replay: PathBuf,

    /// Stop after this many cycles (default: one per replay frame)
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Override poll interval in seconds
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Ignore any persisted ledger and start flat
    #[arg(long)]
    pub fresh: bool,
}

/// Check bot status
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/paper.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/paper.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
