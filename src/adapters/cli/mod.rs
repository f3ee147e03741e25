//! CLI Adapter
//!
//! Command-line interface for the odin-trader binary.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CheckConfigCmd, CliApp, Command, OutputFormat, RunCmd, StatusCmd};
