//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section and key
//! is optional; a missing file section falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::paper::PaperConfig;
use crate::domain::LEDGER_FILE;
use crate::strategy::TradingConfig;

/// Environment variable overriding `bot.data_dir`
pub const DATA_DIR_ENV: &str = "ODIN_TRADER_DATA_DIR";

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub bot: BotSection,
    #[serde(default)]
    pub paper: PaperConfig,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Orchestration loop section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSection {
    /// Seconds between cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Hot tokens requested per cycle
    #[serde(default = "default_hot_token_limit")]
    pub hot_token_limit: usize,
    /// Directory for the persisted ledger (`~` is expanded)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Write the ledger after every cycle that traded
    #[serde(default = "default_persist_ledger")]
    pub persist_ledger: bool,
}

fn default_poll_interval_secs() -> u64 {
    30
}
fn default_hot_token_limit() -> usize {
    20
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_persist_ledger() -> bool {
    true
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            hot_token_limit: default_hot_token_limit(),
            data_dir: default_data_dir(),
            persist_ledger: default_persist_ledger(),
        }
    }
}

impl BotSection {
    /// Data directory with environment variable override
    /// Checks ODIN_TRADER_DATA_DIR env var first, falls back to config value
    pub fn get_data_dir(&self) -> PathBuf {
        self.resolve_data_dir(std::env::var(DATA_DIR_ENV).ok())
    }

    fn resolve_data_dir(&self, env_override: Option<String>) -> PathBuf {
        let raw = env_override
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| self.data_dir.clone());
        PathBuf::from(shellexpand::tilde(&raw).to_string())
    }

    /// Ledger file location, None when persistence is disabled
    pub fn ledger_path(&self) -> Option<PathBuf> {
        self.persist_ledger
            .then(|| self.get_data_dir().join(LEDGER_FILE))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trading
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("[trading] {}", e)))?;

        self.paper
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("[paper] {}", e)))?;

        if self.bot.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.bot.hot_token_limit == 0 {
            return Err(ConfigError::ValidationError(
                "hot_token_limit must be > 0".to_string(),
            ));
        }

        if self.bot.data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}
