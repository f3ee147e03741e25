//! Odin Trader - Bonding-curve token trading bot
//!
//! Runs the decision engine against recorded market data with paper execution.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use odin_trader::adapters::cli::{CheckConfigCmd, CliApp, Command, OutputFormat, RunCmd, StatusCmd};
use odin_trader::adapters::{PaperExecutor, ReplayMarketData};
use odin_trader::application::{BotSettings, TradingBot};
use odin_trader::config::{load_config, Config};
use odin_trader::domain::{units, PositionLedger, LEDGER_FILE};
use odin_trader::ports::SystemClock;
use odin_trader::strategy::DecisionEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config_level = load_config(config_path(&app.command))
        .ok()
        .map(|config| config.logging.level);
    init_logging(app.verbose, app.debug, config_level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Status(cmd) => status_command(cmd),
        Command::CheckConfig(cmd) => check_config_command(cmd),
    }
}

fn config_path(command: &Command) -> &Path {
    match command {
        Command::Run(cmd) => &cmd.config,
        Command::Status(cmd) => &cmd.config,
        Command::CheckConfig(cmd) => &cmd.config,
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: Option<String>) -> Result<()> {
    let filter = match flag_directive(verbose, debug) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_level.as_deref().unwrap_or("info"))),
    };

    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

/// Filter forced by `--debug` or `--verbose`; otherwise RUST_LOG or `logging.level` apply
fn flag_directive(verbose: bool, debug: bool) -> Option<&'static str> {
    if debug {
        Some("trace")
    } else if verbose {
        Some("info,odin_trader=debug")
    } else {
        None
    }
}

async fn run_command(cmd: RunCmd) -> Result<()> {
    tracing::info!("Starting odin-trader...");

    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let engine =
        DecisionEngine::new(config.trading.clone()).context("Invalid trading configuration")?;

    let replay = ReplayMarketData::from_path(&cmd.replay)
        .with_context(|| format!("Failed to load replay data from {}", cmd.replay.display()))?;
    let frames = replay.len() as u64;

    let executor = Arc::new(
        PaperExecutor::new(config.paper.clone()).context("Failed to create paper executor")?,
    );

    let ledger_path = config.bot.ledger_path();
    if cmd.fresh {
        if let Some(path) = ledger_path.as_deref().filter(|p| p.exists()) {
            tracing::warn!("Discarding persisted ledger at {}", path.display());
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    let settings = BotSettings {
        poll_interval: Duration::from_secs(cmd.interval.unwrap_or(config.bot.poll_interval_secs)),
        hot_token_limit: config.bot.hot_token_limit,
        ledger_path,
        max_cycles: Some(cmd.cycles.unwrap_or(frames)),
    };

    let mut bot = TradingBot::new(
        engine,
        Arc::new(replay),
        executor.clone(),
        Arc::new(SystemClock),
        settings,
    );

    let restored = bot.restore_ledger().context("Failed to restore ledger")?;
    if restored > 0 {
        tracing::info!("Restored {} open positions", restored);
        for position in bot.ledger().positions() {
            executor
                .adopt_position(position)
                .await
                .with_context(|| format!("Failed to adopt position {}", position.token_id))?;
        }
    }

    // Setup Ctrl+C handler
    let stop = bot.stop_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        stop.stop();
    });

    tracing::warn!("PAPER TRADING MODE - replaying {} recorded frames", frames);
    bot.run().await?;

    let stats = executor.stats().await;
    let balance = executor.balance_sats().await;
    println!("Cycles:        {}", bot.cycles());
    println!("Open:          {}", bot.ledger().len());
    println!(
        "Trades:        {} buys, {} sells ({} wins, {} losses, {:.1}% win rate)",
        stats.buy_count,
        stats.sell_count,
        stats.winning_trades,
        stats.losing_trades,
        stats.win_rate()
    );
    println!("Realized P/L:  {} sats", stats.realized_pnl_sats);
    println!(
        "Balance:       {} sats ({} BTC)",
        balance,
        units::sats_to_btc(&balance).unwrap_or_default()
    );

    tracing::info!("odin-trader stopped");
    Ok(())
}

fn status_command(cmd: StatusCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let path = config.bot.get_data_dir().join(LEDGER_FILE);

    let ledger = PositionLedger::load(&path)
        .with_context(|| format!("Failed to read ledger at {}", path.display()))?
        .unwrap_or_default();

    match cmd.format {
        OutputFormat::Json => {
            let positions: Vec<_> = ledger.positions().collect();
            println!("{}", serde_json::to_string_pretty(&positions)?);
        }
        OutputFormat::Text => {
            println!("Ledger: {}", path.display());
            if ledger.is_empty() {
                println!("No open positions");
                return Ok(());
            }

            let now = Utc::now();
            println!(
                "{:<12} {:<16} {:>14} {:>18} {:>8}",
                "SYMBOL", "TOKEN", "ENTRY ($)", "AMOUNT", "HELD"
            );
            for position in ledger.positions() {
                let amount = position
                    .token_amount()
                    .map(|a| a.round_dp(4).to_string())
                    .unwrap_or_else(|| position.amount.to_string());
                println!(
                    "{:<12} {:<16} {:>14} {:>18} {:>6}m",
                    position.symbol,
                    position.token_id,
                    position.entry_price,
                    amount,
                    position.held_minutes(now)
                );
            }
            println!(
                "{} of {} position slots used",
                ledger.len(),
                config.trading.max_positions
            );
        }
    }

    Ok(())
}

fn check_config_command(cmd: CheckConfigCmd) -> Result<()> {
    let config: Config = load_config(&cmd.config)
        .with_context(|| format!("Invalid configuration in {}", cmd.config.display()))?;

    println!("Configuration OK: {}", cmd.config.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    println!(
        "Trade size: {} BTC ({} sats)",
        config.trading.trade_size_btc(),
        units::btc_to_sats(config.trading.trade_size_btc()).unwrap_or_default()
    );
    println!("Data dir:   {}", config.bot.get_data_dir().display());
    Ok(())
}
