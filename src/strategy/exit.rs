use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{Action, ExitReason, Position};

use super::config::TradingConfig;

/// Decide whether to close `position` at `current_price`.
///
/// Rules are checked in order and the first match wins:
/// profit target, stop loss, then maximum hold time. When the profit cannot
/// be computed at `current_price` the position is held.
pub fn decide_exit(
    position: &Position,
    current_price: Decimal,
    now: DateTime<Utc>,
    config: &TradingConfig,
) -> Action {
    match exit_reason(position, current_price, now, config) {
        Some(reason) => Action::Sell {
            position: position.clone(),
            current_price,
            reason,
        },
        None => Action::Hold,
    }
}

fn exit_reason(
    position: &Position,
    current_price: Decimal,
    now: DateTime<Utc>,
    config: &TradingConfig,
) -> Option<ExitReason> {
    let profit_pct = position.profit_pct(current_price)?;

    if profit_pct >= config.profit_target_pct {
        return Some(ExitReason::ProfitTarget { profit_pct });
    }

    if profit_pct <= -config.stop_loss_pct {
        return Some(ExitReason::StopLoss { profit_pct });
    }

    // Strictly longer than the limit; compared on the full duration, not whole minutes
    let held = position.held_for(now);
    if held > chrono::Duration::minutes(i64::from(config.max_hold_minutes)) {
        return Some(ExitReason::TimeExit {
            held_minutes: held.num_minutes(),
        });
    }

    None
}
