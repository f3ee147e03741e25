use crate::domain::{units, Action, BuyOrder, PositionLedger, TokenSnapshot};

use super::config::TradingConfig;

/// Buy the top-ranked opportunity when there is room for another position.
///
/// `ranked` must already be filtered and ordered, see
/// [`find_opportunities`](super::opportunity::find_opportunities).
pub fn decide_entry(
    ranked: &[TokenSnapshot],
    ledger: &PositionLedger,
    config: &TradingConfig,
) -> Action {
    if ledger.len() >= config.max_positions {
        return Action::Hold;
    }

    let Some(token) = ranked.first() else {
        return Action::Hold;
    };

    let btc_amount = config.trade_size_btc();
    match units::btc_to_sats(btc_amount) {
        Some(amount_sats) => Action::Buy(BuyOrder {
            token: token.clone(),
            btc_amount,
            amount_sats,
        }),
        None => Action::Hold,
    }
}
