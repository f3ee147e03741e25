use std::fmt;

use num_bigint::BigUint;
use rust_decimal::{Decimal, RoundingStrategy};

use super::position::Position;
use super::snapshot::TokenSnapshot;

/// Why a position is being closed
#[derive(Debug, Clone, PartialEq)]
pub enum ExitReason {
    ProfitTarget { profit_pct: Decimal },
    StopLoss { profit_pct: Decimal },
    TimeExit { held_minutes: i64 },
}

impl ExitReason {
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::ProfitTarget { .. } => "profit target reached",
            ExitReason::StopLoss { .. } => "stop loss triggered",
            ExitReason::TimeExit { .. } => "time-based exit",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::ProfitTarget { profit_pct } | ExitReason::StopLoss { profit_pct } => {
                let rounded =
                    profit_pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                write!(f, "{}: {:.2}%", self.label(), rounded)
            }
            ExitReason::TimeExit { held_minutes } => {
                write!(f, "{}: held for {} minutes", self.label(), held_minutes)
            }
        }
    }
}

/// Buy instruction produced by the entry decision
#[derive(Debug, Clone, PartialEq)]
pub struct BuyOrder {
    pub token: TokenSnapshot,
    /// Trade size in BTC
    pub btc_amount: Decimal,
    /// Trade size in exchange sats
    pub amount_sats: BigUint,
}

/// Output of a decision
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Buy(BuyOrder),
    Sell {
        position: Position,
        current_price: Decimal,
        reason: ExitReason,
    },
    Hold,
}

impl Action {
    pub fn is_buy(&self) -> bool {
        matches!(self, Action::Buy(_))
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Action::Sell { .. })
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Action::Hold)
    }

    /// Exit reason for a sell, None otherwise
    pub fn exit_reason(&self) -> Option<&ExitReason> {
        match self {
            Action::Sell { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exit_reason_audit_strings() {
        let reason = ExitReason::ProfitTarget { profit_pct: dec!(16) };
        assert_eq!(reason.to_string(), "profit target reached: 16.00%");

        let reason = ExitReason::StopLoss { profit_pct: dec!(-11.456) };
        assert_eq!(reason.to_string(), "stop loss triggered: -11.46%");

        let reason = ExitReason::ProfitTarget { profit_pct: dec!(15.005) };
        assert_eq!(reason.to_string(), "profit target reached: 15.01%");

        let reason = ExitReason::TimeExit { held_minutes: 125 };
        assert_eq!(reason.to_string(), "time-based exit: held for 125 minutes");
    }

    #[test]
    fn test_action_predicates() {
        assert!(Action::Hold.is_hold());
        assert!(!Action::Hold.is_buy());
        assert!(Action::Hold.exit_reason().is_none());
    }
}
