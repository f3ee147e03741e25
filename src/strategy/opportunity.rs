//! Opportunity Filter and Ranking
//!
//! A token is an entry candidate when every rule below holds:
//! 1. No open position for the token id
//! 2. Market cap inside `[min_market_cap_usd, max_market_cap_usd]`
//! 3. 24h volume at least `min_volume_usd`
//! 4. Bonding curve at least `min_bonding_curve_progress` complete
//! 5. Not graduated
//! 6. 24h change not below -10%
//!
//! Candidates are ranked by 24h volume, highest first.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config::TradingConfig;
use crate::domain::{PositionLedger, TokenSnapshot};

/// Tokens down more than this over 24h are never entered
pub const MIN_CHANGE_24H_PCT: Decimal = dec!(-10);

/// Ranked list length
pub const MAX_RANKED_OPPORTUNITIES: usize = 5;

/// First filter rule a snapshot failed
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    AlreadyHeld,
    MarketCapOutOfRange { market_cap_usd: Decimal },
    VolumeTooLow { volume_usd_24h: Decimal },
    BondingCurveTooEarly { progress: Decimal },
    Graduated,
    FallingPrice { change_24h: Decimal },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyHeld => write!(f, "position already open"),
            Rejection::MarketCapOutOfRange { market_cap_usd } => {
                write!(f, "market cap ${} out of range", market_cap_usd)
            }
            Rejection::VolumeTooLow { volume_usd_24h } => {
                write!(f, "24h volume ${} too low", volume_usd_24h)
            }
            Rejection::BondingCurveTooEarly { progress } => {
                write!(f, "bonding curve only {}% complete", progress)
            }
            Rejection::Graduated => write!(f, "already graduated"),
            Rejection::FallingPrice { change_24h } => {
                write!(f, "24h change {}% below {}%", change_24h, MIN_CHANGE_24H_PCT)
            }
        }
    }
}

/// Check a snapshot against the entry rules, returning the first one it fails
pub fn screen(
    token: &TokenSnapshot,
    ledger: &PositionLedger,
    config: &TradingConfig,
) -> Result<(), Rejection> {
    if ledger.contains(&token.id) {
        return Err(Rejection::AlreadyHeld);
    }

    if token.market_cap_usd < config.min_market_cap_usd
        || token.market_cap_usd > config.max_market_cap_usd
    {
        return Err(Rejection::MarketCapOutOfRange {
            market_cap_usd: token.market_cap_usd,
        });
    }

    if token.volume_usd_24h < config.min_volume_usd {
        return Err(Rejection::VolumeTooLow {
            volume_usd_24h: token.volume_usd_24h,
        });
    }

    if token.bonding_curve_progress < config.min_bonding_curve_progress {
        return Err(Rejection::BondingCurveTooEarly {
            progress: token.bonding_curve_progress,
        });
    }

    if token.is_graduated {
        return Err(Rejection::Graduated);
    }

    if token.change_24h < MIN_CHANGE_24H_PCT {
        return Err(Rejection::FallingPrice {
            change_24h: token.change_24h,
        });
    }

    Ok(())
}

pub fn is_eligible(token: &TokenSnapshot, ledger: &PositionLedger, config: &TradingConfig) -> bool {
    screen(token, ledger, config).is_ok()
}

/// Sort by 24h volume descending and keep the top entries.
/// The sort is stable: equal volumes keep their input order.
pub fn rank(mut candidates: Vec<TokenSnapshot>) -> Vec<TokenSnapshot> {
    candidates.sort_by(|a, b| b.volume_usd_24h.cmp(&a.volume_usd_24h));
    candidates.truncate(MAX_RANKED_OPPORTUNITIES);
    candidates
}

/// Filter then rank a batch of snapshots
pub fn find_opportunities(
    tokens: &[TokenSnapshot],
    ledger: &PositionLedger,
    config: &TradingConfig,
) -> Vec<TokenSnapshot> {
    let eligible = tokens
        .iter()
        .filter(|token| match screen(token, ledger, config) {
            Ok(()) => true,
            Err(rejection) => {
                tracing::debug!("Skipping {} ({}): {}", token.symbol, token.id, rejection);
                false
            }
        })
        .cloned()
        .collect();

    rank(eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Position;
    use chrono::Utc;
    use num_bigint::BigUint;

    fn scenario_config() -> TradingConfig {
        TradingConfig {
            min_market_cap_usd: dec!(10000),
            max_market_cap_usd: dec!(100000),
            min_volume_usd: dec!(1000),
            min_bonding_curve_progress: dec!(10),
            profit_target_pct: dec!(15),
            stop_loss_pct: dec!(10),
            ..TradingConfig::default()
        }
    }

    fn token(id: &str, volume: Decimal) -> TokenSnapshot {
        TokenSnapshot {
            id: id.to_string(),
            symbol: id.to_uppercase(),
            price_usd: dec!(0.01),
            market_cap_usd: dec!(50000),
            volume_usd_24h: volume,
            bonding_curve_progress: dec!(20),
            is_graduated: false,
            change_24h: dec!(2),
        }
    }

    fn held(id: &str) -> PositionLedger {
        let mut ledger = PositionLedger::new();
        ledger
            .open(Position::new(id, "HELD", dec!(0.01), BigUint::from(1u32), Utc::now()).unwrap())
            .unwrap();
        ledger
    }

    #[test]
    fn test_reference_snapshot_is_eligible() {
        let token = token("abc", dec!(5000));
        assert!(is_eligible(&token, &PositionLedger::new(), &scenario_config()));
    }

    #[test]
    fn test_held_token_never_eligible() {
        let token = token("abc", dec!(5000));
        assert_eq!(
            screen(&token, &held("abc"), &scenario_config()),
            Err(Rejection::AlreadyHeld)
        );
        // A different holding does not block it
        assert!(is_eligible(&token, &held("xyz"), &scenario_config()));
    }

    #[test]
    fn test_graduated_never_eligible() {
        let mut token = token("abc", dec!(1000000));
        token.is_graduated = true;
        token.bonding_curve_progress = dec!(100);
        assert_eq!(
            screen(&token, &PositionLedger::new(), &scenario_config()),
            Err(Rejection::Graduated)
        );
    }

    #[test]
    fn test_market_cap_bounds_inclusive() {
        let config = scenario_config();
        let ledger = PositionLedger::new();

        let mut token = token("abc", dec!(5000));
        token.market_cap_usd = dec!(10000);
        assert!(is_eligible(&token, &ledger, &config));
        token.market_cap_usd = dec!(100000);
        assert!(is_eligible(&token, &ledger, &config));

        token.market_cap_usd = dec!(9999.99);
        assert!(matches!(
            screen(&token, &ledger, &config),
            Err(Rejection::MarketCapOutOfRange { .. })
        ));
        token.market_cap_usd = dec!(100000.01);
        assert!(!is_eligible(&token, &ledger, &config));
    }

    #[test]
    fn test_volume_and_progress_thresholds() {
        let config = scenario_config();
        let ledger = PositionLedger::new();

        let low_volume = token("abc", dec!(999));
        assert!(matches!(
            screen(&low_volume, &ledger, &config),
            Err(Rejection::VolumeTooLow { .. })
        ));

        let mut early = token("abc", dec!(5000));
        early.bonding_curve_progress = dec!(9.9);
        assert!(matches!(
            screen(&early, &ledger, &config),
            Err(Rejection::BondingCurveTooEarly { .. })
        ));
    }

    #[test]
    fn test_falling_price_threshold() {
        let config = scenario_config();
        let ledger = PositionLedger::new();

        let mut token = token("abc", dec!(5000));
        token.change_24h = dec!(-10);
        assert!(is_eligible(&token, &ledger, &config));

        token.change_24h = dec!(-10.01);
        assert!(matches!(
            screen(&token, &ledger, &config),
            Err(Rejection::FallingPrice { .. })
        ));
    }

    #[test]
    fn test_rank_orders_by_volume_and_truncates() {
        let ranked = rank(vec![
            token("a", dec!(100)),
            token("b", dec!(700)),
            token("c", dec!(300)),
            token("d", dec!(900)),
            token("e", dec!(200)),
            token("f", dec!(500)),
        ]);

        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "f", "c", "e"]);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].volume_usd_24h >= pair[1].volume_usd_24h));
    }

    #[test]
    fn test_rank_is_stable_for_equal_volume() {
        let ranked = rank(vec![
            token("first", dec!(500)),
            token("top", dec!(800)),
            token("second", dec!(500)),
            token("third", dec!(500)),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "first", "second", "third"]);

        let reordered = rank(vec![
            token("third", dec!(500)),
            token("first", dec!(500)),
            token("second", dec!(500)),
        ]);
        let ids: Vec<&str> = reordered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_find_opportunities_filters_then_ranks() {
        let mut graduated = token("grad", dec!(99999));
        graduated.is_graduated = true;

        let tokens = vec![
            token("low", dec!(2000)),
            graduated,
            token("held", dec!(50000)),
            token("high", dec!(8000)),
        ];

        let found = find_opportunities(&tokens, &held("held"), &scenario_config());
        let ids: Vec<&str> = found.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low"]);
    }

    #[test]
    fn test_find_opportunities_empty_batch() {
        assert!(find_opportunities(&[], &PositionLedger::new(), &scenario_config()).is_empty());
    }
}
