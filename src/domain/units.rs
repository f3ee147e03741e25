//! Unit Conversions
//!
//! Amounts move between three denominations:
//! - BTC as a decimal (`0.005`)
//! - "sats", the exchange's integer BTC unit. The exchange counts
//!   1 BTC = 1000 sats, not the on-chain 100,000,000.
//! - token base units, 10^11 per whole token
//!
//! Integer amounts are `BigUint` because token supplies overflow `u64`
//! once scaled by 10^11.

use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Sats per BTC under the exchange's convention
pub const SATS_PER_BTC: u64 = 1_000;

/// Base units per whole token
pub const TOKEN_BASE_UNITS: u64 = 100_000_000_000;

/// Convert a decimal to an integer amount, truncating the fraction.
/// Returns None for negative values.
pub fn decimal_to_biguint(value: Decimal) -> Option<BigUint> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value.trunc().to_u128().map(BigUint::from)
}

/// Convert an integer amount to a decimal.
/// Returns None if the amount exceeds the decimal range.
pub fn biguint_to_decimal(value: &BigUint) -> Option<Decimal> {
    value.to_u128().and_then(Decimal::from_u128)
}

/// BTC -> sats, rounding down
pub fn btc_to_sats(btc: Decimal) -> Option<BigUint> {
    btc.checked_mul(Decimal::from(SATS_PER_BTC))
        .and_then(|sats| decimal_to_biguint(sats.floor()))
}

/// sats -> BTC
pub fn sats_to_btc(sats: &BigUint) -> Option<Decimal> {
    biguint_to_decimal(sats).map(|s| s / Decimal::from(SATS_PER_BTC))
}

/// Token base units -> whole tokens
pub fn to_token_amount(base_units: &BigUint) -> Option<Decimal> {
    biguint_to_decimal(base_units).map(|units| units / Decimal::from(TOKEN_BASE_UNITS))
}

/// Whole tokens -> base units, rounding down
pub fn from_token_amount(tokens: Decimal) -> Option<BigUint> {
    tokens
        .checked_mul(Decimal::from(TOKEN_BASE_UNITS))
        .and_then(|units| decimal_to_biguint(units.floor()))
}

/// Percentage change from `original` to `new_value`. Zero when `original` is zero,
/// `None` when the result does not fit in a `Decimal`.
pub fn percent_difference(original: Decimal, new_value: Decimal) -> Option<Decimal> {
    if original.is_zero() {
        return Some(Decimal::ZERO);
    }
    new_value
        .checked_sub(original)?
        .checked_div(original)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Serde adapter storing `BigUint` as a decimal string
pub mod biguint_string {
    use super::*;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BigUint::from_str(raw.trim()).map_err(D::Error::custom)
    }
}
