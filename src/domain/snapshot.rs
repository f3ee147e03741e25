use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time market view of one token.
///
/// Field names follow the exchange's JSON (`priceUsd`, `volumeUsd24h`, ...),
/// so recorded API payloads deserialize without a mapping layer. Extra
/// fields in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    /// Token identifier
    pub id: String,
    /// Ticker symbol
    pub symbol: String,
    /// Current price in USD
    pub price_usd: Decimal,
    /// Market capitalization in USD
    pub market_cap_usd: Decimal,
    /// 24h trading volume in USD
    pub volume_usd_24h: Decimal,
    /// Bonding curve completion, 0-100
    pub bonding_curve_progress: Decimal,
    /// True once the token has left the bonding curve for a liquidity pool
    pub is_graduated: bool,
    /// 24h price change in percent
    pub change_24h: Decimal,
}
