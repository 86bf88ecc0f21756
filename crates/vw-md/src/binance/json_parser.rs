//! Binance REST response parsers.
//!
//! `exchangeInfo` and `depth` share their shape across spot, USDⓈ-M futures
//! and Binance.US; futures responses carry a few extra fields that serde
//! ignores.

use serde::Deserialize;
use vw_core::{ExchangePair, VwError};

use crate::adapter::ParsedBook;
use crate::json_util::parse_levels;

/// Quote asset excluded from the catalogue (delisted stablecoin).
const EXCLUDED_QUOTE: &str = "BUSD";

#[derive(Deserialize)]
struct ExchangeInfo {
    #[serde(default)]
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    status: String,
    base_asset: String,
    quote_asset: String,
}

#[derive(Deserialize)]
struct Depth {
    #[serde(default)]
    asks: Vec<serde_json::Value>,
    #[serde(default)]
    bids: Vec<serde_json::Value>,
}

/// Binance error body, e.g. `{"code": -1121, "msg": "Invalid symbol."}`.
#[derive(Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Parse `GET /exchangeInfo` into the trading pairs of the market.
///
/// Symbols that are not `TRADING`, or quoted in BUSD, are skipped.
pub fn parse_exchange_info(exchange: &str, body: &[u8]) -> Result<Vec<ExchangePair>, VwError> {
    let info: ExchangeInfo = serde_json::from_slice(body)
        .map_err(|e| VwError::Parse(format!("binance exchangeInfo: {e}")))?;

    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING" && s.quote_asset != EXCLUDED_QUOTE)
        .map(|s| ExchangePair {
            pair: vw_core::make_pair(&s.base_asset, &s.quote_asset),
            exchange: exchange.to_string(),
            symbol: s.symbol,
        })
        .collect())
}

/// Parse `GET /depth` into asks and bids.
pub fn parse_depth(body: &[u8]) -> Result<ParsedBook, VwError> {
    if let Ok(err) = serde_json::from_slice::<ApiError>(body) {
        return Err(VwError::Parse(format!("binance error {}: {}", err.code, err.msg)));
    }
    let depth: Depth =
        serde_json::from_slice(body).map_err(|e| VwError::Parse(format!("binance depth: {e}")))?;
    Ok(ParsedBook { asks: parse_levels(&depth.asks), bids: parse_levels(&depth.bids) })
}
