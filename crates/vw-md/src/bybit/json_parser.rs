//! Bybit v5 REST response parsers.
//!
//! Responses look like `{"retCode": 0, "retMsg": "OK", "result": {...}}`. A
//! non-zero `retCode` is reported as a parse error carrying `retMsg`, since
//! the HTTP status is 200 either way.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use vw_core::{ExchangePair, VwError};

use crate::adapter::ParsedBook;
use crate::json_util::parse_levels;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Deserialize)]
struct InstrumentsResult {
    #[serde(default)]
    list: Vec<Instrument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    base_coin: String,
    quote_coin: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct OrderbookResult {
    #[serde(default)]
    a: Vec<serde_json::Value>,
    #[serde(default)]
    b: Vec<serde_json::Value>,
}

fn unwrap_envelope<T: DeserializeOwned>(what: &str, body: &[u8]) -> Result<T, VwError> {
    let env: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| VwError::Parse(format!("bybit {what}: {e}")))?;
    if env.ret_code != 0 {
        return Err(VwError::Parse(format!("bybit {what}: retCode {} ({})", env.ret_code, env.ret_msg)));
    }
    env.result.ok_or_else(|| VwError::Parse(format!("bybit {what}: missing result")))
}

/// Parse `GET /v5/market/instruments-info` into tradable pairs.
pub fn parse_instruments(exchange: &str, body: &[u8]) -> Result<Vec<ExchangePair>, VwError> {
    let result: InstrumentsResult = unwrap_envelope("instruments-info", body)?;
    Ok(result
        .list
        .into_iter()
        .filter(|i| i.status == "Trading")
        .map(|i| ExchangePair {
            pair: vw_core::make_pair(&i.base_coin, &i.quote_coin),
            exchange: exchange.to_string(),
            symbol: i.symbol,
        })
        .collect())
}

/// Parse `GET /v5/market/orderbook` into asks (`a`) and bids (`b`).
pub fn parse_orderbook(body: &[u8]) -> Result<ParsedBook, VwError> {
    let result: OrderbookResult = unwrap_envelope("orderbook", body)?;
    Ok(ParsedBook { asks: parse_levels(&result.a), bids: parse_levels(&result.b) })
}
