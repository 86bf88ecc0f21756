//! Shared JSON parsing helpers used by all exchange parsers.
//!
//! Exchanges encode prices and volumes either as JSON strings (`"30000.5"`)
//! or native numbers (`30000.5`). Levels are kept as text until the order-book
//! store parses them, so the price text can serve as the map key.

use crate::orderbook::RawLevel;

/// Parse a decimal string as a finite `f64`.
#[inline]
pub fn parse_decimal(s: &str) -> Option<f64> {
    let v: f64 = fast_float2::parse(s.trim()).ok()?;
    v.is_finite().then_some(v)
}

/// Render a JSON string or number as text. Other JSON types yield `None`.
#[inline]
pub fn value_to_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convert `[[price, volume, ...], ...]` arrays into [`RawLevel`]s.
///
/// Entries that are not arrays, or lack a price or volume, are dropped.
/// Extra trailing elements (order counts etc.) are ignored.
pub fn parse_levels(levels: &[serde_json::Value]) -> Vec<RawLevel> {
    levels
        .iter()
        .filter_map(|level| {
            let arr = level.as_array()?;
            let price = value_to_text(arr.first()?)?;
            let volume = value_to_text(arr.get(1)?)?;
            Some(RawLevel { price, volume })
        })
        .collect()
}
