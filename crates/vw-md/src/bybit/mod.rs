//! Bybit v5 REST adapters.
//!
//! Two categories on the same endpoints:
//! - Spot (`category=spot`)
//! - USDT linear perpetuals (`category=linear`)
//!
//! Every v5 response is wrapped in a `retCode` / `retMsg` / `result` envelope;
//! see [`json_parser`].

pub mod json_parser;

use vw_core::config::AdapterConfig;

use crate::adapter::{AdapterDef, Pacing, symbol_query_formatter};

const BYBIT_REST_URL: &str = "https://api.bytick.com";

/// Order-book depth requested unless the config overrides it (spot max).
pub const DEFAULT_DEPTH_LIMIT: u32 = 200;

/// Bybit spot.
pub fn spot(cfg: &AdapterConfig) -> AdapterDef {
    build(cfg, "spot")
}

/// Bybit linear futures.
pub fn futures(cfg: &AdapterConfig) -> AdapterDef {
    build(cfg, "linear")
}

fn build(cfg: &AdapterConfig, category: &str) -> AdapterDef {
    let base = cfg.rest_url.as_deref().unwrap_or(BYBIT_REST_URL).trim_end_matches('/');
    let limit = cfg.depth_limit.unwrap_or(DEFAULT_DEPTH_LIMIT);

    AdapterDef {
        name: cfg.name.clone(),
        pairs_url: format!("{base}/v5/market/instruments-info?category={category}"),
        orderbook_url: format!("{base}/v5/market/orderbook?category={category}&symbol=&limit={limit}"),
        url_formatter: Box::new(symbol_query_formatter),
        catalogue_parser: Box::new(json_parser::parse_instruments),
        orderbook_parser: Box::new(json_parser::parse_orderbook),
        pacing: Pacing::from_config(cfg),
    }
}
