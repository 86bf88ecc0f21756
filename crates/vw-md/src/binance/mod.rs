//! Binance REST adapters.
//!
//! Three markets share one wire format:
//! - Spot (`api.binance.com/api/v3`)
//! - USDⓈ-M futures (`fapi.binance.com/fapi/v1`)
//! - Binance.US (`api.binance.us/api/v3`)
//!
//! Each produces an [`AdapterDef`] polling `/depth` and listing pairs from
//! `/exchangeInfo`.

pub mod json_parser;

use vw_core::config::AdapterConfig;

use crate::adapter::{AdapterDef, Pacing, symbol_query_formatter};

const BINANCE_SPOT_REST_URL: &str = "https://api.binance.com";
const BINANCE_FUTURES_REST_URL: &str = "https://fapi.binance.com";
const BINANCE_US_REST_URL: &str = "https://api.binance.us";

/// Order-book depth requested unless the config overrides it.
pub const DEFAULT_DEPTH_LIMIT: u32 = 500;

/// Binance spot.
pub fn spot(cfg: &AdapterConfig) -> AdapterDef {
    build(cfg, BINANCE_SPOT_REST_URL, "/api/v3")
}

/// Binance USDⓈ-M futures.
pub fn futures(cfg: &AdapterConfig) -> AdapterDef {
    build(cfg, BINANCE_FUTURES_REST_URL, "/fapi/v1")
}

/// Binance.US spot.
pub fn us(cfg: &AdapterConfig) -> AdapterDef {
    build(cfg, BINANCE_US_REST_URL, "/api/v3")
}

fn build(cfg: &AdapterConfig, default_base: &str, path: &str) -> AdapterDef {
    let base = cfg.rest_url.as_deref().unwrap_or(default_base).trim_end_matches('/');
    let limit = cfg.depth_limit.unwrap_or(DEFAULT_DEPTH_LIMIT);

    AdapterDef {
        name: cfg.name.clone(),
        pairs_url: format!("{base}{path}/exchangeInfo"),
        orderbook_url: format!("{base}{path}/depth?symbol=&limit={limit}"),
        url_formatter: Box::new(symbol_query_formatter),
        catalogue_parser: Box::new(json_parser::parse_exchange_info),
        orderbook_parser: Box::new(json_parser::parse_depth),
        pacing: Pacing::from_config(cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints() {
        let def = spot(&AdapterConfig::named("binance_spot"));
        assert_eq!(def.pairs_url, "https://api.binance.com/api/v3/exchangeInfo");
        assert_eq!(
            (def.url_formatter)(&def.orderbook_url, "BTCUSDT"),
            "https://api.binance.com/api/v3/depth?symbol=BTCUSDT&limit=500"
        );

        let def = futures(&AdapterConfig::named("binance_futures"));
        assert_eq!(def.pairs_url, "https://fapi.binance.com/fapi/v1/exchangeInfo");
        assert_eq!(
            (def.url_formatter)(&def.orderbook_url, "ETHUSDT"),
            "https://fapi.binance.com/fapi/v1/depth?symbol=ETHUSDT&limit=500"
        );

        let def = us(&AdapterConfig::named("binance_us"));
        assert_eq!(def.name, "binance_us");
        assert_eq!(def.pairs_url, "https://api.binance.us/api/v3/exchangeInfo");
    }

    #[test]
    fn config_overrides() {
        let cfg = AdapterConfig {
            rest_url: Some("http://localhost:8080/".into()),
            depth_limit: Some(100),
            request_delay_ms: Some(250),
            ..AdapterConfig::named("binance_spot")
        };
        let def = spot(&cfg);
        assert_eq!(def.pairs_url, "http://localhost:8080/api/v3/exchangeInfo");
        assert_eq!(
            (def.url_formatter)(&def.orderbook_url, "SOLUSDT"),
            "http://localhost:8080/api/v3/depth?symbol=SOLUSDT&limit=100"
        );
        assert_eq!(def.pacing.request_delay.as_millis(), 250);
    }
}
