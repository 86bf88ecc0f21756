//! Shared test fixtures and helpers.
//!
//! Provides a canned-response [`FakeHttp`] and a minimal "fake" exchange
//! definition so adapter, registry and watch-service tests run without a
//! network.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use vw_core::{ExchangePair, VwError};

use crate::adapter::{AdapterDeps, AdapterDef, Pacing, ParsedBook, symbol_query_formatter};
use crate::found_volume::FoundVolumeCache;
use crate::http::HttpGet;
use crate::json_util::parse_levels;
use crate::users::Watchlist;

/// [`HttpGet`] serving canned bodies by exact URL; unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeHttp {
    bodies: DashMap<String, Vec<u8>>,
    calls: DashMap<String, usize>,
    total: AtomicUsize,
    delay_ms: AtomicU64,
}

impl FakeHttp {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.bodies.insert(url.to_string(), body.into());
    }

    pub(crate) fn remove(&self, url: &str) {
        self.bodies.remove(url);
    }

    /// Hold every response for `delay` before answering.
    pub(crate) fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map(|c| *c).unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpGet for FakeHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>, VwError> {
        *self.calls.entry(url.to_string()).or_default() += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        match self.bodies.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(VwError::HttpStatus { status: 404, url: url.to_string() }),
        }
    }
}

/// `{"asks": [[p, v], ...], "bids": [[p, v], ...]}`.
pub(crate) fn depth_json(asks: &[(&str, &str)], bids: &[(&str, &str)]) -> String {
    serde_json::json!({ "asks": asks, "bids": bids }).to_string()
}

/// `{"symbols": [{"base": .., "quote": ..}, ...]}`.
pub(crate) fn catalogue_json(pairs: &[(&str, &str)]) -> String {
    let symbols: Vec<serde_json::Value> =
        pairs.iter().map(|(b, q)| serde_json::json!({ "base": b, "quote": q })).collect();
    serde_json::json!({ "symbols": symbols }).to_string()
}

#[derive(Deserialize)]
struct FakeCatalogue {
    symbols: Vec<FakeSymbol>,
}

#[derive(Deserialize)]
struct FakeSymbol {
    base: String,
    quote: String,
    symbol: Option<String>,
}

#[derive(Deserialize)]
struct FakeDepth {
    #[serde(default)]
    asks: Vec<serde_json::Value>,
    #[serde(default)]
    bids: Vec<serde_json::Value>,
}

fn parse_fake_catalogue(exchange: &str, body: &[u8]) -> Result<Vec<ExchangePair>, VwError> {
    let cat: FakeCatalogue = serde_json::from_slice(body).map_err(|e| VwError::Parse(e.to_string()))?;
    Ok(cat
        .symbols
        .into_iter()
        .map(|s| {
            let mut p = ExchangePair::new(&s.base, &s.quote, exchange);
            if let Some(symbol) = s.symbol {
                p.symbol = symbol;
            }
            p
        })
        .collect())
}

fn parse_fake_depth(body: &[u8]) -> Result<ParsedBook, VwError> {
    let d: FakeDepth = serde_json::from_slice(body).map_err(|e| VwError::Parse(e.to_string()))?;
    Ok(ParsedBook { asks: parse_levels(&d.asks), bids: parse_levels(&d.bids) })
}

/// Adapter definition pointing at `http://fake/...` with default pacing.
pub(crate) fn fake_def(name: &str) -> AdapterDef {
    AdapterDef {
        name: name.to_string(),
        pairs_url: "http://fake/pairs".into(),
        orderbook_url: "http://fake/depth?symbol=".into(),
        url_formatter: Box::new(symbol_query_formatter),
        catalogue_parser: Box::new(parse_fake_catalogue),
        orderbook_parser: Box::new(parse_fake_depth),
        pacing: Pacing::default(),
    }
}

pub(crate) fn deps(http: Arc<FakeHttp>, watchlist: Arc<Watchlist>, found: Arc<FoundVolumeCache>) -> AdapterDeps {
    AdapterDeps { http, users: watchlist.clone(), user_pairs: watchlist, found }
}

