//! Concurrent per-pair order-book store.
//!
//! Each pair maps to an immutable [`OrderbookSnapshot`] published behind an
//! `Arc`. An upsert builds the whole replacement snapshot (both sides, both
//! sort orders) before a single map insert, so readers see either the old or
//! the new book in full.
//!
//! Sorted views are built once per upsert rather than per query: a snapshot
//! is searched once per watching user on every scan pass, far more often than
//! it is replaced.

pub mod search;

use std::sync::Arc;

use ahash::AHashMap;
use dashmap::DashMap;
use tracing::debug;
use vw_core::{FoundVolume, PriceLevel, Side, time_util};

use crate::json_util::parse_decimal;

/// One `[price, volume]` level as received from an exchange, still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLevel {
    pub price: String,
    pub volume: String,
}

impl RawLevel {
    pub fn new(price: impl Into<String>, volume: impl Into<String>) -> Self {
        Self { price: price.into(), volume: volume.into() }
    }
}

// ---------------------------------------------------------------------------
// BookSide
// ---------------------------------------------------------------------------

/// One side of a snapshot: the price-keyed map plus its two sorted views.
#[derive(Debug, Default)]
pub struct BookSide {
    levels: AHashMap<String, PriceLevel>,
    by_price: Vec<PriceLevel>,
    by_volume: Vec<PriceLevel>,
}

impl BookSide {
    /// Build a side from raw exchange levels.
    ///
    /// Levels whose price or volume is not a finite number, or whose price is
    /// not positive, are skipped; the second return value counts them. A price
    /// repeated within one response keeps its last volume and last spelling,
    /// so `"50000"` and `"50000.0"` are one level.
    pub fn build(raw: &[RawLevel]) -> (Self, usize) {
        let mut levels = AHashMap::with_capacity(raw.len());
        let mut spelling: AHashMap<u64, String> = AHashMap::with_capacity(raw.len());
        let mut rejected = 0;

        for level in raw {
            match (parse_decimal(&level.price), parse_decimal(&level.volume)) {
                (Some(price), Some(volume)) if price > 0.0 => {
                    if let Some(prev) = spelling.insert(price.to_bits(), level.price.clone()) {
                        if prev != level.price {
                            levels.remove(&prev);
                        }
                    }
                    levels.insert(level.price.clone(), PriceLevel::new(price, volume));
                }
                _ => rejected += 1,
            }
        }

        let mut by_price: Vec<PriceLevel> = levels.values().copied().collect();
        by_price.sort_by(|a, b| a.price.total_cmp(&b.price));

        // Stable sort of the price-ordered view: equal volumes stay in price order.
        let mut by_volume = by_price.clone();
        by_volume.sort_by(|a, b| a.volume.total_cmp(&b.volume));

        (Self { levels, by_price, by_volume }, rejected)
    }

    /// Price text → volume.
    pub fn volumes(&self) -> AHashMap<String, f64> {
        self.levels.iter().map(|(k, l)| (k.clone(), l.volume)).collect()
    }

    /// Volume resting at `price` (exchange text form).
    pub fn volume_at(&self, price: &str) -> Option<f64> {
        self.levels.get(price).map(|l| l.volume)
    }

    /// Levels ascending by price.
    pub fn by_price(&self) -> &[PriceLevel] {
        &self.by_price
    }

    /// Levels ascending by volume, ties in ascending price.
    pub fn by_volume(&self) -> &[PriceLevel] {
        &self.by_volume
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// OrderbookSnapshot
// ---------------------------------------------------------------------------

/// Full order-book state of one pair at one point in time.
#[derive(Debug)]
pub struct OrderbookSnapshot {
    pub pair: String,
    pub asks: BookSide,
    pub bids: BookSide,
    pub updated_at_ms: u64,
}

impl OrderbookSnapshot {
    pub fn build(pair: &str, asks: &[RawLevel], bids: &[RawLevel]) -> Self {
        let (asks_side, rejected_asks) = BookSide::build(asks);
        let (bids_side, rejected_bids) = BookSide::build(bids);
        if rejected_asks + rejected_bids > 0 {
            debug!("{pair}: skipped {rejected_asks} ask / {rejected_bids} bid levels with malformed numbers");
        }
        Self {
            pair: pair.to_string(),
            asks: asks_side,
            bids: bids_side,
            updated_at_ms: time_util::now_ms(),
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Ask => &self.asks,
            Side::Bid => &self.bids,
        }
    }

    /// Lowest ask price.
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.by_price.first().map(|l| l.price)
    }

    /// Highest bid price.
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.by_price.last().map(|l| l.price)
    }

    /// Search one side for the smallest level meeting `threshold`.
    ///
    /// `difference` is the percent distance from the same-side top of book:
    /// `(price - best_ask) / price` for asks, `(best_bid - price) / best_bid`
    /// for bids. Both are zero when the wall sits at the top of book.
    pub fn search(&self, exchange: &str, side: Side, threshold: f64) -> FoundVolume {
        let book = self.side(side);
        let Some((index, level)) = search::find_volume_cluster(book.by_volume(), threshold) else {
            return FoundVolume::not_found(&self.pair, exchange, side);
        };

        let difference = match side {
            Side::Ask => {
                let best = self.best_ask().unwrap_or(level.price);
                (level.price - best) / level.price * 100.0
            }
            Side::Bid => {
                let best = self.best_bid().unwrap_or(level.price);
                (best - level.price) / best * 100.0
            }
        };

        FoundVolume {
            exchange: exchange.to_string(),
            pair: self.pair.clone(),
            side,
            price: level.price,
            volume: level.volume,
            difference,
            index,
            volume_time_found: time_util::now_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// OrderbookStore
// ---------------------------------------------------------------------------

/// Concurrent map from pair to its latest snapshot.
///
/// Safe for any number of concurrent readers and writers; there is no
/// transaction spanning more than one pair.
#[derive(Debug, Default)]
pub struct OrderbookStore {
    books: DashMap<String, Arc<OrderbookSnapshot>>,
}

impl OrderbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for `pair`.
    ///
    /// The replacement is built completely before it is published, and it
    /// replaces the previous snapshot rather than merging with it. Concurrent
    /// upserts of the same pair resolve to whichever insert lands last.
    pub fn upsert(&self, pair: &str, asks: &[RawLevel], bids: &[RawLevel]) {
        let snapshot = Arc::new(OrderbookSnapshot::build(pair, asks, bids));
        self.books.insert(pair.to_string(), snapshot);
    }

    /// Current snapshot of `pair`, if it was ever upserted.
    pub fn snapshot(&self, pair: &str) -> Option<Arc<OrderbookSnapshot>> {
        self.books.get(pair).map(|entry| Arc::clone(entry.value()))
    }

    /// Ask price → volume for `pair`; empty when unknown.
    pub fn asks(&self, pair: &str) -> AHashMap<String, f64> {
        self.snapshot(pair).map(|s| s.asks.volumes()).unwrap_or_default()
    }

    /// Bid price → volume for `pair`; empty when unknown.
    pub fn bids(&self, pair: &str) -> AHashMap<String, f64> {
        self.snapshot(pair).map(|s| s.bids.volumes()).unwrap_or_default()
    }

    /// Search both sides of `pair` for a wall of at least `threshold`.
    ///
    /// Always returns the ask result first and the bid result second. A side
    /// without a qualifying level, or a pair without a snapshot, yields the
    /// zero-price "not found" value for that side.
    pub fn search_volume(&self, pair: &str, exchange: &str, threshold: f64) -> [FoundVolume; 2] {
        match self.snapshot(pair) {
            Some(snapshot) => Side::BOTH.map(|side| snapshot.search(exchange, side, threshold)),
            None => Side::BOTH.map(|side| FoundVolume::not_found(pair, exchange, side)),
        }
    }

    /// Drop the snapshot of `pair`.
    pub fn remove(&self, pair: &str) -> bool {
        self.books.remove(pair).is_some()
    }

    /// Pairs that currently have a snapshot, sorted.
    pub fn pairs(&self) -> Vec<String> {
        let mut pairs: Vec<String> = self.books.iter().map(|e| e.key().clone()).collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
