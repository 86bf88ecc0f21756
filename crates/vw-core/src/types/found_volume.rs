//! Detected volume clusters ("walls") and their cache keys.

use serde::{Deserialize, Serialize};

use super::enums::Side;

/// One `(price, volume)` level of a sorted book side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub volume: f64,
}

impl PriceLevel {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }
}

/// A price level whose resting volume met a user's threshold.
///
/// The zero value (`price == 0.0`) means "nothing found this cycle"; the
/// found-volume cache treats it as a removal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoundVolume {
    pub exchange: String,
    pub pair: String,
    pub side: Side,
    pub price: f64,
    pub volume: f64,
    /// Percent distance from the same-side top of book.
    pub difference: f64,
    /// Position within the volume-sorted side the search ran on.
    pub index: usize,
    /// Milliseconds since the Unix epoch; 0 when nothing was found.
    pub volume_time_found: u64,
}

impl FoundVolume {
    /// "Nothing found" result for one side of a pair.
    pub fn not_found(pair: &str, exchange: &str, side: Side) -> Self {
        Self {
            exchange: exchange.to_string(),
            pair: pair.to_string(),
            side,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.price != 0.0
    }

    pub fn level_key(&self) -> LevelKey {
        LevelKey::new(&self.pair, &self.exchange, self.side)
    }
}

/// Cache key of a found volume within one user's results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelKey {
    pub exchange: String,
    pub pair: String,
    pub side: Side,
}

impl LevelKey {
    pub fn new(pair: &str, exchange: &str, side: Side) -> Self {
        Self { exchange: exchange.to_string(), pair: pair.to_string(), side }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_sentinel() {
        let fv = FoundVolume::not_found("BTC/USDT", "binance_spot", Side::Bid);
        assert!(!fv.is_found());
        assert_eq!(fv.level_key(), LevelKey::new("BTC/USDT", "binance_spot", Side::Bid));
    }

    #[test]
    fn serializes_for_clients() {
        let fv = FoundVolume {
            exchange: "bybit_spot".into(),
            pair: "ETH/USDT".into(),
            side: Side::Ask,
            price: 3000.5,
            volume: 42.0,
            difference: 0.25,
            index: 7,
            volume_time_found: 1_700_000_000_000,
        };
        let v = serde_json::to_value(&fv).unwrap();
        assert_eq!(v["side"], "asks");
        assert_eq!(v["index"], 7);
        assert_eq!(v["volume_time_found"], 1_700_000_000_000u64);
    }
}
