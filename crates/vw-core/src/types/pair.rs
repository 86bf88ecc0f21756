//! Pair identifiers, catalogue entries and per-user watch settings.
//!
//! Pairs are carried around in `BASE/QUOTE` form (e.g. `"BTC/USDT"`); the
//! exchange-native symbol (`"BTCUSDT"`) only appears in request URLs.

use serde::{Deserialize, Serialize};

/// Identifier of a watching user.
pub type UserId = u64;

/// One tradable pair from an exchange's instrument listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangePair {
    /// `BASE/QUOTE`.
    pub pair: String,
    /// Adapter name, e.g. `"binance_spot"`.
    pub exchange: String,
    /// Exchange-native symbol, e.g. `"BTCUSDT"`.
    pub symbol: String,
}

impl ExchangePair {
    pub fn new(base: &str, quote: &str, exchange: &str) -> Self {
        Self {
            pair: make_pair(base, quote),
            exchange: exchange.to_string(),
            symbol: format!("{base}{quote}"),
        }
    }
}

/// A user's watch setting for one pair on one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPair {
    pub user_id: UserId,
    /// Adapter name, e.g. `"binance_spot"`.
    pub exchange: String,
    /// `BASE/QUOTE`.
    pub pair: String,
    /// Minimum resting volume that counts as a wall.
    #[serde(rename = "exact_value")]
    pub threshold: f64,
}

impl UserPair {
    pub fn new(user_id: UserId, exchange: &str, pair: &str, threshold: f64) -> Self {
        Self { user_id, exchange: exchange.to_string(), pair: pair.to_string(), threshold }
    }

    #[inline]
    pub fn matches(&self, exchange: &str, pair: &str) -> bool {
        self.exchange == exchange && self.pair == pair
    }
}

/// Join base and quote assets into `BASE/QUOTE`.
#[inline]
pub fn make_pair(base: &str, quote: &str) -> String {
    format!("{base}/{quote}")
}

/// Convert `BASE/QUOTE` into the exchange-native symbol (`BASEQUOTE`).
#[inline]
pub fn pair_to_symbol(pair: &str) -> String {
    pair.replace('/', "")
}

/// Returns `true` for a well-formed `BASE/QUOTE` identifier.
pub fn is_valid_pair(pair: &str) -> bool {
    match pair.split_once('/') {
        Some((base, quote)) => {
            !base.is_empty()
                && !quote.is_empty()
                && !quote.contains('/')
                && pair.chars().all(|c| c.is_ascii_alphanumeric() || c == '/')
        }
        None => false,
    }
}
