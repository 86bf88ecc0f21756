//! Per-adapter set of pairs that are actively polled and scanned.

use dashmap::DashSet;

/// Concurrent set of subscribed pairs.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    pairs: DashSet<String>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the pair was not subscribed before.
    pub fn insert(&self, pair: &str) -> bool {
        self.pairs.insert(pair.to_string())
    }

    /// Returns `true` if the pair was subscribed.
    pub fn remove(&self, pair: &str) -> bool {
        self.pairs.remove(pair).is_some()
    }

    pub fn contains(&self, pair: &str) -> bool {
        self.pairs.contains(pair)
    }

    /// Point-in-time copy of the subscribed pairs, sorted.
    ///
    /// Loops iterate this copy, so subscriptions may change mid-pass.
    pub fn pairs(&self) -> Vec<String> {
        let mut out: Vec<String> = self.pairs.iter().map(|p| p.key().clone()).collect();
        out.sort();
        out
    }

    pub fn clear(&self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_contains() {
        let subs = SubscriptionRegistry::new();
        assert!(subs.insert("BTC/USDT"));
        assert!(!subs.insert("BTC/USDT"));
        assert!(subs.insert("ETH/USDT"));
        assert!(subs.contains("BTC/USDT"));
        assert_eq!(subs.len(), 2);

        assert!(subs.remove("BTC/USDT"));
        assert!(!subs.remove("BTC/USDT"));
        assert!(!subs.contains("BTC/USDT"));
        assert_eq!(subs.pairs(), vec!["ETH/USDT".to_string()]);
    }

    #[test]
    fn pairs_are_sorted_and_clear_empties() {
        let subs = SubscriptionRegistry::new();
        for p in ["SOL/USDT", "ADA/USDT", "ETH/BTC"] {
            subs.insert(p);
        }
        assert_eq!(subs.pairs(), vec!["ADA/USDT", "ETH/BTC", "SOL/USDT"]);
        subs.clear();
        assert!(subs.is_empty());
        assert!(subs.pairs().is_empty());
    }
}
