//! Per-user cache of the walls found by the latest scans.
//!
//! Entries are keyed by `(pair, exchange, side)` within each user. Writing a
//! "not found" result (`price == 0`) removes the level instead of storing it,
//! so the cache only ever holds live walls.

use ahash::AHashMap;
use dashmap::DashMap;
use vw_core::{FoundVolume, LevelKey, Side, UserId};

/// Concurrent found-volume cache, shared by every adapter's scan loop.
#[derive(Debug, Default)]
pub struct FoundVolumeCache {
    users: DashMap<UserId, AHashMap<LevelKey, FoundVolume>>,
}

impl FoundVolumeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `found` for `user`, or drop its level when nothing was found.
    pub fn upsert(&self, user: UserId, found: FoundVolume) {
        let key = found.level_key();
        if found.is_found() {
            self.users.entry(user).or_default().insert(key, found);
            return;
        }
        // Never create a user entry just to remove from it.
        if let Some(mut levels) = self.users.get_mut(&user) {
            levels.remove(&key);
        }
        self.users.remove_if(&user, |_, levels| levels.is_empty());
    }

    /// Remove both sides of `pair` on `exchange` for `user`.
    pub fn delete(&self, user: UserId, pair: &str, exchange: &str) {
        if let Some(mut levels) = self.users.get_mut(&user) {
            for side in Side::BOTH {
                levels.remove(&LevelKey::new(pair, exchange, side));
            }
        }
        self.users.remove_if(&user, |_, levels| levels.is_empty());
    }

    /// Every live wall of `user`, sorted by exchange, pair and side.
    pub fn get_all(&self, user: UserId) -> Vec<FoundVolume> {
        let Some(levels) = self.users.get(&user) else {
            return Vec::new();
        };
        let mut out: Vec<(LevelKey, FoundVolume)> =
            levels.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        drop(levels);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out.into_iter().map(|(_, v)| v).collect()
    }

    /// Drop everything cached for `user`.
    pub fn remove_user(&self, user: UserId) {
        self.users.remove(&user);
    }

    /// Number of users with at least one live wall.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(exchange: &str, pair: &str, side: Side, price: f64) -> FoundVolume {
        FoundVolume {
            exchange: exchange.into(),
            pair: pair.into(),
            side,
            price,
            volume: 10.0,
            difference: 0.5,
            index: 3,
            volume_time_found: 1,
        }
    }

    #[test]
    fn found_then_not_found_clears_level() {
        let cache = FoundVolumeCache::new();
        cache.upsert(7, wall("binance_spot", "BTC/USDT", Side::Ask, 50_000.0));
        assert_eq!(cache.get_all(7).len(), 1);

        cache.upsert(7, FoundVolume::not_found("BTC/USDT", "binance_spot", Side::Ask));
        assert!(cache.get_all(7).is_empty());
        assert_eq!(cache.user_count(), 0);
    }

    #[test]
    fn not_found_for_new_user_stores_nothing() {
        let cache = FoundVolumeCache::new();
        cache.upsert(1, FoundVolume::not_found("BTC/USDT", "binance_spot", Side::Bid));
        assert!(cache.get_all(1).is_empty());
        assert_eq!(cache.user_count(), 0);
    }

    #[test]
    fn overwrite_keeps_one_entry_per_level() {
        let cache = FoundVolumeCache::new();
        cache.upsert(1, wall("bybit_spot", "ETH/USDT", Side::Bid, 3000.0));
        cache.upsert(1, wall("bybit_spot", "ETH/USDT", Side::Bid, 2990.0));
        let all = cache.get_all(1);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].price, 2990.0);
    }

    #[test]
    fn get_all_is_sorted() {
        let cache = FoundVolumeCache::new();
        cache.upsert(1, wall("bybit_spot", "ETH/USDT", Side::Bid, 1.0));
        cache.upsert(1, wall("binance_spot", "SOL/USDT", Side::Ask, 1.0));
        cache.upsert(1, wall("binance_spot", "BTC/USDT", Side::Bid, 1.0));
        cache.upsert(1, wall("binance_spot", "BTC/USDT", Side::Ask, 1.0));

        let keys: Vec<(String, String, Side)> =
            cache.get_all(1).into_iter().map(|f| (f.exchange, f.pair, f.side)).collect();
        assert_eq!(
            keys,
            vec![
                ("binance_spot".into(), "BTC/USDT".into(), Side::Ask),
                ("binance_spot".into(), "BTC/USDT".into(), Side::Bid),
                ("binance_spot".into(), "SOL/USDT".into(), Side::Ask),
                ("bybit_spot".into(), "ETH/USDT".into(), Side::Bid),
            ]
        );
    }

    #[test]
    fn delete_removes_both_sides_only_for_that_pair() {
        let cache = FoundVolumeCache::new();
        cache.upsert(2, wall("binance_spot", "BTC/USDT", Side::Ask, 1.0));
        cache.upsert(2, wall("binance_spot", "BTC/USDT", Side::Bid, 1.0));
        cache.upsert(2, wall("binance_spot", "ETH/USDT", Side::Bid, 1.0));

        cache.delete(2, "BTC/USDT", "binance_spot");
        let all = cache.get_all(2);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].pair, "ETH/USDT");

        cache.remove_user(2);
        assert!(cache.get_all(2).is_empty());
    }

    #[test]
    fn users_are_isolated() {
        let cache = FoundVolumeCache::new();
        cache.upsert(1, wall("binance_spot", "BTC/USDT", Side::Ask, 1.0));
        cache.upsert(2, wall("binance_spot", "BTC/USDT", Side::Ask, 2.0));
        cache.delete(1, "BTC/USDT", "binance_spot");
        assert!(cache.get_all(1).is_empty());
        assert_eq!(cache.get_all(2)[0].price, 2.0);
    }
}
