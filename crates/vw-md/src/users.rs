//! Who is watching what.
//!
//! Account management and persistence live outside this crate; the engine
//! only sees them through [`UserDirectory`] and [`UserPairsSource`].
//! [`Watchlist`] is the in-memory implementation of both, seeded from config
//! and edited through [`crate::watch::WatchService`].

use async_trait::async_trait;
use dashmap::DashMap;
use vw_core::{UserId, UserPair};

/// Source of users whose watch lists should be scanned.
pub trait UserDirectory: Send + Sync {
    fn active_users(&self) -> Vec<UserId>;
}

/// Per-user and per-exchange view of the watch settings.
#[async_trait]
pub trait UserPairsSource: Send + Sync {
    /// Every watch setting of `user`, across all exchanges.
    async fn user_pairs(&self, user: UserId) -> anyhow::Result<Vec<UserPair>>;

    /// Distinct pairs watched by anyone on `exchange`.
    async fn pairs_by_exchange(&self, exchange: &str) -> anyhow::Result<Vec<String>>;
}

/// In-memory watch list.
#[derive(Debug, Default)]
pub struct Watchlist {
    users: DashMap<UserId, Vec<UserPair>>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a flat list of settings (later duplicates win).
    pub fn from_pairs(pairs: impl IntoIterator<Item = UserPair>) -> Self {
        let list = Self::new();
        for up in pairs {
            list.upsert(up);
        }
        list
    }

    /// Insert a setting, replacing the threshold if `(user, exchange, pair)`
    /// is already present. Returns `true` for a new entry.
    pub fn upsert(&self, up: UserPair) -> bool {
        let mut entries = self.users.entry(up.user_id).or_default();
        match entries.iter_mut().find(|e| e.matches(&up.exchange, &up.pair)) {
            Some(existing) => {
                existing.threshold = up.threshold;
                false
            }
            None => {
                entries.push(up);
                true
            }
        }
    }

    /// Change the threshold of an existing entry. Returns `false` if absent.
    pub fn update_threshold(&self, user: UserId, exchange: &str, pair: &str, threshold: f64) -> bool {
        let Some(mut entries) = self.users.get_mut(&user) else {
            return false;
        };
        match entries.iter_mut().find(|e| e.matches(exchange, pair)) {
            Some(existing) => {
                existing.threshold = threshold;
                true
            }
            None => false,
        }
    }

    /// Remove one entry. Returns `true` if it existed.
    pub fn remove(&self, user: UserId, exchange: &str, pair: &str) -> bool {
        let removed = match self.users.get_mut(&user) {
            Some(mut entries) => {
                let before = entries.len();
                entries.retain(|e| !e.matches(exchange, pair));
                entries.len() != before
            }
            None => false,
        };
        self.users.remove_if(&user, |_, entries| entries.is_empty());
        removed
    }

    /// Remove every entry of `user` and return them.
    pub fn remove_user(&self, user: UserId) -> Vec<UserPair> {
        self.users.remove(&user).map(|(_, entries)| entries).unwrap_or_default()
    }

    /// Returns `true` if any user watches `pair` on `exchange`.
    pub fn is_watched(&self, exchange: &str, pair: &str) -> bool {
        self.users.iter().any(|e| e.value().iter().any(|up| up.matches(exchange, pair)))
    }

    /// Entries of one user.
    pub fn entries(&self, user: UserId) -> Vec<UserPair> {
        self.users.get(&user).map(|e| e.value().clone()).unwrap_or_default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl UserDirectory for Watchlist {
    fn active_users(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl UserPairsSource for Watchlist {
    async fn user_pairs(&self, user: UserId) -> anyhow::Result<Vec<UserPair>> {
        Ok(self.entries(user))
    }

    async fn pairs_by_exchange(&self, exchange: &str) -> anyhow::Result<Vec<String>> {
        let mut pairs: Vec<String> = self
            .users
            .iter()
            .flat_map(|e| {
                e.value()
                    .iter()
                    .filter(|up| up.exchange == exchange)
                    .map(|up| up.pair.clone())
                    .collect::<Vec<_>>()
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }
}
