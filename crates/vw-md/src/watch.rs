//! Watch-list editing with subscription bookkeeping.
//!
//! [`WatchService`] is the write path for user watch settings: it keeps the
//! [`Watchlist`], the adapters' subscriptions and the found-volume cache in
//! step, so a pair is polled exactly while at least one user watches it.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use tracing::{debug, info, warn};
use vw_core::{FoundVolume, UserId, UserPair, VwError, is_valid_pair};

use crate::found_volume::FoundVolumeCache;
use crate::registry::ExchangeRegistry;
use crate::users::Watchlist;

type PairKey = (String, String);

pub struct WatchService {
    watchlist: Arc<Watchlist>,
    registry: Arc<ExchangeRegistry>,
    found: Arc<FoundVolumeCache>,
    /// Held per (exchange, pair) across a watch-list edit and the
    /// subscribe or unsubscribe that follows it.
    bookkeeping: DashMap<PairKey, ()>,
}

impl WatchService {
    pub fn new(watchlist: Arc<Watchlist>, registry: Arc<ExchangeRegistry>, found: Arc<FoundVolumeCache>) -> Self {
        Self { watchlist, registry, found, bookkeeping: DashMap::new() }
    }

    fn lock_pair(&self, exchange: &str, pair: &str) -> RefMut<'_, PairKey, ()> {
        self.bookkeeping.entry((exchange.to_string(), pair.to_string())).or_default()
    }

    /// Add or replace a watch setting and subscribe its pair.
    ///
    /// Returns `true` for a new setting, `false` when an existing one had its
    /// threshold replaced.
    pub fn add(&self, up: UserPair) -> Result<bool, VwError> {
        validate_threshold(up.threshold)?;
        if !is_valid_pair(&up.pair) {
            return Err(VwError::InvalidPair(format!("malformed pair '{}'", up.pair)));
        }
        let adapter = self
            .registry
            .get(&up.exchange)
            .ok_or_else(|| VwError::UnknownExchange(up.exchange.clone()))?;

        if adapter.catalogue_loaded() && !adapter.is_listed(&up.pair) {
            warn!("[{}] {} is not in the exchange catalogue", up.exchange, up.pair);
        }

        let (user, exchange, pair) = (up.user_id, up.exchange.clone(), up.pair.clone());
        let guard = self.lock_pair(&exchange, &pair);
        let added = self.watchlist.upsert(up);
        adapter.subscribe(&pair);
        drop(guard);
        info!("[{exchange}] user {user} watching {pair} (new={added})");
        Ok(added)
    }

    /// Change the threshold of an existing setting.
    ///
    /// Results found under the old threshold are dropped; the next scan pass
    /// repopulates them.
    pub fn update_threshold(&self, user: UserId, exchange: &str, pair: &str, threshold: f64) -> Result<(), VwError> {
        validate_threshold(threshold)?;
        if !self.watchlist.update_threshold(user, exchange, pair, threshold) {
            return Err(VwError::InvalidPair(format!("user {user} does not watch {pair} on {exchange}")));
        }
        self.found.delete(user, pair, exchange);
        debug!("[{exchange}] user {user} threshold for {pair} set to {threshold}");
        Ok(())
    }

    /// Drop one setting and its cached results. The pair stays subscribed
    /// while another user still watches it on the same exchange.
    pub fn remove(&self, user: UserId, exchange: &str, pair: &str) -> bool {
        let guard = self.lock_pair(exchange, pair);
        if !self.watchlist.remove(user, exchange, pair) {
            return false;
        }
        self.found.delete(user, pair, exchange);
        self.release(exchange, pair);
        drop(guard);
        info!("[{exchange}] user {user} stopped watching {pair}");
        true
    }

    /// Drop every setting of `user`. Returns how many were removed.
    pub fn remove_user(&self, user: UserId) -> usize {
        let entries = self.watchlist.remove_user(user);
        self.found.remove_user(user);
        for up in &entries {
            let _guard = self.lock_pair(&up.exchange, &up.pair);
            self.release(&up.exchange, &up.pair);
        }
        info!("user {user} removed ({} watch setting(s))", entries.len());
        entries.len()
    }

    /// Live walls of `user`.
    pub fn found(&self, user: UserId) -> Vec<FoundVolume> {
        self.found.get_all(user)
    }

    /// Unsubscribe `pair` once nobody watches it. Callers hold its bookkeeping guard.
    fn release(&self, exchange: &str, pair: &str) {
        if self.watchlist.is_watched(exchange, pair) {
            return;
        }
        if let Err(e) = self.registry.remove_pair(exchange, pair) {
            debug!("cannot unsubscribe {pair}: {e}");
        }
    }
}

fn validate_threshold(threshold: f64) -> Result<(), VwError> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(VwError::InvalidPair(format!("threshold must be positive, got {threshold}")));
    }
    Ok(())
}
