//! Generic exchange adapter engine.
//!
//! Provides [`ExchangeAdapter`], a data-driven poller/scanner. Each exchange
//! only supplies an [`AdapterDef`] (endpoints, URL formatter, parsers and
//! pacing); the engine owns the order-book store, the subscription set and the
//! two loops that keep both busy.
//!
//! # Architecture
//!
//! ```text
//! AdapterDef ──► ExchangeAdapter::start()  ──► run task: load subscriptions, load catalogue
//!                                          ──► poll task: GET depth → parse → OrderbookStore::upsert
//!                                          ──► scan task: per pair, per user → search_volume → FoundVolumeCache
//!            ──► ExchangeAdapter::stop()   ──► cancel token, join tasks
//! ```
//!
//! Every sleep and every network call races the adapter's cancellation token,
//! so `stop()` returns within one in-flight scan batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vw_core::config::AdapterConfig;
use vw_core::{ExchangePair, UserId, UserPair, VwError, pair_to_symbol};

use crate::found_volume::FoundVolumeCache;
use crate::http::HttpGet;
use crate::orderbook::{OrderbookStore, RawLevel};
use crate::subscription::SubscriptionRegistry;
use crate::users::{UserDirectory, UserPairsSource};

// ---------------------------------------------------------------------------
// AdapterDef: describes one exchange endpoint family
// ---------------------------------------------------------------------------

/// Builds a request URL: `(template, exchange_symbol) -> url`.
pub type UrlFormatter = Box<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Catalogue parser: `(adapter_name, body) -> pairs`.
pub type CatalogueParser = Box<dyn Fn(&str, &[u8]) -> Result<Vec<ExchangePair>, VwError> + Send + Sync>;

/// Order-book parser: `body -> asks + bids`.
pub type OrderbookParser = Box<dyn Fn(&[u8]) -> Result<ParsedBook, VwError> + Send + Sync>;

/// Both sides of one order-book response, in exchange order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBook {
    pub asks: Vec<RawLevel>,
    pub bids: Vec<RawLevel>,
}

/// Loop timing for one adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// Sleep after every order-book request.
    pub request_delay: Duration,
    /// Sleep while nothing is subscribed.
    pub idle_delay: Duration,
    /// Sleep after every full scanning pass.
    pub scan_interval: Duration,
    /// Sleep between spawning two user scan tasks.
    pub user_delay: Duration,
    /// Concurrently running user scan tasks.
    pub scan_concurrency: usize,
}

impl Pacing {
    pub fn from_config(cfg: &AdapterConfig) -> Self {
        Self {
            request_delay: cfg.effective_request_delay(),
            idle_delay: cfg.effective_idle_delay(),
            scan_interval: cfg.effective_scan_interval(),
            user_delay: cfg.effective_user_delay(),
            scan_concurrency: cfg.effective_scan_concurrency(),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&AdapterConfig::default())
    }
}

/// Everything the engine needs to drive one exchange market.
///
/// Each exchange module's constructor (`binance::spot()`, `bybit::futures()`,
/// ...) produces one of these.
pub struct AdapterDef {
    /// Adapter identifier (e.g. `"binance_spot"`), also the `exchange` field
    /// of every result it produces.
    pub name: String,
    /// Catalogue endpoint.
    pub pairs_url: String,
    /// Order-book endpoint template, completed by `url_formatter`.
    pub orderbook_url: String,
    pub url_formatter: UrlFormatter,
    pub catalogue_parser: CatalogueParser,
    pub orderbook_parser: OrderbookParser,
    pub pacing: Pacing,
}

/// Substitute the symbol right after `symbol=` in a query-string template.
pub fn symbol_query_formatter(template: &str, symbol: &str) -> String {
    template.replacen("symbol=", &format!("symbol={symbol}"), 1)
}

// ---------------------------------------------------------------------------
// Dependencies and state
// ---------------------------------------------------------------------------

/// Collaborators shared by every adapter.
#[derive(Clone)]
pub struct AdapterDeps {
    pub http: Arc<dyn HttpGet>,
    pub users: Arc<dyn UserDirectory>,
    pub user_pairs: Arc<dyn UserPairsSource>,
    pub found: Arc<FoundVolumeCache>,
}

/// Adapter lifecycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Idle = 0,
    PairsLoaded = 1,
    Polling = 2,
    Stopped = 3,
}

impl AdapterState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::PairsLoaded,
            2 => Self::Polling,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// ExchangeAdapter: the engine
// ---------------------------------------------------------------------------

/// One exchange market: catalogue, subscriptions, order books and loops.
pub struct ExchangeAdapter {
    def: AdapterDef,
    deps: AdapterDeps,
    store: Arc<OrderbookStore>,
    subscriptions: Arc<SubscriptionRegistry>,
    catalogue: DashMap<String, ExchangePair>,
    state: AtomicU8,
    running: Mutex<Option<Running>>,
}

impl ExchangeAdapter {
    pub fn new(def: AdapterDef, deps: AdapterDeps) -> Self {
        Self {
            def,
            deps,
            store: Arc::new(OrderbookStore::new()),
            subscriptions: Arc::new(SubscriptionRegistry::new()),
            catalogue: DashMap::new(),
            state: AtomicU8::new(AdapterState::Idle as u8),
            running: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn state(&self) -> AdapterState {
        AdapterState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: AdapterState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn pacing(&self) -> &Pacing {
        &self.def.pacing
    }

    /// Order books polled by this adapter.
    pub fn store(&self) -> &Arc<OrderbookStore> {
        &self.store
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionRegistry> {
        &self.subscriptions
    }

    // -----------------------------------------------------------------------
    // Catalogue and subscriptions
    // -----------------------------------------------------------------------

    /// Fetch the exchange's instrument listing and replace the catalogue.
    ///
    /// On failure the catalogue is left as it was. Either way the adapter
    /// counts as having attempted its catalogue load.
    pub async fn load_pairs(&self) -> Result<usize, VwError> {
        let result = match self.deps.http.get(&self.def.pairs_url).await {
            Ok(body) => (self.def.catalogue_parser)(&self.def.name, &body[..]),
            Err(e) => Err(e),
        };
        if self.state() != AdapterState::Stopped {
            self.set_state(AdapterState::PairsLoaded);
        }

        let pairs = result?;
        self.catalogue.clear();
        for p in pairs {
            self.catalogue.insert(p.pair.clone(), p);
        }
        Ok(self.catalogue.len())
    }

    /// Subscribe every pair that any user watches on this adapter.
    pub async fn load_subscriptions(&self) -> anyhow::Result<usize> {
        let pairs = self.deps.user_pairs.pairs_by_exchange(&self.def.name).await?;
        for pair in &pairs {
            self.subscriptions.insert(pair);
        }
        Ok(pairs.len())
    }

    /// Start polling and scanning `pair`. Returns `false` if already subscribed.
    pub fn subscribe(&self, pair: &str) -> bool {
        let added = self.subscriptions.insert(pair);
        if added {
            debug!("[{}] subscribed {pair}", self.def.name);
        }
        added
    }

    /// Stop polling `pair` and drop its order book.
    pub fn unsubscribe(&self, pair: &str) -> bool {
        let removed = self.subscriptions.remove(pair);
        self.store.remove(pair);
        if removed {
            debug!("[{}] unsubscribed {pair}", self.def.name);
        }
        removed
    }

    /// Drop every subscription and every order book.
    pub fn clear_subscriptions(&self) {
        self.subscriptions.clear();
        for pair in self.store.pairs() {
            self.store.remove(&pair);
        }
    }

    /// Returns `true` if the loaded catalogue lists `pair`.
    pub fn is_listed(&self, pair: &str) -> bool {
        self.catalogue.contains_key(pair)
    }

    pub fn catalogue_loaded(&self) -> bool {
        !self.catalogue.is_empty()
    }

    /// Loaded catalogue, sorted by pair.
    pub fn catalogue(&self) -> Vec<ExchangePair> {
        let mut out: Vec<ExchangePair> = self.catalogue.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.pair.cmp(&b.pair));
        out
    }

    // -----------------------------------------------------------------------
    // Order books
    // -----------------------------------------------------------------------

    /// Order-book URL for `pair`, using the catalogue symbol when known.
    pub fn order_book_url(&self, pair: &str) -> String {
        let symbol = self
            .catalogue
            .get(pair)
            .map(|e| e.symbol.clone())
            .unwrap_or_else(|| pair_to_symbol(pair));
        (self.def.url_formatter)(&self.def.orderbook_url, &symbol)
    }

    /// GET and parse one order book. A response missing either side is an error.
    pub async fn fetch_orderbook(&self, pair: &str) -> Result<ParsedBook, VwError> {
        let body = self.deps.http.get(&self.order_book_url(pair)).await?;
        let book = (self.def.orderbook_parser)(&body[..])?;
        if book.asks.is_empty() || book.bids.is_empty() {
            return Err(VwError::EmptyBook {
                pair: pair.to_string(),
                asks: book.asks.len(),
                bids: book.bids.len(),
            });
        }
        Ok(book)
    }

    /// Fetch `pair` and replace its snapshot.
    pub async fn refresh_orderbook(&self, pair: &str) -> Result<(), VwError> {
        let book = self.fetch_orderbook(pair).await?;
        self.store.upsert(pair, &book.asks, &book.bids);
        Ok(())
    }

    /// Keep every subscribed pair's order book fresh until cancelled.
    ///
    /// One request per pair, `request_delay` apart. Failures are logged and
    /// leave the previous snapshot in place.
    pub async fn poll_orderbooks(&self, cancel: &CancellationToken) {
        let name = &self.def.name;
        let pacing = &self.def.pacing;

        while !cancel.is_cancelled() {
            let pairs = self.subscriptions.pairs();
            if pairs.is_empty() {
                if !sleep_or_cancel(pacing.idle_delay, cancel).await {
                    return;
                }
                continue;
            }

            for pair in pairs {
                if !self.subscriptions.contains(&pair) {
                    continue;
                }
                let result = tokio::select! {
                    _ = cancel.cancelled() => return,
                    r = self.fetch_orderbook(&pair) => r,
                };
                match result {
                    // Unsubscribed while the request was in flight.
                    Ok(_) if !self.subscriptions.contains(&pair) => {}
                    Ok(book) => self.store.upsert(&pair, &book.asks, &book.bids),
                    Err(e @ VwError::EmptyBook { .. }) => warn!("[{name}] {e}, keeping previous snapshot"),
                    Err(e) => warn!("[{name}] order book {pair} failed: {e}"),
                }
                if !sleep_or_cancel(pacing.request_delay, cancel).await {
                    return;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scanning
    // -----------------------------------------------------------------------

    /// Search every subscribed pair for every active user's walls until
    /// cancelled, writing results into the found-volume cache.
    pub async fn scan_for_volumes(&self, cancel: &CancellationToken) {
        let pacing = &self.def.pacing;
        let permits = Arc::new(Semaphore::new(pacing.scan_concurrency));

        while !cancel.is_cancelled() {
            for pair in self.subscriptions.pairs() {
                if !self.subscriptions.contains(&pair) {
                    continue;
                }
                if !self.scan_pair(&pair, &permits, cancel).await {
                    return;
                }
            }
            if !sleep_or_cancel(pacing.scan_interval, cancel).await {
                return;
            }
        }
    }

    /// One task per active user for `pair`, all joined before returning.
    /// Returns `false` when cancelled.
    async fn scan_pair(&self, pair: &str, permits: &Arc<Semaphore>, cancel: &CancellationToken) -> bool {
        let ctx = ScanContext {
            exchange: self.def.name.clone(),
            pair: pair.to_string(),
            store: Arc::clone(&self.store),
            user_pairs: Arc::clone(&self.deps.user_pairs),
            found: Arc::clone(&self.deps.found),
        };
        let mut tasks = JoinSet::new();
        let mut cancelled = false;

        for (i, user) in self.deps.users.active_users().into_iter().enumerate() {
            if i > 0 && !sleep_or_cancel(self.def.pacing.user_delay, cancel).await {
                cancelled = true;
                break;
            }
            let permit = tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                p = Arc::clone(permits).acquire_owned() => p,
            };
            let Ok(permit) = permit else {
                cancelled = true;
                break;
            };
            let ctx = ctx.clone();
            tasks.spawn(async move {
                let _permit = permit;
                ctx.scan_user(user).await;
            });
        }

        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("[{}] scan task for {pair} failed: {e}", self.def.name);
            }
        }
        !cancelled
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Spawn the adapter under a child of `parent`.
    ///
    /// The run task loads subscriptions and the catalogue, then runs the poll
    /// and scan loops as two tasks until cancelled. Calling `start` on a
    /// running adapter does nothing.
    pub async fn start(self: &Arc<Self>, parent: &CancellationToken) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            warn!("[{}] already started", self.def.name);
            return;
        }
        let cancel = parent.child_token();
        let this = Arc::clone(self);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { this.run(token).await });
        *running = Some(Running { cancel, handle });
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let name = self.def.name.clone();

        match self.load_subscriptions().await {
            Ok(n) => info!("[{name}] {n} subscription(s) loaded"),
            Err(e) => error!("[{name}] failed to load subscriptions: {e:#}"),
        }

        let loaded = tokio::select! {
            _ = cancel.cancelled() => return,
            r = self.load_pairs() => r,
        };
        match loaded {
            Ok(n) => info!("[{name}] catalogue loaded ({n} pairs)"),
            Err(e) => error!("[{name}] failed to load catalogue: {e}"),
        }

        self.set_state(AdapterState::Polling);
        info!("[{name}] polling {} pair(s)", self.subscriptions.len());

        let poll = tokio::spawn({
            let this = Arc::clone(&self);
            let cancel = cancel.clone();
            async move { this.poll_orderbooks(&cancel).await }
        });
        let scan = tokio::spawn({
            let this = Arc::clone(&self);
            let cancel = cancel.clone();
            async move { this.scan_for_volumes(&cancel).await }
        });

        let (poll, scan) = tokio::join!(poll, scan);
        if let Err(e) = poll {
            error!("[{name}] poll task failed: {e}");
        }
        if let Err(e) = scan {
            error!("[{name}] scan task failed: {e}");
        }
        debug!("[{name}] loops exited");
    }

    /// Cancel the loops and wait for them to finish.
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();
        if let Some(Running { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                error!("[{}] run task failed: {e}", self.def.name);
            }
        }
        self.set_state(AdapterState::Stopped);
        info!("[{}] stopped", self.def.name);
    }
}

// ---------------------------------------------------------------------------
// Per-user scan
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct ScanContext {
    exchange: String,
    pair: String,
    store: Arc<OrderbookStore>,
    user_pairs: Arc<dyn UserPairsSource>,
    found: Arc<FoundVolumeCache>,
}

impl ScanContext {
    /// Search the user's entry for this pair and write the results.
    ///
    /// A removal can land between loading the entry and the write. Removal
    /// edits the watch list before clearing the cache, so after writing we
    /// load the list again and take our own results back if the entry is gone.
    async fn scan_user(&self, user: UserId) {
        let Some(entries) = self.load_entries(user).await else {
            return;
        };
        let mut wrote = false;
        for up in entries.iter().filter(|up| up.matches(&self.exchange, &self.pair)) {
            for found in self.store.search_volume(&self.pair, &self.exchange, up.threshold) {
                wrote |= found.is_found();
                self.found.upsert(user, found);
            }
        }
        if !wrote {
            return;
        }
        let Some(entries) = self.load_entries(user).await else {
            return;
        };
        if !entries.iter().any(|up| up.matches(&self.exchange, &self.pair)) {
            debug!("[{}] user {user} dropped {} during scan", self.exchange, self.pair);
            self.found.delete(user, &self.pair, &self.exchange);
        }
    }

    async fn load_entries(&self, user: UserId) -> Option<Vec<UserPair>> {
        match self.user_pairs.user_pairs(user).await {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("[{}] user {user}: cannot load watch list: {e:#}", self.exchange);
                None
            }
        }
    }
}

/// Sleep for `d`. Returns `false` if `cancel` fired first.
pub(crate) async fn sleep_or_cancel(d: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(d) => true,
    }
}
