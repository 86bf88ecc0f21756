//! Adapter registry: factory for creating exchange adapters from config,
//! and the name → adapter map the rest of the system routes through.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vw_core::VwError;
use vw_core::config::{AdapterConfig, AppConfig};

use crate::adapter::{AdapterDef, AdapterDeps, ExchangeAdapter};

/// Build the [`AdapterDef`] named by `cfg.name`.
pub fn build_adapter_def(cfg: &AdapterConfig) -> Result<AdapterDef, VwError> {
    let def = match cfg.name.as_str() {
        "binance_spot" => crate::binance::spot(cfg),
        "binance_futures" => crate::binance::futures(cfg),
        "binance_us" => crate::binance::us(cfg),
        "bybit_spot" => crate::bybit::spot(cfg),
        "bybit_futures" => crate::bybit::futures(cfg),
        other => return Err(VwError::UnknownExchange(other.to_string())),
    };
    Ok(def)
}

/// Create an adapter for `cfg.name` wired to the shared `deps`.
pub fn create_adapter(cfg: &AdapterConfig, deps: AdapterDeps) -> Result<Arc<ExchangeAdapter>, VwError> {
    Ok(Arc::new(ExchangeAdapter::new(build_adapter_def(cfg)?, deps)))
}

/// Concurrent name → adapter map.
#[derive(Default)]
pub struct ExchangeRegistry {
    adapters: DashMap<String, Arc<ExchangeAdapter>>,
}

impl ExchangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under its name, returning any adapter it replaced.
    pub fn add(&self, adapter: Arc<ExchangeAdapter>) -> Option<Arc<ExchangeAdapter>> {
        self.adapters.insert(adapter.name().to_string(), adapter)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ExchangeAdapter>> {
        self.adapters.get(name).map(|a| Arc::clone(a.value()))
    }

    /// Every adapter, sorted by name.
    pub fn all(&self) -> Vec<Arc<ExchangeAdapter>> {
        let mut out: Vec<Arc<ExchangeAdapter>> = self.adapters.iter().map(|a| Arc::clone(a.value())).collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = self.adapters.iter().map(|a| a.key().clone()).collect();
        out.sort();
        out
    }

    /// Subscribe `pair` on `exchange`. Returns `false` if already subscribed.
    pub fn add_pair(&self, exchange: &str, pair: &str) -> Result<bool, VwError> {
        let adapter = self.get(exchange).ok_or_else(|| VwError::UnknownExchange(exchange.to_string()))?;
        Ok(adapter.subscribe(pair))
    }

    /// Unsubscribe `pair` on `exchange`. Returns `false` if it was not subscribed.
    pub fn remove_pair(&self, exchange: &str, pair: &str) -> Result<bool, VwError> {
        let adapter = self.get(exchange).ok_or_else(|| VwError::UnknownExchange(exchange.to_string()))?;
        Ok(adapter.unsubscribe(pair))
    }

    /// Start every adapter under children of `cancel`.
    pub async fn start_all(&self, cancel: &CancellationToken) {
        for adapter in self.all() {
            adapter.start(cancel).await;
            info!("adapter '{}' started", adapter.name());
        }
    }

    /// Stop every adapter and wait for its loops to exit.
    pub async fn stop_all(&self) {
        for adapter in self.all() {
            info!("stopping adapter '{}'", adapter.name());
            adapter.stop().await;
        }
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Create every enabled adapter of `config`.
///
/// An adapter that fails to build is logged and skipped; the others still
/// run.
pub fn build_registry(config: &AppConfig, deps: AdapterDeps) -> ExchangeRegistry {
    let registry = ExchangeRegistry::new();
    for (idx, cfg) in config.effective_adapters().iter().enumerate() {
        match create_adapter(cfg, deps.clone()) {
            Ok(adapter) => {
                info!("adapter[{idx}]: created '{}'", adapter.name());
                registry.add(adapter);
            }
            Err(e) => error!("adapter[{idx}]: failed to create '{}': {e}", cfg.name),
        }
    }
    registry
}
