//! Configuration parsing for the volume-wall watcher.
//!
//! Everything is read from a single JSON config file. The top-level structure
//! contains logging metadata, the HTTP timeout, an `adapters` array where each
//! entry tunes one exchange adapter, and an optional `watchers` array seeding
//! the in-memory watch list.
//!
//! # Example config
//!
//! ```json
//! {
//!   "service": { "module_name": "volwatch", "log_path": "/tmp/log" },
//!   "request_timeout_ms": 5000,
//!   "adapters": [
//!     { "name": "binance_spot", "request_delay_ms": 3000, "depth_limit": 500 },
//!     { "name": "bybit_futures", "enabled": false }
//!   ],
//!   "watchers": [
//!     { "user_id": 1, "exchange": "binance_spot", "pair": "BTC/USDT", "exact_value": 25.0 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::error::VwError;
use crate::types::{UserPair, is_valid_pair};

/// Every adapter name the engine knows how to build.
pub const KNOWN_ADAPTERS: &[&str] =
    &["binance_spot", "binance_futures", "binance_us", "bybit_spot", "bybit_futures"];

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    pub service: Option<ModuleMeta>,

    /// Timeout for every exchange HTTP request (default: 5000).
    pub request_timeout_ms: Option<u64>,

    /// Adapter overrides. Empty or missing enables every known adapter.
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,

    /// Watch settings loaded into the in-memory watch list at startup.
    #[serde(default)]
    pub watchers: Vec<UserPair>,
}

impl AppConfig {
    pub fn module_name(&self) -> String {
        self.service.as_ref().and_then(|m| m.module_name.clone()).unwrap_or_else(|| "volwatch".to_string())
    }

    pub fn log_path(&self) -> Option<String> {
        self.service.as_ref().and_then(|m| m.log_path.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(5_000))
    }

    /// Adapters to run: the enabled configured ones, or every known adapter
    /// with default settings when none are configured.
    pub fn effective_adapters(&self) -> Vec<AdapterConfig> {
        if self.adapters.is_empty() {
            return KNOWN_ADAPTERS.iter().map(|n| AdapterConfig::named(n)).collect();
        }
        self.adapters.iter().filter(|a| a.is_enabled()).cloned().collect()
    }

    /// Seeded watchers whose adapter is disabled; nothing will poll their pair.
    pub fn unpolled_watchers(&self) -> Vec<&UserPair> {
        let running: HashSet<String> = self.effective_adapters().into_iter().map(|a| a.name).collect();
        self.watchers.iter().filter(|w| !running.contains(&w.exchange)).collect()
    }

    /// Reject configs the engine cannot run.
    pub fn validate(&self) -> Result<(), VwError> {
        let mut seen = HashSet::new();
        for adapter in &self.adapters {
            if !KNOWN_ADAPTERS.contains(&adapter.name.as_str()) {
                return Err(VwError::Config(format!("unknown adapter '{}'", adapter.name)));
            }
            if !seen.insert(adapter.name.as_str()) {
                return Err(VwError::Config(format!("adapter '{}' configured twice", adapter.name)));
            }
            if adapter.scan_concurrency == Some(0) {
                return Err(VwError::Config(format!("adapter '{}': scan_concurrency must be > 0", adapter.name)));
            }
        }
        for w in &self.watchers {
            if !KNOWN_ADAPTERS.contains(&w.exchange.as_str()) {
                return Err(VwError::Config(format!("watcher {}: unknown exchange '{}'", w.user_id, w.exchange)));
            }
            if !is_valid_pair(&w.pair) {
                return Err(VwError::Config(format!("watcher {}: malformed pair '{}'", w.user_id, w.pair)));
            }
            if w.threshold.is_nan() || w.threshold <= 0.0 {
                return Err(VwError::Config(format!(
                    "watcher {}: threshold for {} must be positive",
                    w.user_id, w.pair
                )));
            }
        }
        Ok(())
    }
}

/// Module metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

/// Pacing and endpoint overrides for one exchange adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdapterConfig {
    /// Adapter identifier, e.g. `"binance_spot"`.
    pub name: String,

    /// Set to `false` to keep a configured adapter from starting.
    pub enabled: Option<bool>,

    /// Delay between two order-book requests (default: 3000).
    pub request_delay_ms: Option<u64>,

    /// Delay between polling passes while nothing is subscribed (default: 1000).
    pub idle_delay_ms: Option<u64>,

    /// Pause between full scanning passes (default: 1000).
    pub scan_interval_ms: Option<u64>,

    /// Delay between spawning two user scan tasks (default: 100).
    pub user_delay_ms: Option<u64>,

    /// Upper bound on concurrently running user scan tasks (default: 16).
    pub scan_concurrency: Option<usize>,

    /// Order-book depth requested from the exchange.
    pub depth_limit: Option<u32>,

    /// REST base URL override (e.g. a testnet or proxy).
    pub rest_url: Option<String>,
}

impl AdapterConfig {
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms.unwrap_or(3_000))
    }

    pub fn effective_idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms.unwrap_or(1_000))
    }

    pub fn effective_scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms.unwrap_or(1_000))
    }

    pub fn effective_user_delay(&self) -> Duration {
        Duration::from_millis(self.user_delay_ms.unwrap_or(100))
    }

    pub fn effective_scan_concurrency(&self) -> usize {
        self.scan_concurrency.unwrap_or(16).max(1)
    }
}

/// Parse and validate a JSON config string.
pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    let config: AppConfig = serde_json::from_str(content).context("malformed config JSON")?;
    config.validate()?;
    Ok(config)
}

/// Load, parse and validate a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    parse_config(&content)
}
