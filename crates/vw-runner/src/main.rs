//! # vw-runner
//!
//! Main entry point for the volume-wall watcher.
//!
//! Loads a JSON configuration file, seeds the watch list, creates one adapter
//! per enabled exchange market, and manages their lifecycle.
//!
//! # Usage
//!
//! ```bash
//! vw-runner config.json --log-level info
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vw_md::adapter::AdapterDeps;
use vw_md::found_volume::FoundVolumeCache;
use vw_md::http::ReqwestHttp;
use vw_md::users::Watchlist;

/// Order-book volume-wall watcher.
#[derive(Parser)]
#[command(name = "vw-runner", about = "Order-book volume-wall watcher")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration (before logging, so the config can name the log dir)
    let config = vw_core::config::load_config(&cli.config)?;

    // 2. Initialize logging, then report what the config load found
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    vw_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name());

    info!(
        "vw-runner starting, config={}, log_level={}, {} adapter(s), {} watcher(s)",
        cli.config.display(),
        cli.log_level,
        config.effective_adapters().len(),
        config.watchers.len(),
    );
    for w in config.unpolled_watchers() {
        warn!("watcher {}: adapter '{}' is disabled, {} will not be polled", w.user_id, w.exchange, w.pair);
    }

    // 3. Shared state
    let watchlist = Arc::new(Watchlist::from_pairs(config.watchers.iter().cloned()));
    let found = Arc::new(FoundVolumeCache::new());
    let deps = AdapterDeps {
        http: Arc::new(ReqwestHttp::new(config.request_timeout())?),
        users: watchlist.clone(),
        user_pairs: watchlist,
        found: found.clone(),
    };

    // 4. Create and start adapters
    let registry = vw_md::registry::build_registry(&config, deps);
    let root = CancellationToken::new();
    registry.start_all(&root).await;
    info!("all {} adapter(s) started, press Ctrl+C to stop", registry.len());

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    // 6. Stop all adapters gracefully
    root.cancel();
    registry.stop_all().await;

    info!("all adapters stopped, {} user(s) with live walls", found.user_count());
    Ok(())
}
