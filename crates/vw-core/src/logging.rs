//! Tracing setup for the watcher binary.
//!
//! Adapter tasks prefix their messages with `[adapter_name]`, so one console
//! stream carries every exchange. With a log directory the same events also go
//! to `<dir>/<module_name>.<date>`, rotated daily and written without colour.
//! `RUST_LOG` overrides the level passed on the command line, e.g.
//! `RUST_LOG=vw_md::adapter=debug` to follow subscribe and scan decisions.

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Call once, before anything logs.
///
/// `module_name` is the config's `service.module_name` and names the log
/// files under `log_dir`.
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let console = fmt::layer().with_target(false).with_ansi(true);

    match log_dir {
        Some(dir) => {
            let file = fmt::layer()
                .with_writer(tracing_appender::rolling::daily(dir, module_name))
                .with_ansi(false)
                .with_target(true);
            tracing_subscriber::registry().with(filter).with(console).with(file).init();
            info!("logging to {dir}/{module_name}.*");
        }
        None => tracing_subscriber::registry().with(filter).with(console).init(),
    }
}
