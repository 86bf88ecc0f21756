//! Typed error definitions for the volume-wall watcher.
//!
//! Provides [`VwError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. All variants implement `std::error::Error`
//! via `thiserror`, so they integrate seamlessly with `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the volume-wall watcher.
#[derive(Debug, Error)]
pub enum VwError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// DNS, connect, timeout or body-read failure on an exchange call.
    #[error("transport error: {0}")]
    Transport(String),

    /// Exchange answered with a non-success HTTP status.
    #[error("http status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Catalogue or order-book response parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Order-book response with no asks or no bids.
    #[error("empty order book for {pair}: {asks} asks, {bids} bids")]
    EmptyBook { pair: String, asks: usize, bids: usize },

    /// No adapter registered under this name.
    #[error("unknown exchange: {0}")]
    UnknownExchange(String),

    /// Rejected user pair settings.
    #[error("invalid pair settings: {0}")]
    InvalidPair(String),
}
