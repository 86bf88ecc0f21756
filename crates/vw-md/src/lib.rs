//! # vw-md
//!
//! Order-book ingestion and volume-wall detection for multiple
//! cryptocurrency exchanges.
//!
//! ## Architecture
//!
//! Each exchange provides constructors returning an [`adapter::AdapterDef`]
//! (endpoints, URL formatter, parsers, pacing). The generic
//! [`adapter::ExchangeAdapter`] engine polls order books into its
//! [`orderbook::OrderbookStore`] and scans them for every watching user,
//! writing hits into the shared [`found_volume::FoundVolumeCache`].
//!
//! ## Shared infrastructure
//!
//! - [`orderbook`]: snapshot store and volume search
//! - [`registry`]: adapter factory and name → adapter map
//! - [`watch`]: watch-list edits with subscription bookkeeping
//! - [`http`]: REST transport trait and reqwest implementation
//! - [`users`]: user directory traits and the in-memory watch list
//! - [`json_util`]: JSON parsing helpers

pub mod adapter;
pub mod binance;
pub mod bybit;
pub mod found_volume;
pub mod http;
pub mod json_util;
pub mod orderbook;
pub mod registry;
pub mod subscription;
pub mod users;
pub mod watch;

#[cfg(test)]
pub(crate) mod testutil;
