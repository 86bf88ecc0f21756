//! # vw-core
//!
//! Core crate for the volume-wall watcher, providing:
//!
//! - **Types** (`types`): sides, found volumes, user/exchange pairs, pair symbol utils
//! - **Configuration** (`config`): JSON config deserialization and validation
//! - **Error types** (`error`): domain-specific `VwError` via thiserror
//! - **Time utilities** (`time_util`): wall-clock timestamps
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use error::VwError;
pub use types::*;
