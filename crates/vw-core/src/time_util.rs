//! Wall-clock time helpers.
//!
//! Found volumes and snapshots are stamped in milliseconds since the Unix
//! epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as **milliseconds** since Unix epoch; 0 if the clock is
/// before the epoch.
#[inline]
pub fn now_ms() -> u64 {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    d.as_millis() as u64
}
