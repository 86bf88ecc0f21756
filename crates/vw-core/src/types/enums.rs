//! Enumerations used throughout the volume-wall watcher.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Book side
// ---------------------------------------------------------------------------

/// Order-book side.
///
/// Serialized as `"asks"` / `"bids"`, which is also the suffix used in
/// cached level keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Sell orders; best price is the lowest.
    #[default]
    #[serde(rename = "asks")]
    Ask,
    /// Buy orders; best price is the highest.
    #[serde(rename = "bids")]
    Bid,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Ask, Side::Bid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ask => "asks",
            Self::Bid => "bids",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
