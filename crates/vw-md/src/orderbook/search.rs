//! Volume-cluster search over a volume-sorted book side.

use vw_core::PriceLevel;

/// Find the lowest-volume level that still meets `threshold`.
///
/// `levels` must be sorted ascending by volume. Returns the level together
/// with its index in `levels`, or `None` when the side is empty or no level
/// reaches the threshold. A threshold of zero or below matches the first
/// level.
///
/// This is a lower-bound binary search: among several levels with a
/// qualifying volume it always returns the first one.
pub fn find_volume_cluster(levels: &[PriceLevel], threshold: f64) -> Option<(usize, PriceLevel)> {
    // partition_point narrows [lo, hi) until the first level with volume >= threshold.
    let idx = levels.partition_point(|l| l.volume < threshold);
    levels.get(idx).map(|level| (idx, *level))
}
