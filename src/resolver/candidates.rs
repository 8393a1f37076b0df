//! Rank-indexed candidate list helpers shared by the platform resolvers.

/// Repeat the tail entry until every rank 0..=4 is indexable.
///
/// Platforms frequently advertise fewer than five distinct qualities; padding
/// makes rank-indexed lookup total instead of a bounds check at every call
/// site. An empty list is returned unchanged, callers treat that as a
/// malformed payload before indexing.
pub fn pad_to_rank_range<T: Clone>(mut list: Vec<T>) -> Vec<T> {
    if let Some(last) = list.last().cloned() {
        while list.len() < 5 {
            list.push(last.clone());
        }
    }
    list
}

/// One-step quality shift after a failed reachability probe.
///
/// Degrades to the next-lower tier, except at the lowest tier where it
/// recovers upward instead. Exactly one shift, the fallback itself is never
/// re-probed.
pub fn fallback_rank(rank: usize) -> usize {
    if rank < 4 { rank + 1 } else { rank - 1 }
}
