//! Idempotent, order-preserving merge of item sequences.

use std::collections::HashSet;
use std::hash::Hash;

/// Merge `incoming` into `existing`, keeping each key once.
///
/// Walks `existing` first and keeps items with a defined, not-yet-seen key, then
/// appends items from `incoming` in arrival order whose key has not been seen.
/// Items for which `key_of` returns `None` are dropped from both sides.
///
/// Merging the same batch twice yields the same result as merging it once.
pub fn merge_unique_by_key<T, K, F>(existing: Vec<T>, incoming: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut seen = HashSet::with_capacity(existing.len() + incoming.len());
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());

    for item in existing.into_iter().chain(incoming) {
        let Some(key) = key_of(&item) else {
            continue;
        };
        if seen.insert(key) {
            merged.push(item);
        }
    }

    merged
}
