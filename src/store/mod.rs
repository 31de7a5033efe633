//! Sparse counter store access: the narrow read interface plus
//! implementations backed by memory and SQLite.
//!
//! The store itself is an external collaborator; the engine only ever issues
//! the two reads defined by [`CounterStore`]. Reads for disjoint key prefixes
//! are independent and side-effect-free, so callers may issue them
//! concurrently.

pub mod key;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::collections::BTreeMap;

use crate::core::errors::Result;

/// Narrow read interface over the sparse counter store.
pub trait CounterStore {
    /// Every key matching a prefix-style pattern (`"cases_us*"`), with its
    /// decimal-string value. No defined value order; empty map on no match.
    fn get_all_by_pattern(&self, pattern: &str) -> Result<BTreeMap<String, String>>;

    /// The scalar value at `key`, or `None` if not set.
    fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Whether `key` matches a prefix-style `pattern`.
///
/// A trailing `*` matches any suffix; a pattern without one matches exactly.
#[must_use]
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or(key == pattern, |prefix| key.starts_with(prefix))
}
