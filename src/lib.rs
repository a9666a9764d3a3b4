//! # Datmap: Updatable Double-Array Trie Map
//!
//! This crate provides a compact associative trie over byte-string keys,
//! mapping arbitrary byte sequences to values of an opaque type `V`:
//!
//! - **Constant-time transitions**: each step of a lookup is a single indexed
//!   array access validated by a parent back-reference
//! - **Compact representation**: 8 bytes per state across two parallel arrays,
//!   with memory proportional to the number of distinct key-path edges
//! - **Fully updatable**: insertion, exact-key lookup, and deletion, with
//!   reclaimed slots recycled through a free list
//!
//! # Algorithm Overview
//!
//! The trie is encoded in two parallel arrays:
//! - `base`: base addresses for state transitions
//! - `check`: parent state ids for transition validation
//!
//! For a transition from state `s` with byte `b`:
//! ```text
//! next_state = base[s] + b
//! if check[next_state] == s then the transition is valid
//! ```
//!
//! When an insertion computes a slot already owned by an unrelated state, the
//! smaller of the two sibling sets is relocated to a fresh region, bounding
//! the amortized cost of conflict resolution.
//!
//! # Quick Start
//!
//! ```rust
//! use datmap::DoubleArrayMap;
//!
//! let mut map = DoubleArrayMap::new();
//! map.insert(b"apple", 1u32).unwrap();
//! map.insert(b"apply", 2).unwrap();
//!
//! assert_eq!(map.get(b"apple"), Some(&1));
//! assert_eq!(map.get(b"app"), None); // prefix without its own value
//!
//! assert_eq!(map.remove(b"apple"), Some(1));
//! assert_eq!(map.get(b"apply"), Some(&2));
//! ```
//!
//! Membership sets with caller-interpreted expiry (a common blocklist
//! pattern) store the deadline as the value; the engine performs no
//! time-based eviction of its own:
//!
//! ```rust
//! use datmap::DoubleArrayMap;
//!
//! let now: i64 = 1_700_000_000;
//! let mut blocklist = DoubleArrayMap::new();
//! blocklist.insert(b"16117700", now + 3600).unwrap();
//!
//! let blocked = blocklist.get(b"16117700").map_or(false, |&until| now <= until);
//! assert!(blocked);
//! ```
//!
//! # Concurrency
//!
//! [`DoubleArrayMap`] has no interior locking. Mutating operations perform
//! multi-step array edits, so callers must impose an exclusive-writer /
//! shared-reader discipline: wrap the map in a `Mutex` or `RwLock` when it is
//! shared across threads. The map is `Send` and `Sync` exactly when `V` is.

#![warn(missing_docs)]

pub mod error;
pub mod trie;

// Re-export core types
pub use error::{DatmapError, Result};
pub use trie::{
    DoubleArrayMap, DoubleArrayMapBuilder, DoubleArrayMapConfig, PrefixIter, StateInspectable,
    StatisticsProvider, TrieMap, TrieStats,
};

/// State identifier type used throughout the crate.
///
/// Each state is an index into the trie's parallel `base`/`check` arrays.
pub type StateId = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_size() {
        assert_eq!(std::mem::size_of::<StateId>(), 4);
    }

    #[test]
    fn test_public_api_surface() {
        let mut map: DoubleArrayMap<u64> = DoubleArrayMap::new();
        map.insert(b"key", 7).unwrap();
        assert_eq!(map.get(b"key"), Some(&7));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(b"key"), Some(7));
        assert!(map.is_empty());
    }
}
