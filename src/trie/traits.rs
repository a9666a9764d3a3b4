//! Core traits for map-style tries
//!
//! These traits describe the operations a byte-keyed trie map exposes,
//! independent of its encoding, plus inspection and statistics surfaces.

use crate::error::Result;
use crate::StateId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for trie structures that associate values with byte-string keys
pub trait TrieMap {
    /// The value type stored at terminal states
    type Value;

    /// Insert a key with its value, returning the previous value if the key
    /// was already present
    fn insert(&mut self, key: &[u8], value: Self::Value) -> Result<Option<Self::Value>>;

    /// Look up the value stored for an exact key
    ///
    /// A key present only as a prefix of other keys has no value of its own
    /// and yields `None`.
    fn get(&self, key: &[u8]) -> Option<&Self::Value>;

    /// Remove a key, returning its value if it was present
    ///
    /// Removing an absent key is a no-op, not an error.
    fn remove(&mut self, key: &[u8]) -> Option<Self::Value>;

    /// Get the number of keys stored
    fn len(&self) -> usize;

    /// Check if the map holds no keys
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a key is present with a value of its own
    fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// Trait for tries that support state inspection
pub trait StateInspectable {
    /// Get the outgoing degree (number of child edges) of a state
    fn out_degree(&self, state: StateId) -> usize;

    /// Get all outgoing transition bytes of a state, in ascending order
    fn out_symbols(&self, state: StateId) -> Vec<u8>;

    /// Check if a state has no outgoing edges
    fn is_leaf(&self, state: StateId) -> bool {
        self.out_degree(state) == 0
    }
}

/// Statistics about trie structure and memory usage
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrieStats {
    /// Number of live states
    pub num_states: usize,
    /// Number of keys stored
    pub num_keys: usize,
    /// Total number of edges between states
    pub num_transitions: usize,
    /// Number of array slots currently on the free list
    pub free_slots: usize,
    /// Total number of array slots allocated
    pub capacity: usize,
    /// Approximate memory usage in bytes
    pub memory_usage: usize,
    /// Space efficiency (bits per key)
    pub bits_per_key: f64,
}

impl TrieStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate bits per key from the memory usage and key count
    pub fn calculate_bits_per_key(&mut self) {
        if self.num_keys > 0 {
            self.bits_per_key = (self.memory_usage * 8) as f64 / self.num_keys as f64;
        }
    }
}

/// Trait for tries that report structural statistics
pub trait StatisticsProvider {
    /// Get detailed statistics about the trie
    fn stats(&self) -> TrieStats;

    /// Get approximate memory usage in bytes
    fn memory_usage(&self) -> usize {
        self.stats().memory_usage
    }

    /// Get space efficiency in bits per key
    fn bits_per_key(&self) -> f64 {
        self.stats().bits_per_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock implementation for exercising the trait defaults
    struct MockMap {
        entries: std::collections::HashMap<Vec<u8>, u32>,
    }

    impl TrieMap for MockMap {
        type Value = u32;

        fn insert(&mut self, key: &[u8], value: u32) -> Result<Option<u32>> {
            Ok(self.entries.insert(key.to_vec(), value))
        }

        fn get(&self, key: &[u8]) -> Option<&u32> {
            self.entries.get(key)
        }

        fn remove(&mut self, key: &[u8]) -> Option<u32> {
            self.entries.remove(key)
        }

        fn len(&self) -> usize {
            self.entries.len()
        }
    }

    #[test]
    fn test_trie_map_defaults() {
        let mut map = MockMap {
            entries: std::collections::HashMap::new(),
        };

        assert!(map.is_empty());
        map.insert(b"hello", 1).unwrap();
        assert!(!map.is_empty());
        assert!(map.contains_key(b"hello"));
        assert!(!map.contains_key(b"world"));
    }

    #[test]
    fn test_trie_stats() {
        let mut stats = TrieStats::new();
        stats.num_keys = 100;
        stats.memory_usage = 1024;

        stats.calculate_bits_per_key();
        assert!((stats.bits_per_key - 81.92).abs() < 0.01);
    }

    #[test]
    fn test_trie_stats_no_keys() {
        let mut stats = TrieStats::new();
        stats.memory_usage = 1024;
        stats.calculate_bits_per_key();
        assert_eq!(stats.bits_per_key, 0.0);
    }
}
