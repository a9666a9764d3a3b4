//! Double-array trie structures
//!
//! This module provides the updatable double-array trie map together with the
//! trait surface for map-style tries, state inspection, and statistics.

pub mod double_array;
pub mod traits;

// Re-export core types
pub use double_array::{DoubleArrayMap, DoubleArrayMapBuilder, DoubleArrayMapConfig, PrefixIter};
pub use traits::{StateInspectable, StatisticsProvider, TrieMap, TrieStats};
