//! Updatable double-array trie map
//!
//! This module provides a double-array trie keyed by byte strings and
//! carrying one value per stored key:
//! - **Constant-time transitions**: `base[s] + byte` indexed access with
//!   parent validation through `check`
//! - **Compact representation**: 8 bytes per state across two parallel arrays
//! - **In-place updates**: insertion with bounded conflict relocation,
//!   deletion with slot reclamation through a free list
//!
//! # Memory Layout
//!
//! Each state is represented in 8 bytes:
//! ```text
//! base[i]:  u32 - base address for transitions (0 = no child edges)
//! check[i]: u32 - parent state id + flags
//!   - bits 0-29: parent state id (1G states maximum)
//!   - bit 30:    terminal flag (state ends a stored key)
//!   - bit 31:    free flag (slot is on the free list)
//! ```
//!
//! Free slots are threaded into a circular doubly-linked list through their
//! own `base` (forward link) and `check` (backward link) words, so reclaimed
//! slots are found in O(1) without scanning the arrays.
//!
//! Values live in a side table keyed by terminal state id, and each branching
//! state keeps its active transition bytes in a sorted list, so collision
//! relocation and deletion never rediscover children by probing 256 slots.

use crate::error::{DatmapError, Result};
use crate::trie::traits::{StateInspectable, StatisticsProvider, TrieMap, TrieStats};
use crate::StateId;

use ahash::RandomState;
use smallvec::SmallVec;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bit masks for check array flags
const PARENT_MASK: u32 = 0x3FFF_FFFF; // Bits 0-29: parent state id
const TERMINAL_FLAG: u32 = 0x4000_0000; // Bit 30: terminal flag
const FREE_FLAG: u32 = 0x8000_0000; // Bit 31: free flag

/// The root state; never relocated, never reclaimed.
const ROOT_STATE: StateId = 0;

/// Hard ceiling on the number of addressable slots (parent field width).
const MAX_STATES: usize = (PARENT_MASK as usize) + 1;

/// Failed base candidates tolerated per search before growing a fresh
/// region. Slots too low to form a base are skipped without counting; at
/// most 255 such slots can exist.
const FREE_SCAN_LIMIT: usize = 64;

/// Sorted transition bytes of one state; inline up to 4 children.
type ByteSet = SmallVec<[u8; 4]>;

/// Side table keyed by state id.
type SideTable<T> = HashMap<StateId, T, RandomState>;

/// Configuration for a [`DoubleArrayMap`]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DoubleArrayMapConfig {
    /// Initial number of array slots
    pub initial_capacity: usize,
    /// Growth factor when the arrays are extended (3/2 by default)
    pub growth_factor: f64,
    /// Upper bound on the number of array slots; capped at 2^30
    pub max_states: usize,
}

impl Default for DoubleArrayMapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            growth_factor: 1.5,
            max_states: MAX_STATES,
        }
    }
}

impl DoubleArrayMapConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_capacity < 16 {
            return Err(DatmapError::configuration(
                "initial_capacity must be at least 16",
            ));
        }
        if !(self.growth_factor > 1.0) {
            return Err(DatmapError::configuration(
                "growth_factor must exceed 1.0",
            ));
        }
        if self.max_states > MAX_STATES {
            return Err(DatmapError::configuration(format!(
                "max_states cannot exceed {}",
                MAX_STATES
            )));
        }
        if self.max_states < self.initial_capacity {
            return Err(DatmapError::configuration(
                "max_states must be at least initial_capacity",
            ));
        }
        Ok(())
    }
}

/// Updatable double-array trie map over byte-string keys
///
/// Maps arbitrary byte sequences to values of `V` with O(key length)
/// insertion, lookup, and removal. Memory is proportional to the number of
/// distinct key-path edges; slots released by removals are recycled through
/// a free list before the arrays grow.
///
/// The empty key is valid and stored at the root state.
///
/// # Examples
///
/// ```rust
/// use datmap::DoubleArrayMap;
///
/// let mut map = DoubleArrayMap::new();
/// map.insert(b"car", 1u32).unwrap();
/// map.insert(b"cart", 2).unwrap();
///
/// assert_eq!(map.get(b"car"), Some(&1));
/// assert_eq!(map.get(b"ca"), None);
/// assert_eq!(map.remove(b"cart"), Some(2));
/// assert_eq!(map.get(b"car"), Some(&1));
/// ```
pub struct DoubleArrayMap<V> {
    /// Base array for transition calculations
    base: Vec<u32>,
    /// Check array with parent state + flags
    check: Vec<u32>,
    /// Values stored at terminal states
    values: SideTable<V>,
    /// Sorted transition bytes per branching state
    children: SideTable<ByteSet>,
    /// Entry into the circular free list, if any slot is free
    free_head: Option<StateId>,
    /// Number of keys stored in the map
    num_keys: usize,
    /// Configuration
    config: DoubleArrayMapConfig,
}

impl<V> DoubleArrayMap<V> {
    /// Align capacity to cache-friendly boundaries
    #[inline]
    fn align_capacity(capacity: usize) -> usize {
        if capacity <= 64 {
            capacity.next_power_of_two()
        } else {
            // 16 u32 slots per 64-byte cache line
            let cache_line_slots = 64 / std::mem::size_of::<u32>();
            capacity.div_ceil(cache_line_slots) * cache_line_slots
        }
    }

    /// Create a new empty map with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datmap::DoubleArrayMap;
    ///
    /// let map: DoubleArrayMap<u64> = DoubleArrayMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_validated_config(DoubleArrayMapConfig::default())
    }

    /// Create a new map with a custom configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datmap::{DoubleArrayMap, DoubleArrayMapConfig};
    ///
    /// let config = DoubleArrayMapConfig {
    ///     initial_capacity: 2048,
    ///     ..Default::default()
    /// };
    /// let map: DoubleArrayMap<u64> = DoubleArrayMap::with_config(config).unwrap();
    /// assert!(map.capacity() >= 2048);
    /// ```
    pub fn with_config(config: DoubleArrayMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_validated_config(config))
    }

    fn with_validated_config(config: DoubleArrayMapConfig) -> Self {
        let capacity = Self::align_capacity(config.initial_capacity).min(config.max_states);

        let mut map = Self {
            base: vec![0; capacity],
            check: vec![0; capacity],
            values: SideTable::default(),
            children: SideTable::default(),
            free_head: None,
            num_keys: 0,
            config,
        };

        // Root is live at slot 0; every other slot starts on the free list.
        for slot in 1..capacity {
            map.free_push(slot as StateId);
        }
        map
    }

    /// Get the configuration
    pub fn config(&self) -> &DoubleArrayMapConfig {
        &self.config
    }

    /// Get the current number of array slots
    pub fn capacity(&self) -> usize {
        self.check.len()
    }

    /// Get the number of keys stored
    pub fn len(&self) -> usize {
        self.num_keys
    }

    /// Check if the map holds no keys
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    // --- free list -------------------------------------------------------
    //
    // Free slots form a circular doubly-linked list threaded through the
    // arrays: `base` holds the forward link, the parent bits of `check` the
    // backward link. `free_head` is the list entry point.

    #[inline]
    fn free_next(&self, slot: StateId) -> StateId {
        self.base[slot as usize]
    }

    #[inline]
    fn free_prev(&self, slot: StateId) -> StateId {
        self.check[slot as usize] & PARENT_MASK
    }

    fn free_push(&mut self, slot: StateId) {
        match self.free_head {
            None => {
                self.base[slot as usize] = slot;
                self.check[slot as usize] = FREE_FLAG | slot;
                self.free_head = Some(slot);
            }
            Some(head) => {
                // Link at the tail, keeping low slots near the head.
                let tail = self.free_prev(head);
                self.base[slot as usize] = head;
                self.check[slot as usize] = FREE_FLAG | tail;
                self.base[tail as usize] = slot;
                self.check[head as usize] = FREE_FLAG | slot;
            }
        }
    }

    fn free_detach(&mut self, slot: StateId) {
        debug_assert!(self.check[slot as usize] & FREE_FLAG != 0);
        let next = self.free_next(slot);
        if next == slot {
            self.free_head = None;
            return;
        }
        let prev = self.free_prev(slot);
        self.base[prev as usize] = next;
        self.check[next as usize] = FREE_FLAG | prev;
        if self.free_head == Some(slot) {
            self.free_head = Some(next);
        }
    }

    // --- state helpers ---------------------------------------------------

    #[inline]
    fn is_terminal(&self, state: StateId) -> bool {
        self.check[state as usize] & TERMINAL_FLAG != 0
    }

    #[inline]
    fn set_terminal(&mut self, state: StateId, terminal: bool) {
        let word = &mut self.check[state as usize];
        if terminal {
            *word |= TERMINAL_FLAG;
        } else {
            *word &= !TERMINAL_FLAG;
        }
    }

    #[inline]
    fn parent_of(&self, state: StateId) -> StateId {
        self.check[state as usize] & PARENT_MASK
    }

    #[inline]
    fn child_count(&self, state: StateId) -> usize {
        self.children.get(&state).map_or(0, |bytes| bytes.len())
    }

    /// Resolve the child of `state` for `byte`, if that edge exists
    #[inline]
    fn child_of(&self, state: StateId, byte: u8) -> Option<StateId> {
        let base = self.base[state as usize];
        if base == 0 {
            return None;
        }
        let slot = base as usize + byte as usize;
        match self.check.get(slot) {
            Some(&word) if word & FREE_FLAG == 0 && word & PARENT_MASK == state => {
                Some(slot as StateId)
            }
            _ => None,
        }
    }

    /// Follow the byte path of `key` from the root without allocating
    fn walk(&self, key: &[u8]) -> Option<StateId> {
        let mut state = ROOT_STATE;
        for &byte in key {
            state = self.child_of(state, byte)?;
        }
        Some(state)
    }

    /// Take a free slot out of the free list and attach it under `parent`
    fn claim_slot(&mut self, slot: StateId, parent: StateId) {
        self.free_detach(slot);
        self.check[slot as usize] = parent & PARENT_MASK;
        self.base[slot as usize] = 0;
    }

    /// Return a slot to the free list
    fn release_slot(&mut self, slot: StateId) {
        debug_assert_ne!(slot, ROOT_STATE);
        debug_assert!(!self.values.contains_key(&slot));
        debug_assert!(!self.children.contains_key(&slot));
        self.free_push(slot);
    }

    fn link_child(&mut self, parent: StateId, byte: u8) {
        let bytes = self.children.entry(parent).or_default();
        if let Err(pos) = bytes.binary_search(&byte) {
            bytes.insert(pos, byte);
        }
    }

    fn unlink_child(&mut self, parent: StateId, byte: u8) {
        if let Some(bytes) = self.children.get_mut(&parent) {
            if let Ok(pos) = bytes.binary_search(&byte) {
                bytes.remove(pos);
            }
            if bytes.is_empty() {
                self.children.remove(&parent);
                // No children left: the base range is up for grabs again.
                self.base[parent as usize] = 0;
            }
        }
    }

    // --- growth and base search ------------------------------------------

    /// Extend the arrays to at least `min_len` slots, linking the new slots
    /// onto the free list
    fn grow_to(&mut self, min_len: usize) -> Result<()> {
        let len = self.check.len();
        if min_len <= len {
            return Ok(());
        }
        if min_len > self.config.max_states {
            return Err(DatmapError::state_space(min_len, self.config.max_states));
        }
        let grown = ((len as f64 * self.config.growth_factor) as usize).max(min_len);
        let new_len = Self::align_capacity(grown)
            .min(self.config.max_states)
            .max(min_len);

        self.base.resize(new_len, 0);
        self.check.resize(new_len, 0);
        for slot in len..new_len {
            self.free_push(slot as StateId);
        }
        // Aim the next base search at the fresh region.
        self.free_head = Some(len as StateId);
        Ok(())
    }

    /// Check that `cand` places every byte of `bytes` on a free in-array slot
    fn base_fits(&self, cand: u32, bytes: &[u8]) -> bool {
        bytes.iter().all(|&byte| {
            let slot = cand as usize + byte as usize;
            slot < self.check.len() && self.check[slot] & FREE_FLAG != 0
        })
    }

    /// Find a base placing every byte of `bytes` on a free slot
    ///
    /// Probes a bounded number of free-list candidates first; when none fits,
    /// falls back to a fresh region at the end of the arrays, growing them.
    /// After a successful return every target slot exists and is free, so the
    /// caller's claims cannot fail.
    fn find_base(&mut self, bytes: &[u8]) -> Result<u32> {
        debug_assert!(!bytes.is_empty());
        debug_assert!(bytes.windows(2).all(|w| w[0] < w[1]));

        let first = bytes[0] as u32;
        if let Some(head) = self.free_head {
            let mut slot = head;
            let mut failures = 0;
            loop {
                // Candidate base mapping the smallest byte onto this slot.
                // Slots at or below `first` cannot form a positive base.
                if slot > first {
                    let cand = slot - first;
                    if self.base_fits(cand, bytes) {
                        // Rotate the entry point so the next search resumes
                        // here instead of rescanning exhausted low slots.
                        self.free_head = Some(slot);
                        return Ok(cand);
                    }
                    failures += 1;
                    if failures >= FREE_SCAN_LIMIT {
                        self.free_head = Some(slot);
                        break;
                    }
                }
                slot = self.free_next(slot);
                if slot == head {
                    break;
                }
            }
        }

        // Fresh region: place the smallest byte at the current end of the
        // arrays so every target lands in newly grown space.
        let len = self.check.len() as u32;
        let cand = if len > first { len - first } else { len.max(1) };
        let last = bytes[bytes.len() - 1] as u32;
        self.grow_to(cand as usize + last as usize + 1)?;
        Ok(cand)
    }

    // --- insertion -------------------------------------------------------

    /// Insert `key` with `value`, returning the previous value if the key was
    /// already present
    ///
    /// Re-inserting an existing key replaces its value without allocating new
    /// states. Fails only when array growth would exceed the configured state
    /// space; in that case the map is left as if the insert had never been
    /// attempted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datmap::DoubleArrayMap;
    ///
    /// let mut map = DoubleArrayMap::new();
    /// assert_eq!(map.insert(b"key", 1u32).unwrap(), None);
    /// assert_eq!(map.insert(b"key", 2).unwrap(), Some(1));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<Option<V>> {
        let mut state = ROOT_STATE;
        for (depth, &byte) in key.iter().enumerate() {
            state = match self.child_of(state, byte) {
                Some(next) => next,
                None => match self.add_transition(state, byte) {
                    Ok(next) => next,
                    Err(err) => {
                        // Nodes created for this key's unique suffix are
                        // dangling; prune them so the failed insert is
                        // observably a no-op.
                        self.prune_path(state, &key[..depth]);
                        return Err(err);
                    }
                },
            };
        }

        let previous = self.values.insert(state, value);
        if previous.is_none() {
            self.set_terminal(state, true);
            self.num_keys += 1;
        }
        Ok(previous)
    }

    /// Create the edge `(parent, byte)`, resolving any slot conflict
    fn add_transition(&mut self, parent: StateId, byte: u8) -> Result<StateId> {
        let base = self.base[parent as usize];
        if base == 0 {
            // First edge out of this state: pick a base for the single byte.
            let new_base = self.find_base(&[byte])?;
            let slot = new_base + byte as u32;
            self.base[parent as usize] = new_base;
            self.claim_slot(slot, parent);
            self.link_child(parent, byte);
            return Ok(slot);
        }

        let slot = base as usize + byte as usize;
        if slot >= self.config.max_states {
            // The fixed base cannot address this byte within the state
            // space; move this state's sibling set to a lower base.
            return self.relocate_for_insert(parent, byte);
        }
        self.grow_to(slot + 1)?;
        if self.check[slot] & FREE_FLAG != 0 {
            self.claim_slot(slot as StateId, parent);
            self.link_child(parent, byte);
            return Ok(slot as StateId);
        }
        self.resolve_collision(parent, byte)
    }

    /// Resolve a claimed-slot conflict by relocating the smaller sibling set
    ///
    /// The candidate slot for `(parent, byte)` is owned by another state's
    /// child. Either `parent`'s children (plus the pending edge) or the
    /// owner's children move to a fresh base; picking the smaller set keeps
    /// relocation cost amortized low.
    fn resolve_collision(&mut self, parent: StateId, byte: u8) -> Result<StateId> {
        let slot = self.base[parent as usize] + byte as u32;
        let owner = self.parent_of(slot);
        debug_assert_ne!(owner, parent);

        if self.child_count(parent) + 1 <= self.child_count(owner) {
            return self.relocate_for_insert(parent, byte);
        }

        let owner_bytes = match self.children.get(&owner) {
            Some(bytes) => bytes.clone(),
            None => {
                return Err(DatmapError::corruption(
                    "occupied slot owner has no children index",
                ))
            }
        };

        // If `parent` is itself one of the owner's children its id is about
        // to change; remember its offset under the owner's base.
        let owner_base = self.base[owner as usize];
        let parent_offset = if parent != ROOT_STATE && self.parent_of(parent) == owner {
            Some((parent - owner_base) as u8)
        } else {
            None
        };

        let new_base = self.find_base(&owner_bytes)?;
        self.relocate_children(owner, new_base);

        let parent = match parent_offset {
            Some(offset) => new_base + offset as u32,
            None => parent,
        };

        if self.check[slot as usize] & FREE_FLAG == 0 {
            return Err(DatmapError::corruption(
                "collision slot still occupied after relocation",
            ));
        }
        self.claim_slot(slot, parent);
        self.link_child(parent, byte);
        Ok(slot)
    }

    /// Move `parent`'s own sibling set to a base that also fits `byte`, then
    /// claim the new edge
    fn relocate_for_insert(&mut self, parent: StateId, byte: u8) -> Result<StateId> {
        let mut bytes = self.children.get(&parent).cloned().unwrap_or_default();
        match bytes.binary_search(&byte) {
            Err(pos) => bytes.insert(pos, byte),
            Ok(_) => {
                return Err(DatmapError::corruption(
                    "edge already linked for colliding byte",
                ))
            }
        }

        let new_base = self.find_base(&bytes)?;
        self.relocate_children(parent, new_base);

        let slot = new_base + byte as u32;
        self.claim_slot(slot, parent);
        self.link_child(parent, byte);
        Ok(slot)
    }

    /// Move every child of `state` from its current base to `new_base`
    ///
    /// Rewrites the moved children's `check` words, re-parents grandchildren,
    /// and migrates value-table and children-index entries keyed by the moved
    /// states. All target slots must already be free (`find_base` guarantees
    /// this), so the pass cannot fail partway.
    fn relocate_children(&mut self, state: StateId, new_base: u32) {
        let bytes = self.children.get(&state).cloned().unwrap_or_default();
        let old_base = self.base[state as usize];

        for &byte in &bytes {
            let from = old_base + byte as u32;
            let to = new_base + byte as u32;
            debug_assert!(self.check[to as usize] & FREE_FLAG != 0);

            self.free_detach(to);
            self.base[to as usize] = self.base[from as usize];
            self.check[to as usize] =
                (state & PARENT_MASK) | (self.check[from as usize] & TERMINAL_FLAG);

            // Grandchildren stay in place; only their parent pointers move.
            if let Some(grand_bytes) = self.children.remove(&from) {
                let grand_base = self.base[from as usize];
                for &g in &grand_bytes {
                    let grandchild = (grand_base + g as u32) as usize;
                    self.check[grandchild] = (self.check[grandchild] & !PARENT_MASK) | to;
                }
                self.children.insert(to, grand_bytes);
            }
            if let Some(value) = self.values.remove(&from) {
                self.values.insert(to, value);
            }

            self.free_push(from);
        }

        self.base[state as usize] = new_base;
    }

    // --- lookup ----------------------------------------------------------

    /// Look up the value stored for an exact key
    ///
    /// O(key length), no allocation, no backtracking. A key present only as
    /// a prefix of other keys has no value of its own and yields `None`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let state = self.walk(key)?;
        self.values.get(&state)
    }

    /// Look up a mutable reference to the value stored for an exact key
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let state = self.walk(key)?;
        self.values.get_mut(&state)
    }

    /// Check if a key is present with a value of its own
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Resolve the state reached by following `key`'s byte path, terminal
    /// or not
    ///
    /// Useful with [`StateInspectable`] to examine the structure around a
    /// key. Returns `None` when the path does not exist.
    pub fn locate(&self, key: &[u8]) -> Option<StateId> {
        self.walk(key)
    }

    // --- removal ---------------------------------------------------------

    /// Remove a key, returning its value if it was present
    ///
    /// Removing an absent key is a no-op. States left without a value and
    /// without children are released back to the free list, ascending toward
    /// the root but never past a state still needed by sibling keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datmap::DoubleArrayMap;
    ///
    /// let mut map = DoubleArrayMap::new();
    /// map.insert(b"cart", 1u32).unwrap();
    /// assert_eq!(map.remove(b"cart"), Some(1));
    /// assert_eq!(map.remove(b"cart"), None);
    /// ```
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let state = self.walk(key)?;
        let value = self.values.remove(&state)?;
        self.set_terminal(state, false);
        self.num_keys -= 1;
        self.prune_path(state, key);
        Some(value)
    }

    /// Release the chain of valueless, childless states ending at `state`
    ///
    /// `consumed` is the byte path from the root to `state`. Ascends until a
    /// state with a value or remaining children is reached, or the root.
    /// Shared by removal and by the failed-insert cleanup.
    fn prune_path(&mut self, mut state: StateId, consumed: &[u8]) {
        let mut depth = consumed.len();
        while state != ROOT_STATE
            && !self.is_terminal(state)
            && !self.children.contains_key(&state)
        {
            let parent = self.parent_of(state);
            self.unlink_child(parent, consumed[depth - 1]);
            self.release_slot(state);
            state = parent;
            depth -= 1;
        }
    }

    /// Remove all keys, keeping the allocated capacity
    pub fn clear(&mut self) {
        self.values.clear();
        self.children.clear();
        self.num_keys = 0;
        self.free_head = None;

        let capacity = self.check.len();
        self.base.iter_mut().for_each(|word| *word = 0);
        self.check.iter_mut().for_each(|word| *word = 0);
        for slot in 1..capacity {
            self.free_push(slot as StateId);
        }
    }

    // --- iteration -------------------------------------------------------

    /// Iterate over all stored `(key, value)` pairs whose key starts with
    /// `prefix`, in lexicographic key order
    pub fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> PrefixIter<'a, V> {
        PrefixIter::new(self, prefix)
    }

    /// Iterate over all stored `(key, value)` pairs in lexicographic key
    /// order
    pub fn iter(&self) -> PrefixIter<'_, V> {
        self.iter_prefix(&[])
    }
}

impl<V> Default for DoubleArrayMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for DoubleArrayMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleArrayMap")
            .field("capacity", &self.check.len())
            .field("num_keys", &self.num_keys)
            .field("branching_states", &self.children.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<V> TrieMap for DoubleArrayMap<V> {
    type Value = V;

    fn insert(&mut self, key: &[u8], value: V) -> Result<Option<V>> {
        DoubleArrayMap::insert(self, key, value)
    }

    fn get(&self, key: &[u8]) -> Option<&V> {
        DoubleArrayMap::get(self, key)
    }

    fn remove(&mut self, key: &[u8]) -> Option<V> {
        DoubleArrayMap::remove(self, key)
    }

    fn len(&self) -> usize {
        DoubleArrayMap::len(self)
    }
}

impl<V> StateInspectable for DoubleArrayMap<V> {
    fn out_degree(&self, state: StateId) -> usize {
        self.child_count(state)
    }

    fn out_symbols(&self, state: StateId) -> Vec<u8> {
        self.children
            .get(&state)
            .map_or_else(Vec::new, |bytes| bytes.to_vec())
    }
}

impl<V> StatisticsProvider for DoubleArrayMap<V> {
    fn stats(&self) -> TrieStats {
        let capacity = self.check.len();
        let free_slots = self
            .check
            .iter()
            .filter(|&&word| word & FREE_FLAG != 0)
            .count();
        let num_transitions = self.children.values().map(|bytes| bytes.len()).sum();

        let array_bytes = capacity * 2 * std::mem::size_of::<u32>();
        let value_bytes =
            self.values.len() * (std::mem::size_of::<StateId>() + std::mem::size_of::<V>());
        let children_bytes =
            self.children.len() * (std::mem::size_of::<StateId>() + std::mem::size_of::<ByteSet>());

        let mut stats = TrieStats {
            num_states: capacity - free_slots,
            num_keys: self.num_keys,
            num_transitions,
            free_slots,
            capacity,
            memory_usage: array_bytes + value_bytes + children_bytes,
            bits_per_key: 0.0,
        };
        stats.calculate_bits_per_key();
        stats
    }
}

/// Lazy depth-first iterator over the `(key, value)` pairs under a prefix
///
/// Yields keys in lexicographic byte order; each step follows the sorted
/// per-state children index, so iteration cost is proportional to the
/// subtrie actually visited.
#[derive(Debug)]
pub struct PrefixIter<'a, V> {
    map: &'a DoubleArrayMap<V>,
    /// Bytes consumed from the root to the state on top of the stack
    path: Vec<u8>,
    /// DFS frames: (state, cursor). Cursor 0 means the state's own value is
    /// still pending; cursor k > 0 points at child position k - 1.
    stack: Vec<(StateId, usize)>,
}

impl<'a, V> PrefixIter<'a, V> {
    fn new(map: &'a DoubleArrayMap<V>, prefix: &[u8]) -> Self {
        let mut iter = Self {
            map,
            path: prefix.to_vec(),
            stack: Vec::new(),
        };
        if let Some(state) = map.walk(prefix) {
            iter.stack.push((state, 0));
        }
        iter
    }
}

impl<'a, V> Iterator for PrefixIter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        loop {
            let frame = self.stack.last_mut()?;
            let state = frame.0;

            if frame.1 == 0 {
                frame.1 = 1;
                if let Some(value) = map.values.get(&state) {
                    return Some((self.path.clone(), value));
                }
                continue;
            }

            let pos = frame.1 - 1;
            let byte = map
                .children
                .get(&state)
                .and_then(|bytes| bytes.get(pos))
                .copied();
            match byte {
                Some(byte) => {
                    frame.1 += 1;
                    let child = map.base[state as usize] + byte as u32;
                    self.path.push(byte);
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                    if !self.stack.is_empty() {
                        self.path.pop();
                    }
                }
            }
        }
    }
}

/// Builder for constructing maps from bulk `(key, value)` sequences
///
/// Pre-sizes the arrays from the pair count and inserts in sorted key order
/// for construction locality. Later duplicates of a key overwrite earlier
/// ones.
///
/// # Examples
///
/// ```rust
/// use datmap::DoubleArrayMapBuilder;
///
/// let pairs = vec![
///     (b"apple".to_vec(), 1u32),
///     (b"apply".to_vec(), 2),
///     (b"banana".to_vec(), 3),
/// ];
/// let map = DoubleArrayMapBuilder::new().build_from_pairs(pairs).unwrap();
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.get(b"apply"), Some(&2));
/// ```
#[derive(Debug)]
pub struct DoubleArrayMapBuilder {
    config: DoubleArrayMapConfig,
}

impl DoubleArrayMapBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: DoubleArrayMapConfig::default(),
        }
    }

    /// Create a new builder with a custom configuration
    pub fn with_config(config: DoubleArrayMapConfig) -> Self {
        Self { config }
    }

    /// Build a map from a sequence of `(key, value)` pairs
    pub fn build_from_pairs<V, I>(self, pairs: I) -> Result<DoubleArrayMap<V>>
    where
        I: IntoIterator<Item = (Vec<u8>, V)>,
    {
        let mut pairs: Vec<(Vec<u8>, V)> = pairs.into_iter().collect();
        // Stable sort: duplicate keys keep their order, so the last insert
        // of a key wins, matching incremental overwrite semantics.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut config = self.config;
        let estimated = pairs.len().saturating_mul(2).saturating_add(256);
        config.initial_capacity = config
            .initial_capacity
            .max(estimated)
            .min(config.max_states);

        let mut map = DoubleArrayMap::with_config(config)?;
        for (key, value) in pairs {
            map.insert(&key, value)?;
        }
        Ok(map)
    }
}

impl Default for DoubleArrayMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
