//! Persistent (immutable) unordered key/value mapping.
//!
//! This module provides [`Map`], an immutable hash map with structural
//! sharing, plus its iterator and builder.
//!
//! # Overview
//!
//! `Map` is a Hash Array Mapped Trie (HAMT): a 32-way trie whose levels
//! dispatch on successive 5-bit slices of the key's 32-bit hash. Small
//! maps (up to 8 entries) are kept in a flat association vector and
//! promoted to the trie on the ninth key. Inside the trie, sparse nodes
//! use a bitmap with a compact child vector; nodes that grow past 16
//! children promote to a fixed 32-slot array and never demote. Keys whose
//! full hashes collide sink level by level until the hash path is
//! exhausted at depth 6, where a collision node holds them, told apart by
//! the hasher's equality alone.
//!
//! - O(log32 N) expected `get`, `set`, `delete`
//! - O(1) `len` and `is_empty`
//!
//! Hashing and key equality come from a [`Hasher`] strategy carried by the
//! map; the default [`SeededHasher`] covers every `K: Hash + Eq` and mixes
//! in a process-wide random seed.
//!
//! Iteration order is deterministic for a given map instance but is not a
//! contract: it follows the hash-derived structure and may differ between
//! instances holding the same entries.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::Map;
//!
//! let map = Map::new().set("one", 1).set("two", 2);
//!
//! assert_eq!(map.get(&"one"), Some(&1));
//! assert_eq!(map.get(&"three"), None);
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.set("one", 100);
//! assert_eq!(map.get(&"one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get(&"one"), Some(&100)); // New version
//! ```

use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;

use crate::ReferenceCounter;
use crate::strategy::{Hasher, SeededHasher};

// =============================================================================
// Constants
// =============================================================================

/// Bits per level in the trie.
const BITS_PER_LEVEL: u32 = 5;

/// Branching factor (2^5 = 32).
const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Bit mask for extracting the slot index within a node.
const MASK: u32 = (BRANCHING_FACTOR - 1) as u32;

/// Largest map kept in the flat association-vector representation.
pub(crate) const MAX_ARRAY: usize = 8;

/// Largest bitmap-indexed node; one more child promotes it to a
/// hash-array node.
const MAX_BITMAP: usize = 16;

/// Depth at which the hash path is exhausted. Six 5-bit slices consume a
/// 32-bit hash (the slice at this depth sees only its trailing two
/// bits); keys that still coincide here share the full hash and belong
/// in a collision node.
const MAX_DEPTH: u32 = 6;

/// Extracts the child slot for `hash` at the given trie depth.
#[inline]
fn hash_slot(hash: u32, depth: u32) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as usize
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the HAMT.
#[derive(Clone)]
enum MapNode<K, V> {
    /// Flat association vector, used as the root while the map is tiny.
    Array { entries: SmallVec<[(K, V); 8]> },
    /// A single key/value leaf at a specific hash path.
    Value { hash: u32, key: K, value: V },
    /// Sparse branch: child *k* exists iff bitmap bit *k* is set, children
    /// packed by popcount of the preceding bits.
    Bitmap {
        bitmap: u32,
        children: Vec<ReferenceCounter<MapNode<K, V>>>,
    },
    /// Dense branch with a fixed 32-slot child array; never demotes.
    HashArray {
        count: u8,
        children: [Option<ReferenceCounter<MapNode<K, V>>>; BRANCHING_FACTOR],
    },
    /// Two or more entries whose full 32-bit hashes are identical but
    /// whose keys differ. Exists only where the hash path is exhausted.
    Collision { hash: u32, entries: Vec<(K, V)> },
}

impl<K, V> MapNode<K, V> {
    fn empty_array() -> Self {
        MapNode::Array {
            entries: SmallVec::new(),
        }
    }
}

/// Inserts `(key, value)` below `node`, cloning shared nodes along the
/// path. Returns `true` when a new entry was added (as opposed to an
/// existing key being overwritten).
fn insert_node<K, V, H>(
    node: &mut ReferenceCounter<MapNode<K, V>>,
    hasher: &H,
    depth: u32,
    hash: u32,
    key: K,
    value: V,
) -> bool
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    match node.as_ref() {
        MapNode::Array { entries } => {
            if let Some(position) = entries.iter().position(|(k, _)| hasher.equal(k, &key)) {
                let MapNode::Array { entries } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                entries[position] = (key, value);
                return false;
            }
            if entries.len() < MAX_ARRAY {
                let MapNode::Array { entries } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                entries.push((key, value));
                return true;
            }
            // The ninth key promotes the flat vector into trie form.
            let mut promoted = ReferenceCounter::new(MapNode::Bitmap {
                bitmap: 0,
                children: Vec::new(),
            });
            for (existing_key, existing_value) in entries.iter().cloned() {
                let existing_hash = hasher.hash(&existing_key);
                insert_node(
                    &mut promoted,
                    hasher,
                    depth,
                    existing_hash,
                    existing_key,
                    existing_value,
                );
            }
            let added = insert_node(&mut promoted, hasher, depth, hash, key, value);
            *node = promoted;
            added
        }
        MapNode::Value {
            hash: existing_hash,
            key: existing_key,
            value: existing_value,
        } => {
            if *existing_hash == hash && hasher.equal(existing_key, &key) {
                let MapNode::Value {
                    key: stored_key,
                    value: stored_value,
                    ..
                } = ReferenceCounter::make_mut(node)
                else {
                    unreachable!()
                };
                *stored_key = key;
                *stored_value = value;
                return false;
            }
            if *existing_hash == hash && depth >= MAX_DEPTH {
                // The hash path is exhausted: only key equality can tell
                // the entries apart from here on.
                let entries = vec![(existing_key.clone(), existing_value.clone()), (key, value)];
                *node = ReferenceCounter::new(MapNode::Collision { hash, entries });
                return true;
            }
            // Grow a sparse branch holding the existing leaf, then insert
            // into it. Keys whose hashes still agree at this depth share
            // the slot and sink one level per step, so a collision node
            // forms only once the path is exhausted.
            let existing = ReferenceCounter::new(MapNode::Value {
                hash: *existing_hash,
                key: existing_key.clone(),
                value: existing_value.clone(),
            });
            let bitmap = 1_u32 << hash_slot(*existing_hash, depth);
            let mut replacement = ReferenceCounter::new(MapNode::Bitmap {
                bitmap,
                children: vec![existing],
            });
            let added = insert_node(&mut replacement, hasher, depth, hash, key, value);
            *node = replacement;
            added
        }
        MapNode::Bitmap { bitmap, children } => {
            let slot = hash_slot(hash, depth);
            let bit = 1_u32 << slot;
            let position = (bitmap & (bit - 1)).count_ones() as usize;
            if bitmap & bit != 0 {
                let MapNode::Bitmap { children, .. } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                return insert_node(&mut children[position], hasher, depth + 1, hash, key, value);
            }
            if children.len() < MAX_BITMAP {
                let MapNode::Bitmap { bitmap, children } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                *bitmap |= bit;
                children.insert(
                    position,
                    ReferenceCounter::new(MapNode::Value { hash, key, value }),
                );
                return true;
            }
            // The seventeenth child promotes the sparse node into a dense
            // 32-slot array.
            let mut dense: [Option<ReferenceCounter<MapNode<K, V>>>; BRANCHING_FACTOR] =
                std::array::from_fn(|_| None);
            let mut packed = children.iter();
            for index in 0..BRANCHING_FACTOR {
                if bitmap & (1_u32 << index) != 0 {
                    dense[index] = packed.next().cloned();
                }
            }
            dense[slot] = Some(ReferenceCounter::new(MapNode::Value { hash, key, value }));
            let count = u8::try_from(children.len() + 1).unwrap_or(u8::MAX);
            *node = ReferenceCounter::new(MapNode::HashArray {
                count,
                children: dense,
            });
            true
        }
        MapNode::HashArray { .. } => {
            let slot = hash_slot(hash, depth);
            let MapNode::HashArray { count, children } = ReferenceCounter::make_mut(node) else {
                unreachable!()
            };
            if let Some(child) = &mut children[slot] {
                insert_node(child, hasher, depth + 1, hash, key, value)
            } else {
                children[slot] = Some(ReferenceCounter::new(MapNode::Value { hash, key, value }));
                *count += 1;
                true
            }
        }
        MapNode::Collision {
            hash: collision_hash,
            entries,
        } => {
            if *collision_hash == hash {
                if let Some(position) = entries.iter().position(|(k, _)| hasher.equal(k, &key)) {
                    let MapNode::Collision { entries, .. } = ReferenceCounter::make_mut(node)
                    else {
                        unreachable!()
                    };
                    entries[position] = (key, value);
                    return false;
                }
                let MapNode::Collision { entries, .. } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                entries.push((key, value));
                return true;
            }
            // A different hash reached this node: grow a sparse branch
            // holding the collision bundle, then insert beside it.
            let existing = node.clone();
            let bitmap = 1_u32 << hash_slot(*collision_hash, depth);
            let mut replacement = ReferenceCounter::new(MapNode::Bitmap {
                bitmap,
                children: vec![existing],
            });
            let added = insert_node(&mut replacement, hasher, depth, hash, key, value);
            *node = replacement;
            added
        }
    }
}

/// Removes `key` (which must be present) from below `node`. Returns
/// `true` when the node became empty and should be detached by its
/// parent.
fn remove_node<K, V, H>(
    node: &mut ReferenceCounter<MapNode<K, V>>,
    hasher: &H,
    depth: u32,
    hash: u32,
    key: &K,
) -> bool
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    match node.as_ref() {
        MapNode::Array { entries } => {
            let Some(position) = entries.iter().position(|(k, _)| hasher.equal(k, key)) else {
                unreachable!("Map::delete: key vanished between lookup and removal");
            };
            let MapNode::Array { entries } = ReferenceCounter::make_mut(node) else {
                unreachable!()
            };
            entries.remove(position);
            false
        }
        MapNode::Value { .. } => true,
        MapNode::Bitmap { bitmap, children } => {
            let slot = hash_slot(hash, depth);
            let bit = 1_u32 << slot;
            let position = (bitmap & (bit - 1)).count_ones() as usize;
            {
                let MapNode::Bitmap { bitmap, children } = ReferenceCounter::make_mut(node) else {
                    unreachable!()
                };
                if remove_node(&mut children[position], hasher, depth + 1, hash, key) {
                    children.remove(position);
                    *bitmap &= !bit;
                }
                if children.is_empty() {
                    return true;
                }
            }
            // A lone value child replaces the branch one level up.
            // Collision nodes are never lifted: they stay anchored at the
            // depth where the hash path runs out.
            let collapse = {
                let MapNode::Bitmap { children, .. } = node.as_ref() else {
                    unreachable!()
                };
                (children.len() == 1 && matches!(children[0].as_ref(), MapNode::Value { .. }))
                    .then(|| children[0].clone())
            };
            if let Some(child) = collapse {
                *node = child;
            }
            false
        }
        MapNode::HashArray { .. } => {
            let slot = hash_slot(hash, depth);
            let MapNode::HashArray { count, children } = ReferenceCounter::make_mut(node) else {
                unreachable!()
            };
            let Some(child) = &mut children[slot] else {
                unreachable!("Map::delete: key vanished between lookup and removal");
            };
            if remove_node(child, hasher, depth + 1, hash, key) {
                children[slot] = None;
                *count -= 1;
            }
            *count == 0
        }
        MapNode::Collision { .. } => {
            let MapNode::Collision { hash, entries } = ReferenceCounter::make_mut(node) else {
                unreachable!()
            };
            let Some(position) = entries.iter().position(|(k, _)| hasher.equal(k, key)) else {
                unreachable!("Map::delete: key vanished between lookup and removal");
            };
            entries.remove(position);
            if entries.len() == 1 {
                let Some((remaining_key, remaining_value)) = entries.pop() else {
                    unreachable!()
                };
                let remaining_hash = *hash;
                *node = ReferenceCounter::new(MapNode::Value {
                    hash: remaining_hash,
                    key: remaining_key,
                    value: remaining_value,
                });
            }
            false
        }
    }
}

// =============================================================================
// Map Definition
// =============================================================================

/// A persistent (immutable) unordered key/value mapping.
///
/// `Map` is an immutable data structure that uses structural sharing to
/// efficiently support functional programming patterns. The hashing and
/// equality strategy is a value parameter; [`SeededHasher`] is used unless
/// another [`Hasher`] is supplied through
/// [`with_hasher`](Map::with_hasher).
///
/// # Time Complexity
///
/// | Operation      | Complexity          |
/// |----------------|---------------------|
/// | `new`          | O(1)                |
/// | `get`          | O(log32 N) expected |
/// | `set`          | O(log32 N) expected |
/// | `delete`       | O(log32 N) expected |
/// | `len`          | O(1)                |
/// | `is_empty`     | O(1)                |
///
/// # Examples
///
/// ```rust
/// use permafrost::Map;
///
/// let map = Map::new().set(1, "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// ```
#[derive(Clone)]
pub struct Map<K, V, H = SeededHasher> {
    /// Root node of the trie (or the flat small-map vector).
    root: ReferenceCounter<MapNode<K, V>>,
    /// Number of entries.
    size: usize,
    /// Hashing and equality strategy for keys.
    hasher: H,
}

impl<K, V> Map<K, V> {
    /// Creates a new empty map using the default [`SeededHasher`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Map;
    ///
    /// let map: Map<String, i32> = Map::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(SeededHasher)
    }
}

impl<K, V, H> Map<K, V, H> {
    /// Creates a new empty map using the supplied hashing strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::{Map, SeededHasher};
    ///
    /// let map: Map<String, i32, _> = Map::with_hasher(SeededHasher);
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            root: ReferenceCounter::new(MapNode::empty_array()),
            size: 0,
            hasher,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns a cursor over the entries.
    ///
    /// Traversal is deterministic for this instance; the order itself is
    /// an implementation artifact, not a contract.
    #[must_use]
    pub fn iterator(&self) -> MapIterator<'_, K, V> {
        MapIterator::new(self.root.as_ref(), self.size)
    }

    /// Returns an iterator over key/value references.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Map;
    ///
    /// let map = Map::new().set("a", 1).set("b", 2);
    /// let mut total = 0;
    /// for (_, value) in map.iter() {
    ///     total += value;
    /// }
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> MapRefIterator<'_, K, V> {
        MapRefIterator {
            cursor: self.iterator(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// The hashing strategy carried by this map.
    pub(crate) fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Whether the map is still in the flat association-vector form.
    pub(crate) fn is_array_root(&self) -> bool {
        matches!(self.root.as_ref(), MapNode::Array { .. })
    }
}

impl<K, V, H> Map<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    /// Returns a reference to the value stored for `key`, if any.
    ///
    /// Absence is a normal result, not an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Map;
    ///
    /// let map = Map::new().set("hello", 42);
    /// assert_eq!(map.get(&"hello"), Some(&42));
    /// assert_eq!(map.get(&"world"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hasher.hash(key);
        let mut node = self.root.as_ref();
        let mut depth = 0_u32;
        loop {
            match node {
                MapNode::Array { entries } => {
                    return entries
                        .iter()
                        .find(|(k, _)| self.hasher.equal(k, key))
                        .map(|(_, v)| v);
                }
                MapNode::Value {
                    hash: entry_hash,
                    key: entry_key,
                    value,
                } => {
                    return (*entry_hash == hash && self.hasher.equal(entry_key, key))
                        .then_some(value);
                }
                MapNode::Bitmap { bitmap, children } => {
                    let bit = 1_u32 << hash_slot(hash, depth);
                    if bitmap & bit == 0 {
                        return None;
                    }
                    let position = (bitmap & (bit - 1)).count_ones() as usize;
                    node = children[position].as_ref();
                    depth += 1;
                }
                MapNode::HashArray { children, .. } => {
                    match children[hash_slot(hash, depth)].as_deref() {
                        Some(child) => {
                            node = child;
                            depth += 1;
                        }
                        None => return None,
                    }
                }
                MapNode::Collision {
                    hash: collision_hash,
                    entries,
                } => {
                    if *collision_hash != hash {
                        return None;
                    }
                    return entries
                        .iter()
                        .find(|(k, _)| self.hasher.equal(k, key))
                        .map(|(_, v)| v);
                }
            }
        }
    }

    /// Returns `true` if the map contains an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a new map with `(key, value)` stored, replacing any
    /// existing entry for an equal key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Map;
    ///
    /// let map = Map::new().set("key", 1);
    /// let updated = map.set("key", 2);
    ///
    /// assert_eq!(map.get(&"key"), Some(&1)); // Original unchanged
    /// assert_eq!(updated.get(&"key"), Some(&2));
    /// ```
    #[must_use]
    pub fn set(&self, key: K, value: V) -> Self {
        let mut other = self.clone();
        other.set_mut(key, value);
        other
    }

    /// Returns a new map without an entry for `key`.
    ///
    /// When the key is absent the result is the same instance: it shares
    /// the root with `self` and no node is copied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Map;
    ///
    /// let map = Map::new().set("a", 1).set("b", 2);
    /// let removed = map.delete(&"a");
    ///
    /// assert_eq!(map.len(), 2); // Original unchanged
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get(&"a"), None);
    /// ```
    #[must_use]
    pub fn delete(&self, key: &K) -> Self {
        let mut other = self.clone();
        other.delete_mut(key);
        other
    }

    /// In-place `set`: shared nodes along the path are cloned, uniquely
    /// owned ones are updated directly.
    pub(crate) fn set_mut(&mut self, key: K, value: V) {
        let hash = self.hasher.hash(&key);
        if insert_node(&mut self.root, &self.hasher, 0, hash, key, value) {
            self.size += 1;
        }
    }

    /// In-place `delete`. Returns `true` when an entry was removed.
    pub(crate) fn delete_mut(&mut self, key: &K) -> bool {
        if !self.contains_key(key) {
            return false;
        }
        let hash = self.hasher.hash(key);
        if remove_node(&mut self.root, &self.hasher, 0, hash, key) {
            self.root = ReferenceCounter::new(MapNode::empty_array());
        }
        self.size -= 1;
        true
    }

    /// Clones the flat association entries when the map is still
    /// array-backed.
    pub(crate) fn array_entries_cloned(&self) -> Vec<(K, V)> {
        match self.root.as_ref() {
            MapNode::Array { entries } => entries.to_vec(),
            _ => Vec::new(),
        }
    }

    /// Replaces the contents with a flat association vector. Callers must
    /// hand over at most [`MAX_ARRAY`] entries with pairwise unequal keys.
    pub(crate) fn install_array_root(&mut self, entries: Vec<(K, V)>) {
        debug_assert!(entries.len() <= MAX_ARRAY);
        self.size = entries.len();
        self.root = ReferenceCounter::new(MapNode::Array {
            entries: SmallVec::from_vec(entries),
        });
    }

    /// Root pointer identity, used to observe structural sharing.
    #[cfg(test)]
    pub(crate) fn shares_root_with(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.root, &other.root)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A forward cursor over the entries of a [`Map`].
///
/// Children are visited in ascending slot order and collision or
/// association entries in storage order, which makes traversal
/// deterministic for a given instance. The unordered map deliberately
/// offers no backward traversal or seeking: those would promote the
/// incidental order into an observable contract.
pub struct MapIterator<'a, K, V> {
    stack: SmallVec<[(&'a MapNode<K, V>, usize); 8]>,
    root: &'a MapNode<K, V>,
    total: usize,
    remaining: usize,
}

impl<'a, K, V> MapIterator<'a, K, V> {
    fn new(root: &'a MapNode<K, V>, total: usize) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            root,
            total,
            remaining: total,
        };
        iterator.first();
        iterator
    }

    /// Returns `true` if no entries remain.
    #[must_use]
    pub fn done(&self) -> bool {
        self.remaining == 0
    }

    /// Repositions the cursor at the first entry.
    pub fn first(&mut self) {
        self.stack.clear();
        self.stack.push((self.root, 0));
        self.remaining = self.total;
    }

    /// Returns the next entry and advances the cursor.
    pub fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let Some(&(node, position)) = self.stack.last() else {
                unreachable!("MapIterator: exhausted stack with entries remaining");
            };
            match node {
                MapNode::Array { entries } => {
                    if let Some((key, value)) = entries.get(position) {
                        self.advance(position);
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    self.stack.pop();
                }
                MapNode::Value { key, value, .. } => {
                    if position == 0 {
                        self.advance(position);
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    self.stack.pop();
                }
                MapNode::Bitmap { children, .. } => {
                    if let Some(child) = children.get(position) {
                        self.advance(position);
                        self.stack.push((child.as_ref(), 0));
                    } else {
                        self.stack.pop();
                    }
                }
                MapNode::HashArray { children, .. } => {
                    if let Some(offset) = children[position..].iter().position(Option::is_some) {
                        let slot = position + offset;
                        self.advance(slot);
                        let Some(child) = children[slot].as_deref() else {
                            unreachable!()
                        };
                        self.stack.push((child, 0));
                    } else {
                        self.stack.pop();
                    }
                }
                MapNode::Collision { entries, .. } => {
                    if let Some((key, value)) = entries.get(position) {
                        self.advance(position);
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    self.stack.pop();
                }
            }
        }
    }

    /// Moves the stack top past `position`.
    fn advance(&mut self, position: usize) {
        if let Some(top) = self.stack.last_mut() {
            top.1 = position + 1;
        }
    }
}

/// An iterator over key/value references of a [`Map`].
pub struct MapRefIterator<'a, K, V> {
    cursor: MapIterator<'a, K, V>,
}

impl<'a, K, V> Iterator for MapRefIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<K, V> ExactSizeIterator for MapRefIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, H: Default> Default for Map<K, V, H> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> FromIterator<(K, V)> for Map<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(H::default());
        for (key, value) in iter {
            map.set_mut(key, value);
        }
        map
    }
}

impl<K, V, H> PartialEq for Map<K, V, H>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, H> fmt::Debug for Map<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Builder Implementation
// =============================================================================

/// A mutable builder for constructing a [`Map`] efficiently.
///
/// The builder owns the only reference to its map, so every operation
/// updates the spine in place instead of copying path nodes.
/// [`publish`](MapBuilder::publish) consumes the builder and returns the
/// finished immutable map.
///
/// # Examples
///
/// ```rust
/// use permafrost::MapBuilder;
///
/// let mut builder = MapBuilder::new();
/// for value in 0..100 {
///     builder.set(value, value * 2);
/// }
/// let map = builder.publish();
/// assert_eq!(map.len(), 100);
/// assert_eq!(map.get(&21), Some(&42));
/// ```
#[derive(Clone, Debug)]
pub struct MapBuilder<K, V, H = SeededHasher> {
    map: Map<K, V, H>,
}

impl<K, V> MapBuilder<K, V> {
    /// Creates a builder over an empty map with the default hasher.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { map: Map::new() }
    }
}

impl<K, V, H> MapBuilder<K, V, H> {
    /// Creates a builder over an empty map with the supplied hasher.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            map: Map::with_hasher(hasher),
        }
    }

    /// Returns the number of entries in the underlying map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the underlying map is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns a cursor over the current entries.
    #[must_use]
    pub fn iterator(&self) -> MapIterator<'_, K, V> {
        self.map.iterator()
    }

    /// Hands over the finished map, consuming the builder.
    #[must_use]
    pub fn publish(self) -> Map<K, V, H> {
        self.map
    }
}

impl<K, V, H> MapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    /// Returns a reference to the value stored for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Stores `(key, value)`, replacing any existing entry.
    pub fn set(&mut self, key: K, value: V) {
        self.map.set_mut(key, value);
    }

    /// Removes the entry for `key`, if present.
    pub fn delete(&mut self, key: &K) {
        self.map.delete_mut(key);
    }
}

impl<K, V> Default for MapBuilder<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> Extend<(K, V)> for MapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Funnels every key into one 32-bit hash to force collision nodes.
    #[derive(Clone, Copy, Default)]
    struct CollidingHasher;

    impl Hasher<&'static str> for CollidingHasher {
        fn hash(&self, _key: &&'static str) -> u32 {
            0xDEAD_BEEF
        }

        fn equal(&self, a: &&'static str, b: &&'static str) -> bool {
            a == b
        }
    }

    /// Identity hash over small integers: adjacent keys land in adjacent
    /// slots, which makes node shapes predictable.
    #[derive(Clone, Copy, Default)]
    struct IdentityHasher;

    impl Hasher<u32> for IdentityHasher {
        fn hash(&self, key: &u32) -> u32 {
            *key
        }

        fn equal(&self, a: &u32, b: &u32) -> bool {
            a == b
        }
    }

    /// Two hash classes only: every same-parity key shares a full hash,
    /// which forces collision nodes as soon as the trie forms.
    #[derive(Clone, Copy, Default)]
    struct ParityHasher;

    impl Hasher<u32> for ParityHasher {
        fn hash(&self, key: &u32) -> u32 {
            key & 1
        }

        fn equal(&self, a: &u32, b: &u32) -> bool {
            a == b
        }
    }

    #[rstest]
    fn test_new_creates_empty_map() {
        let map: Map<String, i32> = Map::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(map.is_array_root());
    }

    #[rstest]
    fn test_set_and_get_round_trip() {
        let map = Map::new().set("one", 1).set("two", 2).set("three", 3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"one"), Some(&1));
        assert_eq!(map.get(&"two"), Some(&2));
        assert_eq!(map.get(&"three"), Some(&3));
        assert_eq!(map.get(&"four"), None);
    }

    #[rstest]
    fn test_set_replaces_existing_key_without_growth() {
        let mut map = Map::new();
        for _ in 0..10 {
            map = map.set("key", 1);
        }
        assert_eq!(map.len(), 1);
    }

    #[rstest]
    fn test_array_root_promotes_on_ninth_key() {
        let mut map: Map<u32, u32, IdentityHasher> = Map::with_hasher(IdentityHasher);
        for key in 1..=8 {
            map = map.set(key, key);
            assert!(map.is_array_root());
        }
        let promoted = map.set(9, 9);
        assert!(!promoted.is_array_root());
        assert_eq!(promoted.len(), 9);
        for key in 1..=9 {
            assert_eq!(promoted.get(&key), Some(&key));
        }
        // The predecessor keeps its flat form.
        assert!(map.is_array_root());
        assert_eq!(map.len(), 8);
    }

    #[rstest]
    fn test_bitmap_promotes_to_hash_array() {
        // Keys 0..32 at depth 0 each occupy a distinct slot; the
        // seventeenth child must switch the root to the dense form.
        let mut map: Map<u32, u32, IdentityHasher> = Map::with_hasher(IdentityHasher);
        for key in 0..32 {
            map = map.set(key, key);
        }
        assert_eq!(map.len(), 32);
        assert!(matches!(map.root.as_ref(), MapNode::HashArray { .. }));
        for key in 0..32 {
            assert_eq!(map.get(&key), Some(&key));
        }
    }

    #[rstest]
    fn test_hash_array_never_demotes() {
        let mut map: Map<u32, u32, IdentityHasher> = Map::with_hasher(IdentityHasher);
        for key in 0..32 {
            map = map.set(key, key);
        }
        for key in 0..30 {
            map = map.delete(&key);
        }
        assert_eq!(map.len(), 2);
        assert!(matches!(map.root.as_ref(), MapNode::HashArray { .. }));
        assert_eq!(map.get(&30), Some(&30));
        assert_eq!(map.get(&31), Some(&31));
    }

    #[rstest]
    fn test_collision_path() {
        let map: Map<&'static str, i32, CollidingHasher> = Map::with_hasher(CollidingHasher);
        let map = map.set("A", 1).set("B", 2).set("C", 3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"A"), Some(&1));
        assert_eq!(map.get(&"B"), Some(&2));
        assert_eq!(map.get(&"C"), Some(&3));

        let removed = map.delete(&"B");
        assert_eq!(removed.len(), 2);
        assert_eq!(removed.get(&"A"), Some(&1));
        assert_eq!(removed.get(&"B"), None);
        assert_eq!(removed.get(&"C"), Some(&3));
    }

    /// Records the depth of every collision node reachable under `node`.
    fn collision_depths<K, V>(node: &MapNode<K, V>, depth: u32, depths: &mut Vec<u32>) {
        match node {
            MapNode::Array { .. } | MapNode::Value { .. } => {}
            MapNode::Bitmap { children, .. } => {
                for child in children {
                    collision_depths(child.as_ref(), depth + 1, depths);
                }
            }
            MapNode::HashArray { children, .. } => {
                for child in children.iter().flatten() {
                    collision_depths(child.as_ref(), depth + 1, depths);
                }
            }
            MapNode::Collision { .. } => depths.push(depth),
        }
    }

    #[rstest]
    fn test_collision_nodes_form_only_at_max_depth() {
        // One shared hash: colliding keys must sink through one sparse
        // level per hash slice and meet in a single collision node at
        // the bottom of the trie.
        let mut map: Map<&'static str, i32, CollidingHasher> = Map::with_hasher(CollidingHasher);
        for (index, key) in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]
            .into_iter()
            .enumerate()
        {
            map = map.set(key, i32::try_from(index).unwrap());
        }
        assert!(!map.is_array_root());
        let mut depths = Vec::new();
        collision_depths(map.root.as_ref(), 0, &mut depths);
        assert_eq!(depths, vec![MAX_DEPTH]);
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&"J"), Some(&9));

        // Two hash classes: one collision bundle per class, both at the
        // exhausted depth.
        let mut parity: Map<u32, u32, ParityHasher> = Map::with_hasher(ParityHasher);
        for key in 0..12 {
            parity = parity.set(key, key);
        }
        let mut depths = Vec::new();
        collision_depths(parity.root.as_ref(), 0, &mut depths);
        assert_eq!(depths, vec![MAX_DEPTH, MAX_DEPTH]);
    }

    #[rstest]
    fn test_delete_keeps_collisions_at_max_depth() {
        let mut map: Map<u32, u32, ParityHasher> = Map::with_hasher(ParityHasher);
        for key in 0..12 {
            map = map.set(key, key);
        }
        // Thin one hash class down to two entries: its bundle shrinks in
        // place instead of migrating upward.
        for key in [0, 2, 4, 6] {
            map = map.delete(&key);
        }
        let mut depths = Vec::new();
        collision_depths(map.root.as_ref(), 0, &mut depths);
        assert_eq!(depths, vec![MAX_DEPTH, MAX_DEPTH]);
        assert_eq!(map.get(&8), Some(&8));
        assert_eq!(map.get(&10), Some(&10));
    }

    #[rstest]
    fn test_collision_nodes_survive_promotion() {
        let mut map: Map<u32, u32, ParityHasher> = Map::with_hasher(ParityHasher);
        for key in 0..12 {
            map = map.set(key, key * 10);
        }
        assert!(!map.is_array_root());
        assert_eq!(map.len(), 12);
        for key in 0..12 {
            assert_eq!(map.get(&key), Some(&(key * 10)));
        }
        let removed = map.delete(&4);
        assert_eq!(removed.len(), 11);
        assert_eq!(removed.get(&4), None);
        assert_eq!(removed.get(&6), Some(&60));
    }

    #[rstest]
    fn test_collision_folds_back_to_value_node() {
        let mut map: Map<u32, u32, ParityHasher> = Map::with_hasher(ParityHasher);
        for key in 0..10 {
            map = map.set(key, key);
        }
        // Remove all odd keys but one; the shared-hash bundle folds back
        // to a single leaf.
        for key in [1, 3, 5, 7] {
            map = map.delete(&key);
        }
        assert_eq!(map.len(), 6);
        assert_eq!(map.get(&9), Some(&9));
        for key in [0, 2, 4, 6, 8] {
            assert_eq!(map.get(&key), Some(&key));
        }
    }

    #[rstest]
    fn test_delete_absent_returns_same_instance() {
        let map = Map::new().set(1, "one").set(2, "two");
        let same = map.delete(&3);
        assert!(map.shares_root_with(&same));
        assert_eq!(same.len(), 2);
    }

    #[rstest]
    fn test_delete_preserves_original() {
        let map: Map<i32, i32> = (0..100).map(|k| (k, k)).collect();
        let removed = map.delete(&50);
        assert_eq!(map.len(), 100);
        assert_eq!(map.get(&50), Some(&50));
        assert_eq!(removed.len(), 99);
        assert_eq!(removed.get(&50), None);
    }

    #[rstest]
    fn test_delete_down_to_empty_and_refill() {
        let mut map: Map<i32, i32> = (0..40).map(|k| (k, k)).collect();
        for key in 0..40 {
            map = map.delete(&key);
        }
        assert!(map.is_empty());
        let refilled = map.set(7, 7);
        assert_eq!(refilled.get(&7), Some(&7));
    }

    #[rstest]
    fn test_iteration_visits_every_entry_once() {
        let map: Map<i32, i32> = (0..500).map(|k| (k, k * 2)).collect();
        let mut seen = std::collections::HashSet::new();
        for (key, value) in map.iter() {
            assert_eq!(*value, key * 2);
            assert!(seen.insert(*key));
        }
        assert_eq!(seen.len(), 500);
    }

    #[rstest]
    fn test_iteration_is_deterministic_for_an_instance() {
        let map: Map<i32, i32> = (0..100).map(|k| (k, k)).collect();
        let first_pass: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
        let second_pass: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(first_pass, second_pass);
    }

    #[rstest]
    fn test_structural_sharing_on_set() {
        let map: Map<u32, u32, IdentityHasher> = (0..1000).map(|k| (k, k)).collect();
        let updated = map.set(0, 9999);
        assert_eq!(map.get(&0), Some(&0));
        assert_eq!(updated.get(&0), Some(&9999));
        // Untouched subtrees are the same nodes in both versions.
        let (MapNode::HashArray { children: a, .. }, MapNode::HashArray { children: b, .. }) =
            (map.root.as_ref(), updated.root.as_ref())
        else {
            panic!("expected dense roots");
        };
        let shared = a
            .iter()
            .zip(b.iter())
            .filter(|(x, y)| match (x, y) {
                (Some(x), Some(y)) => ReferenceCounter::ptr_eq(x, y),
                _ => false,
            })
            .count();
        assert!(shared > 0);
    }

    #[rstest]
    fn test_builder_round_trip() {
        let mut builder = MapBuilder::new();
        for key in 0..1000 {
            builder.set(key, key * 3);
        }
        builder.delete(&999);
        let map = builder.publish();
        assert_eq!(map.len(), 999);
        assert_eq!(map.get(&500), Some(&1500));
        assert_eq!(map.get(&999), None);
    }

    #[rstest]
    fn test_equality_ignores_iteration_order() {
        let forward: Map<i32, i32> = (0..50).map(|k| (k, k)).collect();
        let backward: Map<i32, i32> = (0..50).rev().map(|k| (k, k)).collect();
        assert_eq!(forward, backward);
        assert_ne!(forward, backward.set(0, 1));
    }
}
