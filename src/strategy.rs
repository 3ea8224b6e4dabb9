//! Hashing and ordering strategies for keyed collections.
//!
//! [`Map`](crate::Map) and [`Set`](crate::Set) consult a [`Hasher`] for key
//! hashing and equality; [`SortedMap`](crate::SortedMap) and
//! [`SortedSet`](crate::SortedSet) consult a [`Comparer`] for total
//! ordering. Strategies are plain values carried by the collection, never
//! global tables, so two maps over the same key type may hash or order
//! their keys differently.
//!
//! The built-in [`SeededHasher`] covers every key type implementing
//! [`Hash`](std::hash::Hash) and [`Eq`], in particular signed and
//! unsigned integers, strings and byte sequences. It mixes a process-wide
//! random seed into every digest so that hash values cannot be predicted
//! across processes, which blunts adversarially chosen keys.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::{Hasher, SeededHasher};
//!
//! let hasher = SeededHasher::default();
//! let hash = hasher.hash(&"key");
//! assert_eq!(hash, hasher.hash(&"key")); // stable within the process
//! assert!(hasher.equal(&"key", &"key"));
//! ```

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher as _};
use std::sync::OnceLock;

// =============================================================================
// Process-Wide Hash Seed
// =============================================================================

/// Seed mixed into every built-in hash digest.
///
/// Chosen once per process on first use and constant afterwards. Never
/// exposed outside the crate.
static PROCESS_SEED: OnceLock<u32> = OnceLock::new();

pub(crate) fn process_seed() -> u32 {
    *PROCESS_SEED.get_or_init(rand::random)
}

// =============================================================================
// Strategy Traits
// =============================================================================

/// Hashing strategy for the keys of a [`Map`](crate::Map) or
/// [`Set`](crate::Set).
///
/// Implementations must be coherent: `equal(a, b)` implies
/// `hash(a) == hash(b)`. A poorly distributed `hash` never affects
/// correctness but degrades map operations toward O(n), because equal
/// hashes funnel unequal keys into shared collision nodes that are
/// scanned linearly.
pub trait Hasher<K>: Clone {
    /// Computes a 32-bit hash for the key.
    fn hash(&self, key: &K) -> u32;

    /// Returns `true` if the two keys are equal.
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// Ordering strategy for the keys of a [`SortedMap`](crate::SortedMap) or
/// [`SortedSet`](crate::SortedSet).
///
/// The ordering must be total: antisymmetric, transitive, and reflexive
/// on equality. Two keys are treated as the same entry if and only if
/// `compare` returns [`Ordering::Equal`].
pub trait Comparer<K>: Clone {
    /// Compares two keys, returning their relative order.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

// =============================================================================
// Built-In Strategies
// =============================================================================

/// The default [`Hasher`], available for every `K: Hash + Eq`.
///
/// Digests keys through the standard `Hash` machinery seeded with a
/// process-wide random value, then folds the 64-bit digest to 32 bits.
///
/// # Examples
///
/// ```rust
/// use permafrost::Map;
///
/// // `Map::new` uses `SeededHasher` implicitly.
/// let map = Map::new().set(1_u64, "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeededHasher;

impl<K: Hash + Eq> Hasher<K> for SeededHasher {
    fn hash(&self, key: &K) -> u32 {
        let mut state = DefaultHasher::new();
        state.write_u32(process_seed());
        key.hash(&mut state);
        let digest = state.finish();
        #[allow(clippy::cast_possible_truncation)]
        let folded = (digest >> 32) as u32 ^ digest as u32;
        folded
    }

    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// The default [`Comparer`], available for every `K: Ord`.
///
/// Delegates to the key type's own total order.
///
/// # Examples
///
/// ```rust
/// use permafrost::SortedMap;
///
/// // `SortedMap::new` uses `NaturalComparer` implicitly.
/// let map = SortedMap::new().set(2, "two").set(1, "one");
/// let keys: Vec<&i32> = map.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, vec![&1, &2]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalComparer;

impl<K: Ord> Comparer<K> for NaturalComparer {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

// =============================================================================
// Tests
// =============================================================================
