//! # permafrost
//!
//! Persistent (immutable) collections with structural sharing.
//!
//! Every modifying operation returns a new collection that shares all
//! untouched subtrees with its predecessor. Published collections are
//! frozen: any number of readers may use the same value concurrently
//! without synchronization, and no operation ever mutates state reachable
//! from an already published collection.
//!
//! ## Collections
//!
//! - [`List`]: indexed sequence backed by a 32-way radix trie with a
//!   movable origin (efficient prepend) and a contiguous small-list
//!   representation below 32 elements
//! - [`Map`]: unordered key/value mapping backed by a Hash Array Mapped
//!   Trie (HAMT) with a tiny association-vector form for small maps
//! - [`SortedMap`]: ordered key/value mapping backed by a persistent
//!   B+tree
//! - [`Set`] / [`SortedSet`]: key-only façades over the two maps
//! - [`Queue`]: FIFO queue built from two lists
//!
//! ## Builders
//!
//! Each collection has a builder that mutates its spine in place while the
//! builder holds the only reference, then publishes an immutable snapshot.
//! [`batch`] adds buffered batch and streaming builders on top.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::List;
//!
//! let list: List<i32> = (0..100).collect();
//! let updated = list.set(50, 999);
//!
//! assert_eq!(list.get(50), &50);     // Original unchanged
//! assert_eq!(updated.get(50), &999); // New version
//! ```
//!
//! ```rust
//! use permafrost::Map;
//!
//! let map = Map::new().set("one", 1).set("two", 2);
//! let updated = map.set("one", 100);
//!
//! assert_eq!(map.get(&"one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get(&"one"), Some(&100)); // New version
//! ```
//!
//! ## Sharing across threads
//!
//! With the `arc` feature enabled, structural sharing uses `Arc` and every
//! published collection is `Send + Sync` when its element types are.
//! Builders are single-owner regardless of the feature: Rust's ownership
//! rules confine them to one place at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted pointer used for all internal tree nodes.
///
/// `std::rc::Rc` by default; the `arc` feature swaps in `std::sync::Arc`
/// so published collections can cross thread boundaries, at the cost of
/// atomic reference counting.
///
/// Copy-on-write hangs off this type: mutation paths go through
/// `make_mut`, which copies a node only while someone else still holds
/// it. A builder's uniquely-owned spine therefore mutates in place, and
/// anything reachable from a published collection is copied before the
/// first write.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

pub mod batch;
mod list;
mod map;
mod queue;
mod set;
mod sorted_map;
mod sorted_set;
mod strategy;

pub use list::List;
pub use list::ListBuilder;
pub use list::ListIntoIterator;
pub use list::ListIterator;
pub use list::ListRefIterator;
pub use map::Map;
pub use map::MapBuilder;
pub use map::MapIterator;
pub use map::MapRefIterator;
pub use queue::Queue;
pub use queue::QueueBuilder;
pub use queue::QueueIterator;
pub use set::Set;
pub use set::SetBuilder;
pub use set::SetIterator;
pub use sorted_map::SortedMap;
pub use sorted_map::SortedMapBuilder;
pub use sorted_map::SortedMapIterator;
pub use sorted_map::SortedMapRefIterator;
pub use sorted_set::SortedSet;
pub use sorted_set::SortedSetBuilder;
pub use sorted_set::SortedSetIterator;
pub use strategy::Comparer;
pub use strategy::Hasher;
pub use strategy::NaturalComparer;
pub use strategy::SeededHasher;

// =============================================================================
// Tests
// =============================================================================
