//! Persistent (immutable) unordered set.
//!
//! This module provides [`Set`], a thin key-only façade over
//! [`Map`](crate::Map) with `()` as the value type. It introduces no
//! invariants of its own: `add` stores the unit value, `has` looks the
//! key up, `delete` passes through.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::Set;
//!
//! let set = Set::new().add(1).add(2).add(3);
//!
//! assert!(set.has(&1));
//! assert!(!set.has(&4));
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.add(4);
//! assert_eq!(set.len(), 3);     // Original unchanged
//! assert_eq!(updated.len(), 4); // New version
//! ```

use std::fmt;
use std::iter::FromIterator;

use crate::map::{Map, MapBuilder, MapIterator};
use crate::strategy::{Hasher, SeededHasher};

// =============================================================================
// Set Definition
// =============================================================================

/// A persistent (immutable) unordered set.
///
/// Backed by a [`Map`] whose values are the zero-sized unit, so every
/// complexity bound and sharing property of the map carries over
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use permafrost::Set;
///
/// let set = Set::new().add("item");
/// assert!(set.has(&"item"));
/// ```
#[derive(Clone)]
pub struct Set<T, H = SeededHasher> {
    /// Internal map with `()` as the value type.
    inner: Map<T, (), H>,
}

impl<T> Set<T> {
    /// Creates a new empty set using the default [`SeededHasher`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Set;
    ///
    /// let set: Set<i32> = Set::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Map::new() }
    }
}

impl<T, H> Set<T, H> {
    /// Creates a new empty set using the supplied hashing strategy.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            inner: Map::with_hasher(hasher),
        }
    }

    /// Returns the number of values in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the values.
    ///
    /// Traversal is deterministic for this instance; the order itself is
    /// an implementation artifact, not a contract.
    #[must_use]
    pub fn iter(&self) -> SetIterator<'_, T> {
        SetIterator {
            cursor: self.inner.iterator(),
        }
    }

    /// Wraps an already built map.
    pub(crate) fn from_map(inner: Map<T, (), H>) -> Self {
        Self { inner }
    }
}

impl<T, H> Set<T, H>
where
    T: Clone,
    H: Hasher<T>,
{
    /// Returns `true` if the set contains `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::Set;
    ///
    /// let set = Set::new().add(7);
    /// assert!(set.has(&7));
    /// assert!(!set.has(&8));
    /// ```
    #[must_use]
    pub fn has(&self, value: &T) -> bool {
        self.inner.contains_key(value)
    }

    /// Returns a new set that contains `value`.
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        Self {
            inner: self.inner.set(value, ()),
        }
    }

    /// Returns a new set without `value`.
    ///
    /// When the value is absent the result shares the root with `self`.
    #[must_use]
    pub fn delete(&self, value: &T) -> Self {
        Self {
            inner: self.inner.delete(value),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the values of a [`Set`].
pub struct SetIterator<'a, T> {
    cursor: MapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for SetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next().map(|(value, _)| value)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, H: Default> Default for Set<T, H> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<T, H> FromIterator<T> for Set<T, H>
where
    T: Clone,
    H: Hasher<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|value| (value, ())).collect(),
        }
    }
}

impl<T, H> PartialEq for Set<T, H>
where
    T: Clone,
    H: Hasher<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: fmt::Debug, H> fmt::Debug for Set<T, H> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Builder Implementation
// =============================================================================

/// A mutable builder for constructing a [`Set`] efficiently.
///
/// Delegates to [`MapBuilder`] with the unit value type;
/// [`publish`](SetBuilder::publish) consumes the builder and returns the
/// finished immutable set.
///
/// # Examples
///
/// ```rust
/// use permafrost::SetBuilder;
///
/// let mut builder = SetBuilder::new();
/// for value in 0..100 {
///     builder.add(value);
/// }
/// let set = builder.publish();
/// assert_eq!(set.len(), 100);
/// assert!(set.has(&42));
/// ```
#[derive(Clone)]
pub struct SetBuilder<T, H = SeededHasher> {
    inner: MapBuilder<T, (), H>,
}

impl<T> SetBuilder<T> {
    /// Creates a builder over an empty set with the default hasher.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MapBuilder::new(),
        }
    }
}

impl<T, H> SetBuilder<T, H> {
    /// Creates a builder over an empty set with the supplied hasher.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            inner: MapBuilder::with_hasher(hasher),
        }
    }

    /// Returns the number of values in the underlying set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the underlying set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Hands over the finished set, consuming the builder.
    #[must_use]
    pub fn publish(self) -> Set<T, H> {
        Set {
            inner: self.inner.publish(),
        }
    }
}

impl<T, H> SetBuilder<T, H>
where
    T: Clone,
    H: Hasher<T>,
{
    /// Returns `true` if the current contents contain `value`.
    #[must_use]
    pub fn has(&self, value: &T) -> bool {
        self.inner.get(value).is_some()
    }

    /// Adds `value` to the set.
    pub fn add(&mut self, value: T) {
        self.inner.set(value, ());
    }

    /// Removes `value` from the set, if present.
    pub fn delete(&mut self, value: &T) {
        self.inner.delete(value);
    }
}

impl<T> Default for SetBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> Extend<T> for SetBuilder<T, H>
where
    T: Clone,
    H: Hasher<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
