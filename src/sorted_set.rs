//! Persistent (immutable) ordered set.
//!
//! This module provides [`SortedSet`], a thin key-only façade over
//! [`SortedMap`](crate::SortedMap) with `()` as the value type. It
//! introduces no invariants of its own.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::SortedSet;
//!
//! let set = SortedSet::new().add(3).add(1).add(2);
//!
//! // Values are always in sorted order
//! let values: Vec<&i32> = set.iter().collect();
//! assert_eq!(values, vec![&1, &2, &3]);
//! ```

use std::fmt;
use std::iter::FromIterator;

use crate::sorted_map::{SortedMap, SortedMapBuilder, SortedMapIterator};
use crate::strategy::{Comparer, NaturalComparer};

// =============================================================================
// SortedSet Definition
// =============================================================================

/// A persistent (immutable) ordered set.
///
/// Backed by a [`SortedMap`] whose values are the zero-sized unit, so
/// every complexity bound and sharing property of the map carries over
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use permafrost::SortedSet;
///
/// let set = SortedSet::new().add("b").add("a");
/// assert!(set.has(&"a"));
/// let values: Vec<&&str> = set.iter().collect();
/// assert_eq!(values, vec![&"a", &"b"]);
/// ```
#[derive(Clone)]
pub struct SortedSet<T, C = NaturalComparer> {
    /// Internal ordered map with `()` as the value type.
    inner: SortedMap<T, (), C>,
}

impl<T> SortedSet<T> {
    /// Creates a new empty set using the default [`NaturalComparer`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SortedMap::new(),
        }
    }
}

impl<T, C> SortedSet<T, C> {
    /// Creates a new empty set using the supplied ordering strategy.
    #[inline]
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            inner: SortedMap::with_comparer(comparer),
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

    /// Wraps an already built map.
    pub(crate) fn from_map(inner: SortedMap<T, (), C>) -> Self {
        Self { inner }
    }
}

impl<T, C> SortedSet<T, C>
where
    T: Clone,
    C: Comparer<T>,
{
    /// Returns `true` if the set contains `value`.
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

    /// Returns a cursor positioned at the smallest value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::SortedSet;
    ///
    /// let set: SortedSet<i32> = (0..10).collect();
    /// let mut cursor = set.iterator();
    /// cursor.seek(&7);
    /// assert_eq!(cursor.next(), Some(&7));
    /// ```
    #[must_use]
    pub fn iterator(&self) -> SortedSetIterator<'_, T, C> {
        SortedSetIterator {
            cursor: self.inner.iterator(),
        }
    }

    /// Returns an iterator over the values in ascending order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter().map(|(value, _)| value)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A positional cursor over a [`SortedSet`], in ascending value order.
pub struct SortedSetIterator<'a, T, C> {
    cursor: SortedMapIterator<'a, T, (), C>,
}

impl<'a, T, C> SortedSetIterator<'a, T, C>
where
    T: Clone,
    C: Comparer<T>,
{
    /// Returns `true` if no value remains in the traversal direction.
    #[must_use]
    pub fn done(&self) -> bool {
        self.cursor.done()
    }

    /// Positions the cursor on the smallest value.
    pub fn first(&mut self) {
        self.cursor.first();
    }

    /// Positions the cursor on the largest value.
    pub fn last(&mut self) {
        self.cursor.last();
    }

    /// Positions the cursor on the first value not less than `value`.
    pub fn seek(&mut self, value: &T) {
        self.cursor.seek(value);
    }

    /// Returns the current value, then moves forward.
    pub fn next(&mut self) -> Option<&'a T> {
        self.cursor.next().map(|(value, _)| value)
    }

    /// Returns the current value, then moves backward.
    pub fn prev(&mut self) -> Option<&'a T> {
        self.cursor.prev().map(|(value, _)| value)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Default> Default for SortedSet<T, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

impl<T, C> FromIterator<T> for SortedSet<T, C>
where
    T: Clone,
    C: Comparer<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|value| (value, ())).collect(),
        }
    }
}

impl<T, C> PartialEq for SortedSet<T, C>
where
    T: Clone,
    C: Comparer<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T, C> fmt::Debug for SortedSet<T, C>
where
    T: Clone + fmt::Debug,
    C: Comparer<T>,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Builder Implementation
// =============================================================================

/// A mutable builder for constructing a [`SortedSet`] efficiently.
///
/// Delegates to [`SortedMapBuilder`] with the unit value type;
/// [`publish`](SortedSetBuilder::publish) consumes the builder and
/// returns the finished immutable set.
///
/// # Examples
///
/// ```rust
/// use permafrost::SortedSetBuilder;
///
/// let mut builder = SortedSetBuilder::new();
/// for value in [3, 1, 2] {
///     builder.add(value);
/// }
/// let set = builder.publish();
/// let values: Vec<&i32> = set.iter().collect();
/// assert_eq!(values, vec![&1, &2, &3]);
/// ```
#[derive(Clone)]
pub struct SortedSetBuilder<T, C = NaturalComparer> {
    inner: SortedMapBuilder<T, (), C>,
}

impl<T> SortedSetBuilder<T> {
    /// Creates a builder over an empty set with the default comparer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SortedMapBuilder::new(),
        }
    }
}

impl<T, C> SortedSetBuilder<T, C> {
    /// Creates a builder over an empty set with the supplied comparer.
    #[inline]
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            inner: SortedMapBuilder::with_comparer(comparer),
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
    pub fn publish(self) -> SortedSet<T, C> {
        SortedSet {
            inner: self.inner.publish(),
        }
    }
}

impl<T, C> SortedSetBuilder<T, C>
where
    T: Clone,
    C: Comparer<T>,
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

impl<T> Default for SortedSetBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Extend<T> for SortedSetBuilder<T, C>
where
    T: Clone,
    C: Comparer<T>,
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
