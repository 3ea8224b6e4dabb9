//! Batch and streaming builders.
//!
//! The simple builders ([`ListBuilder`](crate::ListBuilder),
//! [`MapBuilder`](crate::MapBuilder), ...) apply every operation to the
//! underlying collection immediately. The builders in this module add a
//! bounded buffer in front of that path: operations append to the buffer,
//! a full buffer triggers a flush, and flushing can take bulk shortcuts
//! that the one-at-a-time path cannot take: a small list plus its buffer is
//! rebuilt as one contiguous copy, and a buffer flushed into a small map
//! collapses duplicate keys last-write-wins before anything touches the
//! trie.
//!
//! The streaming builders wrap a batch builder with a secondary
//! auto-flush threshold and adapters for channels, filtering, and
//! transformation.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::batch::BatchListBuilder;
//!
//! let mut builder = BatchListBuilder::new(64);
//! for value in 0..1000 {
//!     builder.append(value);
//! }
//! let list = builder.publish();
//! assert_eq!(list.len(), 1000);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::mpsc;

use crate::list::List;
use crate::map::{MAX_ARRAY, Map};
use crate::set::Set;
use crate::sorted_map::SortedMap;
use crate::sorted_set::SortedSet;
use crate::strategy::{Comparer, Hasher, NaturalComparer, SeededHasher};

/// Buffer capacity used when a builder is created with size zero.
const DEFAULT_BATCH_SIZE: usize = 32;

fn normalize_batch_size(batch_size: usize) -> usize {
    if batch_size == 0 {
        DEFAULT_BATCH_SIZE
    } else {
        batch_size
    }
}

// =============================================================================
// Batch List Builder
// =============================================================================

/// A buffered builder for [`List`], optimized for bulk appends.
///
/// Values accumulate in a bounded buffer and are committed when the
/// buffer fills, on [`flush`](BatchListBuilder::flush), or on
/// [`publish`](BatchListBuilder::publish). While the underlying list is
/// still small and contiguous, a flush rebuilds it as a single copy of
/// `committed + buffered` instead of appending element by element.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::BatchListBuilder;
///
/// let mut builder = BatchListBuilder::new(8);
/// builder.append_all(0..20);
/// let list = builder.publish();
/// assert_eq!(list.len(), 20);
/// assert_eq!(list.get(19), &19);
/// ```
#[derive(Clone, Debug)]
pub struct BatchListBuilder<T> {
    list: List<T>,
    batch_size: usize,
    buffer: Vec<T>,
}

impl<T> BatchListBuilder<T> {
    /// Creates a batch builder with the given buffer capacity; zero falls
    /// back to the default of 32.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        let batch_size = normalize_batch_size(batch_size);
        Self {
            list: List::new(),
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    /// Returns the total number of elements, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len() + self.buffer.len()
    }

    /// Returns `true` if no element has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> BatchListBuilder<T> {
    /// Adds a value to the buffer, flushing when the buffer reaches
    /// capacity.
    pub fn append(&mut self, value: T) {
        self.buffer.push(value);
        if self.buffer.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Adds every value in order.
    pub fn append_all<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.append(value);
        }
    }

    /// Commits all buffered values to the underlying list.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        // While the list is still one contiguous buffer, rebuild it in a
        // single copy; the constructor picks the representation by size.
        let contiguous: Option<Vec<T>> = self.list.slice_values().map(<[T]>::to_vec);
        if let Some(mut combined) = contiguous {
            combined.reserve(self.buffer.len());
            combined.append(&mut self.buffer);
            self.list.install_from_vec(combined);
            return;
        }
        for value in self.buffer.drain(..) {
            self.list.append_mut(value);
        }
    }

    /// Flushes and hands over the finished list, consuming the builder.
    #[must_use]
    pub fn publish(mut self) -> List<T> {
        self.flush();
        self.list
    }
}

impl<T> Default for BatchListBuilder<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl<T: Clone> Extend<T> for BatchListBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_all(iter);
    }
}

// =============================================================================
// Batch Map Builder
// =============================================================================

/// A buffered builder for [`Map`], optimized for bulk insertion.
///
/// Entries accumulate in a bounded buffer. A flush into a map that is
/// still in its flat small-map form first collapses the buffer with
/// last-write-wins semantics (keeping the first-seen position of each
/// retained key) and, when the merged result still fits the flat form,
/// installs it wholesale; otherwise entries take the one-at-a-time
/// mutable path. Key equality is decided by the map's [`Hasher`] alone.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::BatchMapBuilder;
///
/// let mut builder = BatchMapBuilder::new(16);
/// builder.set(1, "a");
/// builder.set(2, "b");
/// builder.set(1, "c"); // overrides the first entry
/// let map = builder.publish();
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&1), Some(&"c"));
/// ```
#[derive(Clone, Debug)]
pub struct BatchMapBuilder<K, V, H = SeededHasher> {
    map: Map<K, V, H>,
    batch_size: usize,
    buffer: Vec<(K, V)>,
}

impl<K, V> BatchMapBuilder<K, V> {
    /// Creates a batch builder with the default hasher and the given
    /// buffer capacity; zero falls back to the default of 32.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self::with_hasher(SeededHasher, batch_size)
    }
}

impl<K, V, H> BatchMapBuilder<K, V, H> {
    /// Creates a batch builder with the supplied hasher.
    #[must_use]
    pub fn with_hasher(hasher: H, batch_size: usize) -> Self {
        let batch_size = normalize_batch_size(batch_size);
        Self {
            map: Map::with_hasher(hasher),
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    /// Returns the total number of entries, committed plus buffered.
    /// Buffered overrides of committed keys count twice until the next
    /// flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len() + self.buffer.len()
    }

    /// Returns `true` if no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, H> BatchMapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    /// Adds an entry to the buffer, flushing when the buffer reaches
    /// capacity.
    pub fn set(&mut self, key: K, value: V) {
        self.buffer.push((key, value));
        if self.buffer.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Adds every entry in order.
    pub fn set_all<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Commits all buffered entries to the underlying map.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if self.map.is_array_root() {
            let existing = self.map.array_entries_cloned();
            // Collapse the buffer last-write-wins, keeping the first-seen
            // position of each retained key.
            let mut retained: Vec<(K, V)> = Vec::with_capacity(self.buffer.len());
            for (key, value) in self.buffer.drain(..) {
                if let Some(slot) = retained
                    .iter_mut()
                    .find(|(k, _)| self.map.hasher().equal(k, &key))
                {
                    slot.1 = value;
                } else {
                    retained.push((key, value));
                }
            }
            let fresh_keys = retained
                .iter()
                .filter(|(key, _)| {
                    !existing.iter().any(|(k, _)| self.map.hasher().equal(k, key))
                })
                .count();
            if existing.len() + fresh_keys <= MAX_ARRAY {
                // Overrides land on the existing entries, genuinely new
                // keys append in first-seen order.
                let mut merged = existing;
                for (key, value) in retained {
                    if let Some(slot) = merged
                        .iter_mut()
                        .find(|(k, _)| self.map.hasher().equal(k, &key))
                    {
                        slot.1 = value;
                    } else {
                        merged.push((key, value));
                    }
                }
                self.map.install_array_root(merged);
                return;
            }
            for (key, value) in retained {
                self.map.set_mut(key, value);
            }
            return;
        }
        for (key, value) in self.buffer.drain(..) {
            self.map.set_mut(key, value);
        }
    }

    /// Flushes and hands over the finished map, consuming the builder.
    #[must_use]
    pub fn publish(mut self) -> Map<K, V, H> {
        self.flush();
        self.map
    }
}

impl<K, V, H> BatchMapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K> + Clone,
{
    /// Clears the buffer and the committed entries, keeping the buffer's
    /// capacity and the original hasher.
    pub fn reset(&mut self) {
        self.buffer.clear();
        let hasher = self.map.hasher().clone();
        self.map = Map::with_hasher(hasher);
    }
}

impl<K, V> Default for BatchMapBuilder<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl<K, V, H> Extend<(K, V)> for BatchMapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.set_all(iter);
    }
}

// =============================================================================
// Streaming List Builder
// =============================================================================

/// A [`BatchListBuilder`] with a secondary auto-flush threshold and
/// streaming adapters.
///
/// The threshold is clamped to at least the batch size; passing zero
/// disables the extra trigger (the batch-size flush still applies).
///
/// # Examples
///
/// ```rust
/// use std::sync::mpsc;
/// use permafrost::batch::StreamingListBuilder;
///
/// let (sender, receiver) = mpsc::channel();
/// for value in 0..10 {
///     sender.send(value).unwrap();
/// }
/// drop(sender);
///
/// let mut builder = StreamingListBuilder::new(4, 8);
/// builder.stream(receiver);
/// let list = builder.publish();
/// assert_eq!(list.len(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct StreamingListBuilder<T> {
    inner: BatchListBuilder<T>,
    auto_flush_size: usize,
    auto_flush_enabled: bool,
}

impl<T> StreamingListBuilder<T> {
    /// Creates a streaming builder; `auto_flush_size` of zero disables
    /// the secondary trigger.
    #[must_use]
    pub fn new(batch_size: usize, auto_flush_size: usize) -> Self {
        let inner = BatchListBuilder::new(batch_size);
        Self {
            auto_flush_size: auto_flush_size.max(inner.batch_size),
            auto_flush_enabled: auto_flush_size > 0,
            inner,
        }
    }

    /// Returns the total number of elements, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no element has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone> StreamingListBuilder<T> {
    /// Adds a value, honoring both flush triggers.
    pub fn append(&mut self, value: T) {
        self.inner.append(value);
        if self.auto_flush_enabled && self.inner.len() >= self.auto_flush_size {
            self.inner.flush();
        }
    }

    /// Drains a channel into the list until the sending side disconnects.
    pub fn stream(&mut self, values: mpsc::Receiver<T>) {
        for value in values {
            self.append(value);
        }
    }

    /// Adds the values that satisfy `predicate`.
    pub fn filter<I, P>(&mut self, values: I, predicate: P)
    where
        I: IntoIterator<Item = T>,
        P: Fn(&T) -> bool,
    {
        for value in values {
            if predicate(&value) {
                self.append(value);
            }
        }
    }

    /// Adds every value after applying `mapper`.
    pub fn transform<I, F>(&mut self, values: I, mapper: F)
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> T,
    {
        for value in values {
            self.append(mapper(value));
        }
    }

    /// Commits all buffered values to the underlying list.
    pub fn flush(&mut self) {
        self.inner.flush();
    }

    /// Flushes and hands over the finished list, consuming the builder.
    #[must_use]
    pub fn publish(self) -> List<T> {
        self.inner.publish()
    }
}

// =============================================================================
// Streaming Map Builder
// =============================================================================

/// A [`BatchMapBuilder`] with a secondary auto-flush threshold and
/// streaming adapters.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::StreamingMapBuilder;
///
/// let mut builder = StreamingMapBuilder::new(8, 16);
/// builder.filter((0..20).map(|k| (k, k)), |key, _| key % 2 == 0);
/// let map = builder.publish();
/// assert_eq!(map.len(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct StreamingMapBuilder<K, V, H = SeededHasher> {
    inner: BatchMapBuilder<K, V, H>,
    auto_flush_size: usize,
    auto_flush_enabled: bool,
}

impl<K, V> StreamingMapBuilder<K, V> {
    /// Creates a streaming builder with the default hasher;
    /// `auto_flush_size` of zero disables the secondary trigger.
    #[must_use]
    pub fn new(batch_size: usize, auto_flush_size: usize) -> Self {
        Self::with_hasher(SeededHasher, batch_size, auto_flush_size)
    }
}

impl<K, V, H> StreamingMapBuilder<K, V, H> {
    /// Creates a streaming builder with the supplied hasher.
    #[must_use]
    pub fn with_hasher(hasher: H, batch_size: usize, auto_flush_size: usize) -> Self {
        let inner = BatchMapBuilder::with_hasher(hasher, batch_size);
        Self {
            auto_flush_size: auto_flush_size.max(inner.batch_size),
            auto_flush_enabled: auto_flush_size > 0,
            inner,
        }
    }

    /// Returns the total number of entries, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V, H> StreamingMapBuilder<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Hasher<K>,
{
    /// Adds an entry, honoring both flush triggers.
    pub fn set(&mut self, key: K, value: V) {
        self.inner.set(key, value);
        if self.auto_flush_enabled && self.inner.len() >= self.auto_flush_size {
            self.inner.flush();
        }
    }

    /// Drains a channel into the map until the sending side disconnects.
    pub fn stream(&mut self, entries: mpsc::Receiver<(K, V)>) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Adds the entries that satisfy `predicate`.
    pub fn filter<I, P>(&mut self, entries: I, predicate: P)
    where
        I: IntoIterator<Item = (K, V)>,
        P: Fn(&K, &V) -> bool,
    {
        for (key, value) in entries {
            if predicate(&key, &value) {
                self.set(key, value);
            }
        }
    }

    /// Adds every entry after applying `mapper`.
    pub fn transform<I, F>(&mut self, entries: I, mapper: F)
    where
        I: IntoIterator<Item = (K, V)>,
        F: Fn(K, V) -> (K, V),
    {
        for (key, value) in entries {
            let (key, value) = mapper(key, value);
            self.set(key, value);
        }
    }

    /// Adds every entry of a standard map.
    pub fn set_many(&mut self, entries: HashMap<K, V>) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Commits all buffered entries to the underlying map.
    pub fn flush(&mut self) {
        self.inner.flush();
    }

    /// Flushes and hands over the finished map, consuming the builder.
    #[must_use]
    pub fn publish(self) -> Map<K, V, H> {
        self.inner.publish()
    }
}

// =============================================================================
// Sorted Batch Builder
// =============================================================================

/// A buffered builder for [`SortedMap`], optionally keeping its buffer in
/// key order.
///
/// With sort maintenance enabled, each insertion scans for the first
/// buffered entry not smaller than the new key and shifts the tail, so
/// the flush applies entries in ascending order, the cheapest insertion
/// pattern for the tree.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::SortedBatchBuilder;
///
/// let mut builder = SortedBatchBuilder::new(16, true);
/// for key in [5, 1, 4, 2, 3] {
///     builder.set(key, key * 10);
/// }
/// let map = builder.publish();
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3, &4, &5]);
/// ```
#[derive(Clone)]
pub struct SortedBatchBuilder<K, V, C = NaturalComparer> {
    map: SortedMap<K, V, C>,
    batch_size: usize,
    buffer: Vec<(K, V)>,
    maintain_sort: bool,
}

impl<K, V> SortedBatchBuilder<K, V> {
    /// Creates a batch builder with the default comparer and the given
    /// buffer capacity; zero falls back to the default of 32.
    #[must_use]
    pub fn new(batch_size: usize, maintain_sort: bool) -> Self {
        Self::with_comparer(NaturalComparer, batch_size, maintain_sort)
    }
}

impl<K, V, C> SortedBatchBuilder<K, V, C> {
    /// Creates a batch builder with the supplied comparer.
    #[must_use]
    pub fn with_comparer(comparer: C, batch_size: usize, maintain_sort: bool) -> Self {
        let batch_size = normalize_batch_size(batch_size);
        Self {
            map: SortedMap::with_comparer(comparer),
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            maintain_sort,
        }
    }

    /// Returns the total number of entries, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len() + self.buffer.len()
    }

    /// Returns `true` if no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, C> SortedBatchBuilder<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
{
    /// Adds an entry, keeping the buffer sorted when sort maintenance is
    /// enabled, and flushing when the buffer reaches capacity.
    pub fn set(&mut self, key: K, value: V) {
        if self.maintain_sort && !self.buffer.is_empty() {
            let position = self
                .buffer
                .iter()
                .position(|(existing, _)| {
                    self.map.comparer().compare(&key, existing) != Ordering::Greater
                })
                .unwrap_or(self.buffer.len());
            self.buffer.insert(position, (key, value));
        } else {
            self.buffer.push((key, value));
        }
        if self.buffer.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Adds every entry in order.
    pub fn set_all<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Commits all buffered entries to the underlying map.
    pub fn flush(&mut self) {
        for (key, value) in self.buffer.drain(..) {
            self.map.set_mut(key, value);
        }
    }

    /// Flushes and hands over the finished map, consuming the builder.
    #[must_use]
    pub fn publish(mut self) -> SortedMap<K, V, C> {
        self.flush();
        self.map
    }
}

// =============================================================================
// Batch Set Builders
// =============================================================================

/// A buffered builder for [`Set`], delegating to [`BatchMapBuilder`]
/// with the unit value type.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::BatchSetBuilder;
///
/// let mut builder = BatchSetBuilder::new(16);
/// builder.add_all([1, 2, 2, 3]);
/// let set = builder.publish();
/// assert_eq!(set.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct BatchSetBuilder<T, H = SeededHasher> {
    inner: BatchMapBuilder<T, (), H>,
}

impl<T> BatchSetBuilder<T> {
    /// Creates a batch builder with the default hasher and the given
    /// buffer capacity; zero falls back to the default of 32.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            inner: BatchMapBuilder::new(batch_size),
        }
    }
}

impl<T, H> BatchSetBuilder<T, H> {
    /// Creates a batch builder with the supplied hasher.
    #[must_use]
    pub fn with_hasher(hasher: H, batch_size: usize) -> Self {
        Self {
            inner: BatchMapBuilder::with_hasher(hasher, batch_size),
        }
    }

    /// Returns the total number of values, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no value has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T, H> BatchSetBuilder<T, H>
where
    T: Clone,
    H: Hasher<T>,
{
    /// Adds a value to the buffer.
    pub fn add(&mut self, value: T) {
        self.inner.set(value, ());
    }

    /// Adds every value in order.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.add(value);
        }
    }

    /// Commits all buffered values to the underlying set.
    pub fn flush(&mut self) {
        self.inner.flush();
    }

    /// Flushes and hands over the finished set, consuming the builder.
    #[must_use]
    pub fn publish(self) -> Set<T, H> {
        Set::from_map(self.inner.publish())
    }
}

/// A buffered builder for [`SortedSet`], delegating to
/// [`SortedBatchBuilder`] with the unit value type.
///
/// # Examples
///
/// ```rust
/// use permafrost::batch::BatchSortedSetBuilder;
///
/// let mut builder = BatchSortedSetBuilder::new(16, true);
/// builder.add_all([3, 1, 2]);
/// let set = builder.publish();
/// let values: Vec<&i32> = set.iter().collect();
/// assert_eq!(values, vec![&1, &2, &3]);
/// ```
#[derive(Clone)]
pub struct BatchSortedSetBuilder<T, C = NaturalComparer> {
    inner: SortedBatchBuilder<T, (), C>,
}

impl<T> BatchSortedSetBuilder<T> {
    /// Creates a batch builder with the default comparer and the given
    /// buffer capacity; zero falls back to the default of 32.
    #[must_use]
    pub fn new(batch_size: usize, maintain_sort: bool) -> Self {
        Self {
            inner: SortedBatchBuilder::new(batch_size, maintain_sort),
        }
    }
}

impl<T, C> BatchSortedSetBuilder<T, C> {
    /// Creates a batch builder with the supplied comparer.
    #[must_use]
    pub fn with_comparer(comparer: C, batch_size: usize, maintain_sort: bool) -> Self {
        Self {
            inner: SortedBatchBuilder::with_comparer(comparer, batch_size, maintain_sort),
        }
    }

    /// Returns the total number of values, committed plus buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no value has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T, C> BatchSortedSetBuilder<T, C>
where
    T: Clone,
    C: Comparer<T>,
{
    /// Adds a value, keeping the buffer sorted when sort maintenance is
    /// enabled.
    pub fn add(&mut self, value: T) {
        self.inner.set(value, ());
    }

    /// Adds every value in order.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.add(value);
        }
    }

    /// Commits all buffered values to the underlying set.
    pub fn flush(&mut self) {
        self.inner.flush();
    }

    /// Flushes and hands over the finished set, consuming the builder.
    #[must_use]
    pub fn publish(self) -> SortedSet<T, C> {
        SortedSet::from_map(self.inner.publish())
    }
}

// =============================================================================
// Tests
// =============================================================================
