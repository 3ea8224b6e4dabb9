//! Persistent (immutable) indexed sequence.
//!
//! This module provides [`List`], an immutable dense sequence with
//! structural sharing, plus its iterator and builder.
//!
//! # Overview
//!
//! `List` is a 32-way bit-partitioned radix trie with a movable origin
//! offset. Small lists (up to 32 elements) are stored as one contiguous
//! buffer and transparently converted to the trie form the first time an
//! operation would grow them past the threshold. The movable origin maps a
//! logical index to a trie path, which makes prepend as cheap as append:
//! growing to the left plants the old root on the right-hand spine of a
//! taller tree instead of shifting every element.
//!
//! - O(log32 N) `get`, `set`, `append`, `prepend`
//! - O(log32 N) `slice`, which also drops references to elements outside
//!   the window so they can be reclaimed
//! - O(1) `len` and `is_empty`
//!
//! All operations return new lists without modifying the original, and
//! structural sharing ensures memory efficiency.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::List;
//!
//! let list = List::new().append(1).append(2).append(3);
//!
//! assert_eq!(list.get(0), &1);
//! assert_eq!(list.get(2), &3);
//!
//! // Structural sharing: the original list is preserved
//! let extended = list.append(4);
//! assert_eq!(list.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4); // New list
//! ```

use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;

use smallvec::SmallVec;

use crate::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Bits per level in the trie.
const BITS_PER_LEVEL: u32 = 5;

/// Branching factor (2^5 = 32).
const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Bit mask for extracting the slot index within a node.
const MASK: usize = BRANCHING_FACTOR - 1;

/// Largest list kept in the contiguous small-list representation.
const SLICE_THRESHOLD: usize = 32;

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the list trie.
#[derive(Clone)]
enum ListNode<T> {
    /// Contiguous buffer used while the list is small and unconverted.
    Slice { values: Vec<T> },
    /// Trie leaf: 32 slots plus an occupancy bitmap (bit *i* set iff slot
    /// *i* holds a live value).
    Leaf {
        values: [Option<T>; BRANCHING_FACTOR],
        occupied: u32,
    },
    /// Trie branch at depth >= 1; every present child sits at depth - 1.
    Branch {
        depth: u32,
        children: [Option<ReferenceCounter<ListNode<T>>>; BRANCHING_FACTOR],
    },
}

impl<T> ListNode<T> {
    fn empty_leaf() -> Self {
        ListNode::Leaf {
            values: std::array::from_fn(|_| None),
            occupied: 0,
        }
    }

    fn empty_branch(depth: u32) -> Self {
        ListNode::Branch {
            depth,
            children: std::array::from_fn(|_| None),
        }
    }

    /// Returns a fresh node for the given depth: a leaf at depth zero,
    /// otherwise a branch.
    fn new_node(depth: u32) -> Self {
        if depth == 0 {
            Self::empty_leaf()
        } else {
            Self::empty_branch(depth)
        }
    }

    fn depth(&self) -> u32 {
        match self {
            ListNode::Slice { .. } | ListNode::Leaf { .. } => 0,
            ListNode::Branch { depth, .. } => *depth,
        }
    }

    /// Resolves a trie index (origin already applied) to a value.
    fn get(&self, index: usize) -> Option<&T> {
        match self {
            ListNode::Slice { values } => values.get(index),
            ListNode::Leaf { values, .. } => values[index & MASK].as_ref(),
            ListNode::Branch { depth, children } => {
                let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
                children[slot].as_deref().and_then(|child| child.get(index))
            }
        }
    }
}

/// Writes `value` at the trie index, cloning every shared node along the
/// path and mutating uniquely owned ones in place.
fn set_in_node<T: Clone>(node: &mut ReferenceCounter<ListNode<T>>, index: usize, value: T) {
    match ReferenceCounter::make_mut(node) {
        ListNode::Slice { values } => values[index] = value,
        ListNode::Leaf { values, occupied } => {
            let slot = index & MASK;
            values[slot] = Some(value);
            *occupied |= 1 << slot;
        }
        ListNode::Branch { depth, children } => {
            let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
            let next_depth = *depth - 1;
            let child = children[slot]
                .get_or_insert_with(|| ReferenceCounter::new(ListNode::new_node(next_depth)));
            set_in_node(child, index, value);
        }
    }
}

/// Returns `true` if any live slot exists strictly before the trie index.
fn contains_before<T>(node: &ListNode<T>, index: usize) -> bool {
    match node {
        ListNode::Slice { .. } => false,
        ListNode::Leaf { occupied, .. } => (occupied.trailing_zeros() as usize) < (index & MASK),
        ListNode::Branch { depth, children } => {
            let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
            children[..slot].iter().any(Option::is_some)
                || children[slot]
                    .as_deref()
                    .is_some_and(|child| contains_before(child, index))
        }
    }
}

/// Returns `true` if any live slot exists strictly after the trie index.
fn contains_after<T>(node: &ListNode<T>, index: usize) -> bool {
    match node {
        ListNode::Slice { .. } => false,
        ListNode::Leaf { occupied, .. } => {
            let slot = index & MASK;
            occupied
                .checked_ilog2()
                .is_some_and(|highest| highest as usize > slot)
        }
        ListNode::Branch { depth, children } => {
            let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
            children[slot + 1..].iter().any(Option::is_some)
                || children[slot]
                    .as_deref()
                    .is_some_and(|child| contains_after(child, index))
        }
    }
}

/// Clears every slot strictly before the trie index so the values can be
/// reclaimed.
fn delete_before<T: Clone>(node: &mut ReferenceCounter<ListNode<T>>, index: usize) {
    if !contains_before(node, index) {
        return;
    }
    match ReferenceCounter::make_mut(node) {
        ListNode::Slice { .. } => {}
        ListNode::Leaf { values, occupied } => {
            let slot = index & MASK;
            for value in values.iter_mut().take(slot) {
                *value = None;
            }
            *occupied &= !((1_u32 << slot) - 1);
        }
        ListNode::Branch { depth, children } => {
            let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
            for child in children.iter_mut().take(slot) {
                *child = None;
            }
            if let Some(child) = &mut children[slot] {
                delete_before(child, index);
            }
        }
    }
}

/// Clears every slot strictly after the trie index so the values can be
/// reclaimed.
fn delete_after<T: Clone>(node: &mut ReferenceCounter<ListNode<T>>, index: usize) {
    if !contains_after(node, index) {
        return;
    }
    match ReferenceCounter::make_mut(node) {
        ListNode::Slice { .. } => {}
        ListNode::Leaf { values, occupied } => {
            let slot = index & MASK;
            for value in values.iter_mut().skip(slot + 1) {
                *value = None;
            }
            *occupied &= if slot + 1 == BRANCHING_FACTOR {
                u32::MAX
            } else {
                (1_u32 << (slot + 1)) - 1
            };
        }
        ListNode::Branch { depth, children } => {
            let slot = (index >> (*depth * BITS_PER_LEVEL)) & MASK;
            for child in children.iter_mut().skip(slot + 1) {
                *child = None;
            }
            if let Some(child) = &mut children[slot] {
                delete_after(child, index);
            }
        }
    }
}

/// Builds a trie covering `values` in order: leaves of 32, wrapped in
/// branch layers of fan-out 32 until a single root remains.
fn to_trie<T: Clone>(values: &[T]) -> ReferenceCounter<ListNode<T>> {
    if values.is_empty() {
        return ReferenceCounter::new(ListNode::empty_leaf());
    }
    let mut nodes: Vec<ReferenceCounter<ListNode<T>>> = values
        .chunks(BRANCHING_FACTOR)
        .map(|chunk| {
            let mut leaf_values: [Option<T>; BRANCHING_FACTOR] = std::array::from_fn(|_| None);
            for (slot, value) in chunk.iter().enumerate() {
                leaf_values[slot] = Some(value.clone());
            }
            let occupied = if chunk.len() == BRANCHING_FACTOR {
                u32::MAX
            } else {
                (1_u32 << chunk.len()) - 1
            };
            ReferenceCounter::new(ListNode::Leaf {
                values: leaf_values,
                occupied,
            })
        })
        .collect();

    let mut depth = 1_u32;
    while nodes.len() > 1 {
        nodes = nodes
            .chunks(BRANCHING_FACTOR)
            .map(|chunk| {
                let mut children: [Option<ReferenceCounter<ListNode<T>>>; BRANCHING_FACTOR] =
                    std::array::from_fn(|_| None);
                for (slot, node) in chunk.iter().enumerate() {
                    children[slot] = Some(node.clone());
                }
                ReferenceCounter::new(ListNode::Branch { depth, children })
            })
            .collect();
        depth += 1;
    }

    match nodes.pop() {
        Some(root) => root,
        None => unreachable!("trie construction yields at least one node"),
    }
}

// =============================================================================
// List Definition
// =============================================================================

/// A persistent (immutable) indexed sequence.
///
/// `List` is an immutable data structure that uses structural sharing to
/// efficiently support functional programming patterns. Lists of up to 32
/// elements live in one contiguous buffer; larger lists use a 32-way
/// radix trie addressed through a movable origin, which makes prepend as
/// cheap as append.
///
/// # Time Complexity
///
/// | Operation     | Complexity   |
/// |---------------|--------------|
/// | `new`         | O(1)         |
/// | `get`         | O(log32 N)   |
/// | `set`         | O(log32 N)   |
/// | `append`      | O(log32 N)   |
/// | `prepend`     | O(log32 N)   |
/// | `slice`       | O(log32 N)   |
/// | `len`         | O(1)         |
/// | `is_empty`    | O(1)         |
///
/// # Examples
///
/// ```rust
/// use permafrost::List;
///
/// let list: List<i32> = (0..100).collect();
/// assert_eq!(list.len(), 100);
/// assert_eq!(list.get(50), &50);
/// ```
#[derive(Clone)]
pub struct List<T> {
    /// Root node of the trie (or the small-list buffer).
    root: ReferenceCounter<ListNode<T>>,
    /// Offset added to a logical index to produce the trie path.
    origin: usize,
    /// Number of elements in use.
    size: usize,
}

impl<T> List<T> {
    /// Creates a new empty list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = List::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(ListNode::Slice { values: Vec::new() }),
            origin: 0,
            size: 0,
        }
    }

    /// Returns the number of elements in the list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (1..=5).collect();
    /// assert_eq!(list.len(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns a reference to the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (10..15).collect();
    /// assert_eq!(list.get(0), &10);
    /// assert_eq!(list.get(4), &14);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        assert!(
            index < self.size,
            "List::get: index {index} out of bounds (len {})",
            self.size
        );
        let Some(value) = self.root.get(self.origin + index) else {
            unreachable!("List::get: unoccupied slot inside the live window");
        };
        value
    }

    /// Returns a cursor positioned at the first index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (1..=3).collect();
    /// let mut cursor = list.iterator();
    /// assert_eq!(cursor.next(), Some((0, &1)));
    /// assert_eq!(cursor.next(), Some((1, &2)));
    /// ```
    #[must_use]
    pub fn iterator(&self) -> ListIterator<'_, T> {
        ListIterator::new(self)
    }

    /// Returns an iterator over references to the elements, front to back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (1..=3).collect();
    /// let collected: Vec<&i32> = list.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> ListRefIterator<'_, T> {
        ListRefIterator {
            cursor: self.iterator(),
        }
    }

    /// Returns `true` if the list contains a value equal to `value` under
    /// the supplied equality function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (1..=5).collect();
    /// assert!(list.contains_by(&-3, |a, b| a.abs() == b.abs()));
    /// ```
    pub fn contains_by<F>(&self, value: &T, equal: F) -> bool
    where
        F: Fn(&T, &T) -> bool,
    {
        self.iter().any(|element| equal(element, value))
    }

    /// Whether the list still uses the contiguous small-list buffer.
    pub(crate) fn is_slice_backed(&self) -> bool {
        matches!(self.root.as_ref(), ListNode::Slice { .. })
    }

    /// The small-list buffer, when the list is still slice backed.
    pub(crate) fn slice_values(&self) -> Option<&[T]> {
        match self.root.as_ref() {
            ListNode::Slice { values } => Some(values),
            _ => None,
        }
    }

    /// Total number of addressable slots at the current depth.
    fn cap(&self) -> usize {
        1_usize << (self.root.depth() * BITS_PER_LEVEL)
    }
}

impl<T: PartialEq> List<T> {
    /// Returns `true` if the list contains the given value, using the
    /// element type's own equality.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (1..=5).collect();
    /// assert!(list.contains(&3));
    /// assert!(!list.contains(&6));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.contains_by(value, T::eq)
    }
}

impl<T: Clone> List<T> {
    /// Returns a new list with `value` stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (0..5).collect();
    /// let updated = list.set(2, 100);
    ///
    /// assert_eq!(updated.get(2), &100);
    /// assert_eq!(list.get(2), &2); // Original unchanged
    /// ```
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Self {
        let mut other = self.clone();
        other.set_mut(index, value);
        other
    }

    /// Returns a new list with `value` added to the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list = List::new().append(1).append(2);
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.get(1), &2);
    /// ```
    #[must_use]
    pub fn append(&self, value: T) -> Self {
        let mut other = self.clone();
        other.append_mut(value);
        other
    }

    /// Returns a new list with `value` added to the beginning.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list = List::new().append(1).prepend(0);
    /// assert_eq!(list.get(0), &0);
    /// assert_eq!(list.get(1), &1);
    /// ```
    #[must_use]
    pub fn prepend(&self, value: T) -> Self {
        let mut other = self.clone();
        other.prepend_mut(value);
        other
    }

    /// Returns a new list covering the elements between `start`
    /// (inclusive) and `end` (exclusive).
    ///
    /// References to elements outside the window are removed so that the
    /// values can be reclaimed.
    ///
    /// # Panics
    ///
    /// Panics if `start > len()`, `end > len()`, or `start > end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::List;
    ///
    /// let list: List<i32> = (0..10).collect();
    /// let sliced = list.slice(2, 5);
    ///
    /// assert_eq!(sliced.len(), 3);
    /// assert_eq!(sliced.get(0), &2);
    /// assert_eq!(sliced.get(2), &4);
    /// ```
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let mut other = self.clone();
        other.slice_mut(start, end);
        other
    }

    /// In-place `set`: shared nodes along the path are cloned, uniquely
    /// owned ones are updated directly.
    pub(crate) fn set_mut(&mut self, index: usize, value: T) {
        assert!(
            index < self.size,
            "List::set: index {index} out of bounds (len {})",
            self.size
        );
        if self.is_slice_backed() {
            let ListNode::Slice { values } = ReferenceCounter::make_mut(&mut self.root) else {
                unreachable!()
            };
            values[index] = value;
            return;
        }
        set_in_node(&mut self.root, self.origin + index, value);
    }

    /// In-place `append`.
    pub(crate) fn append_mut(&mut self, value: T) {
        if self.is_slice_backed() {
            if self.size < SLICE_THRESHOLD {
                let ListNode::Slice { values } = ReferenceCounter::make_mut(&mut self.root) else {
                    unreachable!()
                };
                values.push(value);
                self.size += 1;
                return;
            }
            self.convert_to_trie();
        }
        // Expand to the right when no slots remain at the current depth.
        if self.origin + self.size >= self.cap() {
            let depth = self.root.depth() + 1;
            let mut children: [Option<ReferenceCounter<ListNode<T>>>; BRANCHING_FACTOR] =
                std::array::from_fn(|_| None);
            children[0] = Some(self.root.clone());
            self.root = ReferenceCounter::new(ListNode::Branch { depth, children });
        }
        self.size += 1;
        set_in_node(&mut self.root, self.origin + self.size - 1, value);
    }

    /// In-place `prepend`.
    pub(crate) fn prepend_mut(&mut self, value: T) {
        if self.is_slice_backed() {
            if self.size < SLICE_THRESHOLD {
                let ListNode::Slice { values } = ReferenceCounter::make_mut(&mut self.root) else {
                    unreachable!()
                };
                values.insert(0, value);
                self.size += 1;
                return;
            }
            self.convert_to_trie();
        }
        // Expand to the left when the origin has no room: the current
        // content moves onto the right-hand spine of a taller tree.
        if self.origin == 0 {
            let depth = self.root.depth() + 1;
            let mut children: [Option<ReferenceCounter<ListNode<T>>>; BRANCHING_FACTOR] =
                std::array::from_fn(|_| None);
            children[BRANCHING_FACTOR - 1] = Some(self.root.clone());
            self.root = ReferenceCounter::new(ListNode::Branch { depth, children });
            self.origin += (BRANCHING_FACTOR - 1) << (depth * BITS_PER_LEVEL);
        }
        self.size += 1;
        self.origin -= 1;
        set_in_node(&mut self.root, self.origin, value);
    }

    /// In-place `slice`.
    pub(crate) fn slice_mut(&mut self, start: usize, end: usize) {
        assert!(
            start <= self.size,
            "List::slice: start index {start} out of bounds (len {})",
            self.size
        );
        assert!(
            end <= self.size,
            "List::slice: end index {end} out of bounds (len {})",
            self.size
        );
        assert!(start <= end, "List::slice: invalid range [{start}..{end})");
        if start == 0 && end == self.size {
            return;
        }

        if self.is_slice_backed() {
            let ListNode::Slice { values } = ReferenceCounter::make_mut(&mut self.root) else {
                unreachable!()
            };
            let trimmed = values[start..end].to_vec();
            *values = trimmed;
            self.size = end - start;
            return;
        }

        self.origin += start;
        self.size = end - start;
        if self.size == 0 {
            self.root = ReferenceCounter::new(ListNode::empty_leaf());
            self.origin = 0;
            return;
        }

        // Contract the tree while the whole window lives in one child.
        while self.root.depth() > 1 {
            let shift = self.root.depth() * BITS_PER_LEVEL;
            let first = (self.origin >> shift) & MASK;
            let last = ((self.origin + self.size - 1) >> shift) & MASK;
            if first != last {
                break;
            }
            let ListNode::Branch { children, .. } = self.root.as_ref() else {
                unreachable!()
            };
            let Some(child) = children[first].clone() else {
                unreachable!("List::slice: window child missing");
            };
            self.origin -= first << shift;
            self.root = child;
        }

        // Drop references outside the window so they can be reclaimed.
        delete_before(&mut self.root, self.origin);
        delete_after(&mut self.root, self.origin + self.size - 1);
    }

    /// Converts the small-list buffer into the trie representation. The
    /// conversion is one way: shrinking below the threshold afterwards
    /// never reverts it.
    fn convert_to_trie(&mut self) {
        let ListNode::Slice { values } = self.root.as_ref() else {
            unreachable!()
        };
        let root = to_trie(values);
        self.root = root;
        self.origin = 0;
    }

    /// Replaces the contents wholesale, picking the representation by
    /// size: at most 32 values stay contiguous, more build a trie.
    pub(crate) fn install_from_vec(&mut self, values: Vec<T>) {
        self.size = values.len();
        self.origin = 0;
        if values.len() <= SLICE_THRESHOLD && self.is_slice_backed() {
            self.root = ReferenceCounter::new(ListNode::Slice { values });
        } else {
            self.root = to_trie(&values);
        }
    }

    fn from_vec(values: Vec<T>) -> Self {
        let size = values.len();
        if size <= SLICE_THRESHOLD {
            return Self {
                root: ReferenceCounter::new(ListNode::Slice { values }),
                origin: 0,
                size,
            };
        }
        Self {
            root: to_trie(&values),
            origin: 0,
            size,
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A positional cursor over a [`List`].
///
/// The cursor starts at the first index and supports forward and backward
/// traversal as well as seeking. It keeps a stack of nodes along the
/// current path, bounded by the depth of the trie.
///
/// # Examples
///
/// ```rust
/// use permafrost::List;
///
/// let list: List<i32> = (10..13).collect();
/// let mut cursor = list.iterator();
///
/// assert_eq!(cursor.next(), Some((0, &10)));
/// cursor.last();
/// assert_eq!(cursor.prev(), Some((2, &12)));
/// assert_eq!(cursor.prev(), Some((1, &11)));
/// ```
pub struct ListIterator<'a, T> {
    list: &'a List<T>,
    index: usize,
    /// Set once `prev` walks off the front of the list.
    finished: bool,
    stack: SmallVec<[(&'a ListNode<T>, usize); 8]>,
}

impl<'a, T> ListIterator<'a, T> {
    fn new(list: &'a List<T>) -> Self {
        let mut iterator = Self {
            list,
            index: 0,
            finished: false,
            stack: SmallVec::new(),
        };
        iterator.first();
        iterator
    }

    /// Returns `true` if no element remains in the traversal direction.
    #[must_use]
    pub fn done(&self) -> bool {
        self.finished || self.index >= self.list.len()
    }

    /// Positions the cursor on the first index.
    pub fn first(&mut self) {
        self.finished = false;
        self.index = 0;
        if !self.list.is_empty() {
            self.seek_to(0);
        }
    }

    /// Positions the cursor on the last index.
    pub fn last(&mut self) {
        self.finished = false;
        if self.list.is_empty() {
            self.index = 0;
            return;
        }
        self.seek_to(self.list.len() - 1);
    }

    /// Positions the cursor on the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn seek(&mut self, index: usize) {
        assert!(
            index < self.list.len(),
            "ListIterator::seek: index {index} out of bounds (len {})",
            self.list.len()
        );
        self.finished = false;
        self.seek_to(index);
    }

    /// Returns the current index and value, then moves forward.
    pub fn next(&mut self) -> Option<(usize, &'a T)> {
        if self.done() {
            return None;
        }
        let index = self.index;
        let value = self.current_value();
        self.index += 1;
        if self.index < self.list.len() && !self.list.is_slice_backed() {
            // Pop levels already at their last child, then re-descend.
            while self.stack.len() > 1 && self.stack[self.stack.len() - 1].1 >= MASK {
                self.stack.pop();
            }
            self.descend();
        }
        Some((index, value))
    }

    /// Returns the current index and value, then moves backward.
    pub fn prev(&mut self) -> Option<(usize, &'a T)> {
        if self.done() {
            return None;
        }
        let index = self.index;
        let value = self.current_value();
        if self.index == 0 {
            self.finished = true;
        } else {
            self.index -= 1;
            if !self.list.is_slice_backed() {
                // Pop levels already at their first child, then re-descend.
                while self.stack.len() > 1 && self.stack[self.stack.len() - 1].1 == 0 {
                    self.stack.pop();
                }
                self.descend();
            }
        }
        Some((index, value))
    }

    fn seek_to(&mut self, index: usize) {
        self.index = index;
        self.stack.clear();
        if !self.list.is_slice_backed() {
            self.stack.push((self.list.root.as_ref(), 0));
            self.descend();
        }
    }

    /// Recomputes the path slots from the current stack top down to the
    /// leaf holding the current index.
    fn descend(&mut self) {
        loop {
            let Some(level) = self.stack.len().checked_sub(1) else {
                return;
            };
            let (node, _) = self.stack[level];
            match node {
                ListNode::Branch { depth, children } => {
                    let shift = *depth * BITS_PER_LEVEL;
                    let slot = ((self.list.origin + self.index) >> shift) & MASK;
                    self.stack[level].1 = slot;
                    let Some(child) = children[slot].as_deref() else {
                        unreachable!("ListIterator: missing child inside the live window");
                    };
                    self.stack.push((child, 0));
                }
                ListNode::Leaf { .. } => {
                    self.stack[level].1 = (self.list.origin + self.index) & MASK;
                    return;
                }
                ListNode::Slice { .. } => return,
            }
        }
    }

    fn current_value(&self) -> &'a T {
        match self.list.root.as_ref() {
            ListNode::Slice { values } => &values[self.index],
            _ => {
                let Some(&(node, slot)) = self.stack.last() else {
                    unreachable!("ListIterator: empty stack over a trie list");
                };
                let ListNode::Leaf { values, .. } = node else {
                    unreachable!("ListIterator: stack top is not a leaf");
                };
                let Some(value) = values[slot].as_ref() else {
                    unreachable!("ListIterator: unoccupied slot inside the live window");
                };
                value
            }
        }
    }
}

/// An iterator over references to the elements of a [`List`].
pub struct ListRefIterator<'a, T> {
    cursor: ListIterator<'a, T>,
}

impl<'a, T> Iterator for ListRefIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.cursor.done() {
            0
        } else {
            self.cursor.list.len() - self.cursor.index
        };
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for ListRefIterator<'_, T> {}

/// An owning iterator over the elements of a [`List`].
pub struct ListIntoIterator<T> {
    list: List<T>,
    index: usize,
}

impl<T: Clone> Iterator for ListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.list.len() {
            return None;
        }
        let value = self.list.get(self.index).clone();
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for ListIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for List<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> From<Vec<T>> for List<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Clone> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = ListIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        ListIntoIterator {
            list: self,
            index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = ListRefIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Index<usize> for List<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Builder Implementation
// =============================================================================

/// A mutable builder for constructing a [`List`] efficiently.
///
/// The builder owns the only reference to its list, so every operation
/// updates the spine in place instead of copying path nodes.
/// [`publish`](ListBuilder::publish) consumes the builder and returns the
/// finished immutable list; the move makes any further builder use a
/// compile-time error.
///
/// # Examples
///
/// ```rust
/// use permafrost::ListBuilder;
///
/// let mut builder = ListBuilder::new();
/// for value in 0..100 {
///     builder.append(value);
/// }
/// let list = builder.publish();
/// assert_eq!(list.len(), 100);
/// assert_eq!(list.get(42), &42);
/// ```
#[derive(Clone, Debug)]
pub struct ListBuilder<T> {
    list: List<T>,
}

impl<T> ListBuilder<T> {
    /// Creates a builder over an empty list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { list: List::new() }
    }

    /// Returns the number of elements in the underlying list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the underlying list is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns a reference to the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        self.list.get(index)
    }

    /// Returns a cursor over the current contents.
    #[must_use]
    pub fn iterator(&self) -> ListIterator<'_, T> {
        self.list.iterator()
    }

    /// Returns `true` if the current contents contain a value equal to
    /// `value` under the supplied equality function.
    pub fn contains_by<F>(&self, value: &T, equal: F) -> bool
    where
        F: Fn(&T, &T) -> bool,
    {
        self.list.contains_by(value, equal)
    }

    /// Hands over the finished list, consuming the builder.
    #[must_use]
    pub fn publish(self) -> List<T> {
        self.list
    }
}

impl<T: PartialEq> ListBuilder<T> {
    /// Returns `true` if the current contents contain the given value.
    pub fn contains(&self, value: &T) -> bool {
        self.list.contains(value)
    }
}

impl<T: Clone> ListBuilder<T> {
    /// Updates the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) {
        self.list.set_mut(index, value);
    }

    /// Adds `value` to the end of the list.
    pub fn append(&mut self, value: T) {
        self.list.append_mut(value);
    }

    /// Adds `value` to the beginning of the list.
    pub fn prepend(&mut self, value: T) {
        self.list.prepend_mut(value);
    }

    /// Restricts the list to the elements between `start` (inclusive) and
    /// `end` (exclusive).
    ///
    /// # Panics
    ///
    /// Panics if `start > len()`, `end > len()`, or `start > end`.
    pub fn slice(&mut self, start: usize, end: usize) {
        self.list.slice_mut(start, end);
    }
}

impl<T> Default for ListBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Extend<T> for ListBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
