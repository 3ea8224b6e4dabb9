//! Property-based tests for `List` invariants.

use permafrost::List;
use proptest::prelude::*;

proptest! {
    /// Element order and content match the source sequence.
    #[test]
    fn prop_get_matches_source(
        elements in prop::collection::vec(any::<i32>(), 0..200)
    ) {
        let list: List<i32> = elements.iter().copied().collect();
        prop_assert_eq!(list.len(), elements.len());
        for (index, element) in elements.iter().enumerate() {
            prop_assert_eq!(list.get(index), element);
        }
    }

    /// Slicing matches slicing the source sequence.
    #[test]
    fn prop_slice_matches_source(
        elements in prop::collection::vec(any::<i32>(), 1..200),
        bounds in any::<(prop::sample::Index, prop::sample::Index)>()
    ) {
        let list: List<i32> = elements.iter().copied().collect();
        let mut start = bounds.0.index(elements.len());
        let mut end = bounds.1.index(elements.len());
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        let window = list.slice(start, end);
        let collected: Vec<i32> = window.iter().copied().collect();
        prop_assert_eq!(collected, elements[start..end].to_vec());
    }

    /// A prepend then append adds one element at each end.
    #[test]
    fn prop_prepend_append_bookends(
        elements in prop::collection::vec(any::<i32>(), 0..100),
        front: i32,
        back: i32
    ) {
        let list: List<i32> = elements.iter().copied().collect();
        let grown = list.prepend(front).append(back);
        prop_assert_eq!(grown.len(), list.len() + 2);
        prop_assert_eq!(grown.get(0), &front);
        prop_assert_eq!(grown.get(grown.len() - 1), &back);
    }

    /// No operation on a derived list is observable through the original.
    #[test]
    fn prop_persistence(
        elements in prop::collection::vec(any::<i32>(), 1..100),
        value: i32,
        index in any::<prop::sample::Index>()
    ) {
        let list: List<i32> = elements.iter().copied().collect();
        let position = index.index(elements.len());

        let _appended = list.append(value);
        let _prepended = list.prepend(value);
        let _updated = list.set(position, value);
        let _sliced = list.slice(0, position);

        let observed: Vec<i32> = list.iter().copied().collect();
        prop_assert_eq!(observed, elements);
    }

    /// Forward iteration yields exactly `len` elements, and backward
    /// iteration yields the reverse.
    #[test]
    fn prop_iteration_length_and_reversal(
        elements in prop::collection::vec(any::<i32>(), 0..150)
    ) {
        let list: List<i32> = elements.iter().copied().collect();

        let forward: Vec<i32> = list.iter().copied().collect();
        prop_assert_eq!(forward.len(), list.len());

        let mut cursor = list.iterator();
        cursor.last();
        let mut backward = Vec::new();
        while let Some((_, element)) = cursor.prev() {
            backward.push(*element);
        }
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    /// Equal operation sequences on equal lists observe equal results.
    #[test]
    fn prop_determinism(
        elements in prop::collection::vec(any::<i32>(), 1..100),
        value: i32,
        index in any::<prop::sample::Index>()
    ) {
        let position = index.index(elements.len());
        let first: List<i32> = elements.iter().copied().collect();
        let second: List<i32> = elements.iter().copied().collect();
        prop_assert_eq!(
            first.set(position, value).append(value),
            second.set(position, value).append(value)
        );
    }
}
