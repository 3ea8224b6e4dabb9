//! Unit tests for `Queue` through the public API.

use permafrost::{Queue, QueueBuilder};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
fn test_empty_queue() {
    let queue: Queue<i32> = Queue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.peek(), None);
    assert!(queue.dequeue().is_none());
    assert!(queue.iterator().done());
}

#[rstest]
fn test_enqueue_dequeue_fifo() {
    let mut queue = Queue::new();
    for value in 0..1000 {
        queue = queue.enqueue(value);
    }
    let mut drained = Vec::new();
    while let Some((rest, value)) = queue.dequeue() {
        drained.push(value);
        queue = rest;
    }
    let expected: Vec<i32> = (0..1000).collect();
    assert_eq!(drained, expected);
}

#[rstest]
fn test_from_iterator_seeds_front() {
    let queue: Queue<i32> = (0..5).collect();
    assert_eq!(queue.len(), 5);
    assert_eq!(queue.peek(), Some(&0));
}

#[rstest]
fn test_persistence_across_dequeues() {
    let queue: Queue<i32> = (0..10).collect();
    let (after_one, _) = queue.dequeue().unwrap();
    let (after_two, _) = after_one.dequeue().unwrap();
    assert_eq!(queue.len(), 10);
    assert_eq!(after_one.len(), 9);
    assert_eq!(after_two.len(), 8);
    assert_eq!(queue.peek(), Some(&0));
    assert_eq!(after_two.peek(), Some(&2));
}

#[rstest]
fn test_iterator_order_spans_both_lists() {
    // Mix dequeues and enqueues so elements sit on both internal lists.
    let mut queue: Queue<i32> = (0..5).collect();
    let (rest, _) = queue.dequeue().unwrap();
    queue = rest;
    for value in 5..10 {
        queue = queue.enqueue(value);
    }
    let collected: Vec<i32> = queue.iter().copied().collect();
    let expected: Vec<i32> = (1..10).collect();
    assert_eq!(collected, expected);
}

#[rstest]
fn test_builder_round_trip() {
    let mut builder = QueueBuilder::new();
    builder.enqueue_all(0..100);
    builder.enqueue(100);
    let queue = builder.publish();
    assert_eq!(queue.len(), 101);
    let collected: Vec<i32> = queue.iter().copied().collect();
    let expected: Vec<i32> = (0..=100).collect();
    assert_eq!(collected, expected);
}

proptest! {
    /// Arbitrary interleavings of enqueue and dequeue preserve FIFO
    /// order.
    #[test]
    fn prop_fifo_under_interleaving(
        operations in prop::collection::vec(any::<bool>(), 0..200)
    ) {
        let mut queue: Queue<i32> = Queue::new();
        let mut model: std::collections::VecDeque<i32> = std::collections::VecDeque::new();
        let mut next_value = 0;
        for is_enqueue in operations {
            if is_enqueue {
                queue = queue.enqueue(next_value);
                model.push_back(next_value);
                next_value += 1;
            } else if let Some((rest, value)) = queue.dequeue() {
                let expected = model.pop_front();
                prop_assert_eq!(Some(value), expected);
                queue = rest;
            } else {
                prop_assert!(model.is_empty());
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.peek().copied(), model.front().copied());
        }
        let drained: Vec<i32> = queue.iter().copied().collect();
        let expected: Vec<i32> = model.into_iter().collect();
        prop_assert_eq!(drained, expected);
    }
}
