//! Integration tests for the batch and streaming builders.

use std::collections::HashMap;
use std::sync::mpsc;

use permafrost::batch::{
    BatchListBuilder, BatchMapBuilder, BatchSetBuilder, BatchSortedSetBuilder,
    SortedBatchBuilder, StreamingListBuilder, StreamingMapBuilder,
};
use rstest::rstest;

// =============================================================================
// Batch List Builder
// =============================================================================

#[rstest]
#[case::buffer_larger_than_input(64, 10)]
#[case::buffer_smaller_than_input(4, 100)]
#[case::zero_falls_back_to_default(0, 50)]
fn test_batch_list_builder_orders_match(#[case] batch_size: usize, #[case] count: i32) {
    let mut builder = BatchListBuilder::new(batch_size);
    builder.append_all(0..count);
    let list = builder.publish();
    let collected: Vec<i32> = list.iter().copied().collect();
    let expected: Vec<i32> = (0..count).collect();
    assert_eq!(collected, expected);
}

#[rstest]
fn test_batch_list_len_counts_buffered() {
    let mut builder = BatchListBuilder::new(100);
    builder.append_all(0..10);
    // Nothing flushed yet, the count still includes the buffer.
    assert_eq!(builder.len(), 10);
    builder.flush();
    assert_eq!(builder.len(), 10);
}

// =============================================================================
// Batch Map Builder
// =============================================================================

#[rstest]
fn test_batch_map_last_write_wins_on_empty_root() {
    let mut builder = BatchMapBuilder::new(16);
    builder.set(1, "a");
    builder.set(2, "b");
    builder.set(1, "c");
    let map = builder.publish();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"c"));
    assert_eq!(map.get(&2), Some(&"b"));
}

#[rstest]
fn test_batch_map_merges_into_existing_small_map() {
    let mut builder = BatchMapBuilder::new(3);
    builder.set_all([(1, 1), (2, 2), (3, 3)]); // flushes at capacity
    builder.set_all([(3, 33), (4, 4)]);
    let map = builder.publish();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&3), Some(&33));
    assert_eq!(map.get(&4), Some(&4));
}

#[rstest]
fn test_batch_map_large_flush() {
    let mut builder = BatchMapBuilder::new(128);
    builder.set_all((0..1000).map(|key| (key, key)));
    let map = builder.publish();
    assert_eq!(map.len(), 1000);
    for key in (0..1000).step_by(97) {
        assert_eq!(map.get(&key), Some(&key));
    }
}

#[rstest]
fn test_batch_map_reset_then_reuse() {
    let mut builder = BatchMapBuilder::new(8);
    builder.set_all((0..100).map(|key| (key, key)));
    builder.reset();
    builder.set(42, 42);
    let map = builder.publish();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&42), Some(&42));
}

// =============================================================================
// Streaming Builders
// =============================================================================

#[rstest]
fn test_streaming_list_channel_round_trip() {
    let (sender, receiver) = mpsc::channel();
    let producer = std::thread::spawn(move || {
        for value in 0..500 {
            sender.send(value).expect("receiver alive");
        }
    });

    let mut builder = StreamingListBuilder::new(16, 64);
    builder.stream(receiver);
    producer.join().expect("producer finished");

    let list = builder.publish();
    let collected: Vec<i32> = list.iter().copied().collect();
    let expected: Vec<i32> = (0..500).collect();
    assert_eq!(collected, expected);
}

#[rstest]
fn test_streaming_list_filter_and_transform() {
    let mut builder = StreamingListBuilder::new(8, 16);
    builder.filter(0..100, |value| value % 10 == 0);
    builder.transform(0..5, |value| value * 1000);
    let list = builder.publish();
    assert_eq!(list.len(), 15);
    assert_eq!(list.get(0), &0);
    assert_eq!(list.get(9), &90);
    assert_eq!(list.get(10), &0);
    assert_eq!(list.get(14), &4000);
}

#[rstest]
fn test_streaming_map_set_many_and_filter() {
    let mut source = HashMap::new();
    for key in 0..50 {
        source.insert(key, key * 2);
    }

    let mut builder = StreamingMapBuilder::new(8, 32);
    builder.set_many(source);
    builder.filter((50..100).map(|key| (key, key)), |key, _| key % 2 == 0);
    let map = builder.publish();
    assert_eq!(map.len(), 75);
    assert_eq!(map.get(&10), Some(&20));
    assert_eq!(map.get(&51), None);
    assert_eq!(map.get(&52), Some(&52));
}

#[rstest]
fn test_streaming_map_channel_round_trip() {
    let (sender, receiver) = mpsc::channel();
    for key in 0..100 {
        sender.send((key, key)).expect("receiver alive");
    }
    drop(sender);

    let mut builder = StreamingMapBuilder::new(4, 8);
    builder.stream(receiver);
    let map = builder.publish();
    assert_eq!(map.len(), 100);
}

// =============================================================================
// Sorted Batch Builders
// =============================================================================

#[rstest]
#[case::sorted_buffer(true)]
#[case::unsorted_buffer(false)]
fn test_sorted_batch_builder(#[case] maintain_sort: bool) {
    let mut builder = SortedBatchBuilder::new(16, maintain_sort);
    builder.set_all([(5, 50), (1, 10), (9, 90), (3, 30), (1, 11)]);
    let map = builder.publish();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&1), Some(&11));
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![1, 3, 5, 9]);
}

#[rstest]
fn test_sorted_batch_builder_large_reverse_input() {
    let mut builder = SortedBatchBuilder::new(32, true);
    builder.set_all((0..2000).rev().map(|key| (key, key)));
    let map = builder.publish();
    assert_eq!(map.len(), 2000);
    let keys: Vec<i32> = map.keys().copied().collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
}

// =============================================================================
// Batch Set Builders
// =============================================================================

#[rstest]
fn test_batch_set_builder_dedupes() {
    let mut builder = BatchSetBuilder::new(16);
    builder.add_all([1, 1, 2, 2, 3, 3]);
    let set = builder.publish();
    assert_eq!(set.len(), 3);
    assert!(set.has(&1) && set.has(&2) && set.has(&3));
}

#[rstest]
fn test_batch_sorted_set_builder_orders() {
    let mut builder = BatchSortedSetBuilder::new(8, true);
    builder.add_all([9, 1, 5, 1, 3]);
    let set = builder.publish();
    let values: Vec<i32> = set.iter().copied().collect();
    assert_eq!(values, vec![1, 3, 5, 9]);
}
