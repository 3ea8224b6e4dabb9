//! Benchmarks comparing the persistent collections against their
//! standard-library counterparts and the builders against the
//! clone-per-operation path.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use permafrost::{List, ListBuilder, Map, MapBuilder, SortedMap};
use std::hint::black_box;

// =============================================================================
// List append
// =============================================================================

fn benchmark_list_append(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_append");

    for size in [100, 1000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("List", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut list = List::new();
                    for value in 0..size {
                        list = list.append(black_box(value));
                    }
                    black_box(list)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("ListBuilder", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut builder = ListBuilder::new();
                    for value in 0..size {
                        builder.append(black_box(value));
                    }
                    black_box(builder.publish())
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for value in 0..size {
                    vector.push(black_box(value));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Map insert and lookup
// =============================================================================

fn benchmark_map_set(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_set");

    for size in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("Map", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = Map::new();
                for key in 0..size {
                    map = map.set(black_box(key), key);
                }
                black_box(map)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("MapBuilder", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut builder = MapBuilder::new();
                    for key in 0..size {
                        builder.set(black_box(key), key);
                    }
                    black_box(builder.publish())
                });
            },
        );
    }

    group.finish();
}

fn benchmark_map_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_get");

    for size in [1000, 100_000] {
        let map: Map<i32, i32> = (0..size).map(|key| (key, key)).collect();
        let standard: std::collections::HashMap<i32, i32> =
            (0..size).map(|key| (key, key)).collect();

        group.bench_with_input(BenchmarkId::new("Map", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for key in (0..size).step_by(7) {
                    black_box(map.get(black_box(&key)));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for key in (0..size).step_by(7) {
                        black_box(standard.get(black_box(&key)));
                    }
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// SortedMap ordered fill
// =============================================================================

fn benchmark_sorted_map_set(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sorted_map_set");

    for size in [1000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("SortedMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = SortedMap::new();
                    for key in 0..size {
                        map = map.set(black_box(key), key);
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = std::collections::BTreeMap::new();
                    for key in 0..size {
                        map.insert(black_box(key), key);
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_list_append,
    benchmark_map_set,
    benchmark_map_get,
    benchmark_sorted_map_set
);
criterion_main!(benches);
