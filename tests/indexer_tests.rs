//! Background indexing on real threads.
//!
//! These tests use `ThreadSpawner` and only assert on states that hold no
//! matter how the indexer threads are scheduled.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xlgrid::layout::{resolver, Axis, AxisModel, BackgroundIndexer, OffsetCache, ThreadSpawner};
use xlgrid::types::AxisKind;

const TIMEOUT: Duration = Duration::from_secs(30);

fn model(length: u32, overrides: &[(u32, u32)]) -> AxisModel {
    AxisModel::new(length, 25, overrides.iter().copied().collect()).unwrap()
}

fn assert_matches_model(cache: &OffsetCache, model: &AxisModel) {
    let entries = cache.snapshot();
    assert_eq!(entries.len(), model.length() as usize);
    for (i, offset) in entries.iter().enumerate() {
        let i = u32::try_from(i).unwrap();
        assert_eq!(*offset, resolver::offset_of(model, i), "offset of {i}");
    }
}

#[test]
fn test_thread_indexes_full_axis() {
    let model = model(250_000, &[(0, 100), (99_999, 3), (249_999, 400)]);
    let axis = Axis::new(AxisKind::Row, model.clone(), Arc::new(ThreadSpawner), 1000);

    assert!(axis.wait_until_indexed(TIMEOUT));
    assert!(axis.is_indexed());
    assert_matches_model(axis.cache(), &model);
    assert_eq!(axis.offset_of(250_000), model.total_extent());
}

#[test]
fn test_queries_during_indexing_match_resolver() {
    let model = model(500_000, &[(7, 60), (123_456, 900), (400_000, 1)]);
    let axis = Axis::new(AxisKind::Column, model.clone(), Arc::new(ThreadSpawner), 500);

    let total = model.total_extent();
    let mut probe = 0.0;
    while !axis.is_indexed() {
        assert_eq!(axis.index_at(probe), resolver::index_at(&model, probe));
        let index = resolver::index_at(&model, probe);
        assert_eq!(axis.offset_of(index), resolver::offset_of(&model, index));
        probe = (probe + 7_919.0) % total;
    }
    assert!(axis.wait_until_indexed(TIMEOUT));
}

#[test]
fn test_rapid_restarts_settle_on_last_model() {
    let mut axis = Axis::new(
        AxisKind::Row,
        model(200_000, &[]),
        Arc::new(ThreadSpawner),
        250,
    );

    let mut last = axis.model().clone();
    for size in 1..=20 {
        last = last.with_size(size * 1_000, size * 10).unwrap();
        axis.set_model(last.clone());
    }

    assert!(axis.wait_until_indexed(TIMEOUT));
    assert_matches_model(axis.cache(), &last);
}

#[test]
fn test_restart_under_concurrent_readers() {
    let cache = Arc::new(OffsetCache::new());
    let indexer = BackgroundIndexer::new(
        Arc::clone(&cache),
        Arc::new(ThreadSpawner),
        1000,
        "rows",
    );
    let models: Vec<AxisModel> = (0..8)
        .map(|k| model(100_000, &[(k * 10_000, 200 + k)]))
        .collect();

    thread::scope(|scope| {
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for _ in 0..2_000 {
                    // Whatever generation is live, entries form a strictly
                    // increasing prefix starting at zero.
                    cache.read(|entries| {
                        if let Some(first) = entries.first() {
                            assert_eq!(*first, 0.0);
                        }
                        assert!(entries.windows(2).all(|w| w[0] < w[1]));
                    });
                }
            });
        }
        for model in &models {
            indexer.start(Arc::new(model.clone()));
        }
    });

    let last = models.last().unwrap();
    assert!(cache.wait_for_len(last.length() as usize, TIMEOUT));
    assert_matches_model(&cache, last);
}

#[test]
fn test_dropping_indexer_stops_work() {
    let cache = Arc::new(OffsetCache::new());
    {
        let indexer = BackgroundIndexer::new(
            Arc::clone(&cache),
            Arc::new(ThreadSpawner),
            10,
            "cols",
        );
        indexer.start(Arc::new(model(5_000_000, &[])));
    }
    // Dropping supersedes the run and clears what it had written.
    thread::sleep(Duration::from_millis(50));
    assert!(cache.is_empty());
    assert!(!cache.wait_for_len(1, Duration::from_millis(50)));
}

/// Live threads whose name starts with `prefix` (Linux truncates names to 15 bytes).
#[cfg(target_os = "linux")]
fn threads_named(prefix: &str) -> usize {
    std::fs::read_dir("/proc/self/task")
        .unwrap()
        .filter_map(|task| std::fs::read_to_string(task.ok()?.path().join("comm")).ok())
        .filter(|name| name.trim_end().starts_with(prefix))
        .count()
}

#[cfg(target_os = "linux")]
#[test]
fn test_restarts_reuse_one_thread_per_axis() {
    let cache = Arc::new(OffsetCache::new());
    let indexer = BackgroundIndexer::new(
        Arc::clone(&cache),
        Arc::new(ThreadSpawner),
        1_000_000,
        "burst",
    );
    let mut peak = 0;
    for k in 0..200 {
        indexer.start(Arc::new(model(5_000_000, &[(k, 30)])));
        peak = peak.max(threads_named("xlgrid-index-bu"));
    }
    assert_eq!(peak, 1);

    drop(indexer);
    assert!(cache.is_empty());
    // The joined thread can linger in /proc for a moment after exiting.
    let mut remaining = threads_named("xlgrid-index-bu");
    for _ in 0..100 {
        if remaining == 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
        remaining = threads_named("xlgrid-index-bu");
    }
    assert_eq!(remaining, 0);
}

#[test]
fn test_empty_overrides_on_tiny_axes() {
    let lengths = [1, 2, 999, 1000, 1001];
    let axes: Vec<Axis> = lengths
        .iter()
        .map(|&len| {
            Axis::new(
                AxisKind::Column,
                AxisModel::new(len, 100, HashMap::new()).unwrap(),
                Arc::new(ThreadSpawner),
                1000,
            )
        })
        .collect();
    for axis in &axes {
        assert!(axis.wait_until_indexed(TIMEOUT));
        assert_eq!(axis.offset_of(axis.len()), f64::from(axis.len()) * 100.0);
        assert_eq!(axis.index_at(f64::from(axis.len()) * 100.0), axis.len() - 1);
    }
}
