//! Property-based invariant tests for axis offsets, indexing and windows.
//!
//! Invariants covered:
//! 1. The indexer's cache holds exactly the analytic offsets, in order.
//! 2. Index lookup agrees with the analytic walk at every cache fill level.
//! 3. `index_at(s)` is the index whose extent contains `s`.
//! 4. A superseded run never writes into the cache.
//! 5. A viewport window covers the whole requested span.
//! 6. Scrollbar thumb ↔ scroll offset mapping round-trips.

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

use proptest::prelude::*;
use xlgrid::layout::{
    index_at, resolver, viewport_window, AxisModel, BackgroundIndexer, DeferredSpawner,
    Generation, IndexJob, JobStatus, OffsetCache, ScrollbarMapper, Spawner,
};

// =============================================================================
// Helpers
// =============================================================================

fn axis_model() -> impl Strategy<Value = AxisModel> {
    (1u32..3_000, 1u32..200)
        .prop_flat_map(|(length, default_size)| {
            (
                Just(length),
                Just(default_size),
                proptest::collection::vec((0..length, 1u32..2_000), 0..48),
            )
        })
        .prop_map(|(length, default_size, overrides)| {
            let overrides: HashMap<u32, u32> = overrides.into_iter().collect();
            AxisModel::new(length, default_size, overrides).unwrap()
        })
}

/// Analytic offsets of every index, plus the total extent at `length`.
fn analytic_offsets(model: &AxisModel) -> Vec<f64> {
    (0..=model.length())
        .map(|i| resolver::offset_of(model, i))
        .collect()
}

/// Indexer over a fresh cache, driven by a deferred queue.
struct Harness {
    spawner: Arc<DeferredSpawner>,
    indexer: BackgroundIndexer,
}

impl Harness {
    fn new(chunk_size: u32) -> Self {
        let spawner = Arc::new(DeferredSpawner::new());
        let indexer = BackgroundIndexer::new(
            Arc::new(OffsetCache::new()),
            Arc::clone(&spawner) as Arc<dyn Spawner>,
            chunk_size,
            "prop",
        );
        Self { spawner, indexer }
    }

    fn cache(&self) -> &OffsetCache {
        self.indexer.cache()
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Invariant 1: after a complete run the cache is the analytic prefix sum.
    #[test]
    fn indexed_offsets_equal_analytic(model in axis_model(), chunk in 1u32..700) {
        let harness = Harness::new(chunk);
        harness.indexer.start(Arc::new(model.clone()));
        harness.spawner.drain();

        let expected = analytic_offsets(&model);
        let cached = harness.cache().snapshot();
        prop_assert_eq!(cached.len(), model.length() as usize);
        prop_assert_eq!(&cached[..], &expected[..cached.len()]);
        prop_assert_eq!(expected[cached.len()], model.total_extent());
        prop_assert!(cached.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(cached[0], 0.0);
    }

    /// Invariant 2: lookups agree with the analytic walk whatever the fill.
    #[test]
    fn lookup_agrees_at_any_fill_level(
        model in axis_model(),
        chunk in 1u32..300,
        steps in 0usize..20,
        probes in proptest::collection::vec(0.0f64..1.0, 1..32),
    ) {
        let harness = Harness::new(chunk);
        harness.indexer.start(Arc::new(model.clone()));
        harness.spawner.pump(steps);

        let total = model.total_extent();
        for fraction in probes {
            let s = (fraction * total).floor();
            prop_assert_eq!(
                index_at(&model, harness.cache(), s),
                resolver::index_at(&model, s),
                "offset {} with {} cached", s, harness.cache().len()
            );
        }
        for (i, cached) in harness.cache().snapshot().into_iter().enumerate() {
            prop_assert_eq!(cached, resolver::offset_of(&model, i as u32));
        }
    }

    /// Invariant 3: `offset(i) <= s < offset(i + 1)` inside the content.
    #[test]
    fn index_at_contains_offset(model in axis_model(), fraction in 0.0f64..1.0) {
        let s = fraction * model.total_extent();
        prop_assume!(s < model.total_extent());
        let i = resolver::index_at(&model, s);
        prop_assert!(i < model.length());
        prop_assert!(resolver::offset_of(&model, i) <= s);
        prop_assert!(s < resolver::offset_of(&model, i + 1));
    }

    /// Invariant 4: restarting mid-flight leaves only new-generation entries.
    #[test]
    fn restart_discards_old_generation(
        old in axis_model(),
        new in axis_model(),
        chunk in 1u32..200,
        before in 0usize..10,
        after in 0usize..10,
    ) {
        let harness = Harness::new(chunk);
        harness.indexer.start(Arc::new(old));
        harness.spawner.pump(before);

        harness.indexer.start(Arc::new(new.clone()));
        prop_assert!(harness.cache().is_empty());
        harness.spawner.pump(after);

        let expected = analytic_offsets(&new);
        let cached = harness.cache().snapshot();
        prop_assert_eq!(&cached[..], &expected[..cached.len()]);

        harness.spawner.drain();
        prop_assert_eq!(harness.cache().len(), new.length() as usize);
        prop_assert!(harness.spawner.is_idle());
    }

    /// Invariant 4, with arbitrarily interleaved jobs sharing one cache.
    #[test]
    fn interleaved_stale_job_never_writes(
        old in axis_model(),
        new in axis_model(),
        chunk in 1u32..100,
        schedule in proptest::collection::vec(any::<bool>(), 1..64),
    ) {
        let cache = Arc::new(OffsetCache::new());
        let stale = Generation::mint();
        cache.reset(stale);
        let mut old_job = IndexJob::new(Arc::new(old), Arc::clone(&cache), stale, chunk, "old");
        old_job.step();

        let current = Generation::mint();
        cache.reset(current);
        let mut new_job =
            IndexJob::new(Arc::new(new.clone()), Arc::clone(&cache), current, chunk, "new");

        let expected = analytic_offsets(&new);
        for step_old in schedule {
            if step_old {
                prop_assert_eq!(old_job.step(), JobStatus::Superseded);
            } else {
                new_job.step();
            }
            let cached = cache.snapshot();
            prop_assert_eq!(&cached[..], &expected[..cached.len()]);
        }
        prop_assert_eq!(new_job.run(), JobStatus::Complete);
        prop_assert_eq!(cache.len(), new.length() as usize);
    }

    /// Invariant 5: the window spans `[s, s + v)` or reaches the last index.
    #[test]
    fn window_covers_viewport(
        model in axis_model(),
        fraction in 0.0f64..1.0,
        viewport in 0.0f64..50_000.0,
        steps in 0usize..8,
    ) {
        let harness = Harness::new(64);
        harness.indexer.start(Arc::new(model.clone()));
        harness.spawner.pump(steps);

        let s = fraction * model.total_extent();
        let window = viewport_window(&model, harness.cache(), s, viewport);
        prop_assert!(window.count >= 1);
        prop_assert!(window.end_index() <= model.length());
        prop_assert!(resolver::offset_of(&model, window.start_index) <= s);
        prop_assert!(
            window.end_index() == model.length()
                || resolver::offset_of(&model, window.end_index()) >= s + viewport
        );
    }

    /// Invariant 6: thumb position maps back to the scroll offset within 1px.
    #[test]
    fn scrollbar_round_trip(
        viewport in 13.0f64..4_000.0,
        extra in 1.0f64..1e9,
        fraction in 0.0f64..=1.0,
    ) {
        let content = viewport + extra;
        let mapper = ScrollbarMapper::new(content, viewport, 12.0).unwrap();
        let scroll = fraction * mapper.content_max_travel();

        let thumb = mapper.thumb_position(scroll);
        prop_assert!((0.0..=mapper.thumb_max_travel()).contains(&thumb));
        prop_assert!(mapper.thumb_extent() >= 12.0);
        let back = mapper.scroll_offset_for_thumb(thumb);
        prop_assert!((back - scroll).abs() <= 1.0, "{} -> {} -> {}", scroll, thumb, back);
    }
}

#[test]
fn thumb_at_end_scrolls_to_exact_end() {
    let mapper = ScrollbarMapper::new(1_048_576.0 * 25.0, 700.0, 12.0).unwrap();
    assert_eq!(
        mapper.scroll_offset_for_thumb(mapper.thumb_max_travel()),
        1_048_576.0 * 25.0 - 700.0
    );
}
