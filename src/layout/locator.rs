//! Scroll offset → index lookup.
//!
//! Two strategies, composed by [`index_at`]: a binary search over whatever
//! prefix the [`OffsetCache`] holds, and the analytic segment walk in
//! [`resolver`]. Both return the same index for the same offset.

use std::cmp::Ordering;

use super::offset_cache::OffsetCache;
use super::{resolver, AxisModel};

/// Binary search the cached prefix for the index containing `scroll_offset`.
///
/// Returns `None` when the answer lies beyond the cached prefix, i.e. the
/// greatest entry `<= scroll_offset` is the last cached one, the cache is
/// still incomplete, and the offset is past the end of that entry's extent.
pub fn search_cached(entries: &[f64], model: &AxisModel, scroll_offset: f64) -> Option<u32> {
    let last = entries.len().checked_sub(1)?;
    let hit = match entries
        .binary_search_by(|pos| pos.partial_cmp(&scroll_offset).unwrap_or(Ordering::Equal))
    {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    let index = u32::try_from(hit).ok()?;
    if hit < last {
        return Some(index);
    }

    let complete = u32::try_from(entries.len()).ok()? >= model.length();
    if complete {
        return Some(index.min(model.length().saturating_sub(1)));
    }
    let start = entries.get(hit).copied()?;
    if scroll_offset < start + resolver::size_of(model, index) {
        Some(index)
    } else {
        None
    }
}

/// Index occupying `scroll_offset` along the axis described by `model`.
///
/// Never waits on the indexer: the cached prefix is used when it covers the
/// offset, the analytic walk otherwise.
pub fn index_at(model: &AxisModel, cache: &OffsetCache, scroll_offset: f64) -> u32 {
    if model.is_empty() || scroll_offset.is_nan() || scroll_offset <= 0.0 {
        return 0;
    }
    cache
        .read(|entries| search_cached(entries, model, scroll_offset))
        .unwrap_or_else(|| resolver::index_at(model, scroll_offset))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::layout::offset_cache::Generation;
    use std::collections::HashMap;
    use test_case::test_case;

    fn model() -> AxisModel {
        AxisModel::new(100_000, 100, HashMap::from([(2, 300)])).unwrap()
    }

    fn prefix(model: &AxisModel, len: u32) -> Vec<f64> {
        (0..len).map(|i| resolver::offset_of(model, i)).collect()
    }

    #[test_case(250.0, Some(2))]
    #[test_case(500.0, Some(3))]
    #[test_case(599.0, Some(3); "inside last cached entry")]
    #[test_case(600.0, None; "beyond cached prefix")]
    fn test_search_partial_prefix(scroll: f64, expected: Option<u32>) {
        let model = model();
        let entries = prefix(&model, 4);
        assert_eq!(search_cached(&entries, &model, scroll), expected);
    }

    #[test]
    fn test_search_empty_cache() {
        assert_eq!(search_cached(&[], &model(), 10.0), None);
    }

    #[test]
    fn test_search_complete_cache_clamps_to_last() {
        let model = AxisModel::uniform(3, 10).unwrap();
        let entries = prefix(&model, 3);
        assert_eq!(search_cached(&entries, &model, 29.0), Some(2));
        assert_eq!(search_cached(&entries, &model, 1e9), Some(2));
    }

    #[test]
    fn test_index_at_falls_back_past_prefix() {
        let model = model();
        let cache = OffsetCache::new();
        let generation = Generation::mint();
        cache.reset(generation);
        cache.append_chunk(generation, &prefix(&model, 10));

        assert_eq!(index_at(&model, &cache, 0.0), 0);
        assert_eq!(index_at(&model, &cache, 250.0), 2);
        assert_eq!(index_at(&model, &cache, 5_000.0), 48);
        assert_eq!(index_at(&model, &cache, -3.0), 0);
        assert_eq!(index_at(&model, &cache, 1e15), 99_999);
    }

    #[test]
    fn test_index_at_agrees_across_fill_levels() {
        let model =
            AxisModel::new(300, 20, HashMap::from([(0, 5), (3, 90), (4, 1), (150, 400)])).unwrap();
        let full = prefix(&model, model.length());
        let probes: Vec<f64> = (0..700).map(|i| f64::from(i) * 13.5).collect();

        for fill in [0, 1, 4, 5, 100, 151, 300] {
            let cache = OffsetCache::new();
            let generation = Generation::mint();
            cache.reset(generation);
            cache.append_chunk(generation, &full[..fill]);
            for &scroll in &probes {
                assert_eq!(
                    index_at(&model, &cache, scroll),
                    resolver::index_at(&model, scroll),
                    "fill {fill}, scroll {scroll}"
                );
            }
        }
    }
}
