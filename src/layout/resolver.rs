//! Analytic offset resolution straight from an [`AxisModel`].
//!
//! Nothing here touches the offset cache. These functions are the fallback
//! whenever the background indexer has not reached an index yet, and they are
//! O(k) in the number of overrides rather than O(n) in the axis length.

use super::AxisModel;

/// Size of `index` in pixels: its override if present, else the default.
pub fn size_of(model: &AxisModel, index: u32) -> f64 {
    f64::from(
        model
            .override_size(index)
            .unwrap_or_else(|| model.default_size()),
    )
}

/// Pixel offset of the start of `index`.
///
/// Computed as `index * default + Σ(override - default)` over the overrides
/// strictly before `index`. `offset_of(model, model.length())` is the total
/// extent of the axis.
pub fn offset_of(model: &AxisModel, index: u32) -> f64 {
    let default = f64::from(model.default_size());
    let mut diff = 0.0;
    for &overridden in model.override_indices() {
        if overridden >= index {
            break;
        }
        diff += size_of(model, overridden) - default;
    }
    f64::from(index) * default + diff
}

/// Index occupying `scroll_offset`, found by walking the override segments.
///
/// Each override splits the axis into a run of default-size indices followed
/// by the override itself. The walk stops at the segment containing the
/// offset; inside a uniform run the index is a floor division. Offsets past
/// the end resolve to the last index, negative or NaN offsets to 0.
pub fn index_at(model: &AxisModel, scroll_offset: f64) -> u32 {
    if model.is_empty() || scroll_offset.is_nan() || scroll_offset <= 0.0 {
        return 0;
    }
    let default = f64::from(model.default_size());
    let mut segment_index: u32 = 0;
    let mut segment_offset = 0.0;

    for &overridden in model.override_indices() {
        let gap_end = segment_offset + f64::from(overridden - segment_index) * default;
        if scroll_offset < gap_end {
            return index_in_run(segment_index, segment_offset, overridden, default, scroll_offset);
        }
        let override_end = gap_end + size_of(model, overridden);
        if scroll_offset < override_end {
            return overridden;
        }
        segment_index = overridden + 1;
        segment_offset = override_end;
    }

    if segment_index >= model.length() {
        return model.length() - 1;
    }
    index_in_run(
        segment_index,
        segment_offset,
        model.length(),
        default,
        scroll_offset,
    )
}

/// Index within a run of default-size indices `[start, end)` beginning at
/// `start_offset`. Clamped to the run.
///
/// The floor division is corrected against exact boundary offsets so the
/// result matches a binary search over materialized offsets even when the
/// division rounds across a boundary.
fn index_in_run(start: u32, start_offset: f64, end: u32, default: f64, scroll_offset: f64) -> u32 {
    let max_step = end.saturating_sub(start).saturating_sub(1);
    let steps = ((scroll_offset - start_offset) / default)
        .floor()
        .clamp(0.0, f64::from(max_step));
    // In range [0, max_step] after the clamp above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut step = steps as u32;
    while step > 0 && start_offset + f64::from(step) * default > scroll_offset {
        step -= 1;
    }
    while step < max_step && start_offset + f64::from(step + 1) * default <= scroll_offset {
        step += 1;
    }
    start + step
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn wide_third_column() -> AxisModel {
        AxisModel::new(100_000, 100, HashMap::from([(2, 300)])).unwrap()
    }

    #[test_case(0, 0.0)]
    #[test_case(1, 100.0)]
    #[test_case(2, 200.0)]
    #[test_case(3, 500.0)]
    #[test_case(4, 600.0)]
    #[test_case(100_000, 10_000_200.0)]
    fn test_offset_of_wide_column(index: u32, expected: f64) {
        assert_eq!(offset_of(&wide_third_column(), index), expected);
    }

    #[test_case(0.0, 0)]
    #[test_case(99.0, 0)]
    #[test_case(100.0, 1)]
    #[test_case(250.0, 2)]
    #[test_case(499.5, 2)]
    #[test_case(500.0, 3)]
    #[test_case(10_000_199.0, 99_999)]
    #[test_case(1.0e12, 99_999)]
    fn test_index_at_wide_column(scroll: f64, expected: u32) {
        assert_eq!(index_at(&wide_third_column(), scroll), expected);
    }

    #[test]
    fn test_tall_first_row() {
        let model = AxisModel::new(1000, 25, HashMap::from([(0, 100)])).unwrap();
        assert_eq!(offset_of(&model, 0), 0.0);
        assert_eq!(offset_of(&model, 1), 100.0);
        assert_eq!(offset_of(&model, 2), 125.0);
        assert_eq!(index_at(&model, 50.0), 0);
        assert_eq!(index_at(&model, 100.0), 1);
        assert_eq!(index_at(&model, 124.9), 1);
        assert_eq!(index_at(&model, 200.0), 5);
    }

    #[test]
    fn test_sizes() {
        let model = wide_third_column();
        assert_eq!(size_of(&model, 1), 100.0);
        assert_eq!(size_of(&model, 2), 300.0);
    }

    #[test]
    fn test_degenerate_offsets() {
        let model = wide_third_column();
        assert_eq!(index_at(&model, -40.0), 0);
        assert_eq!(index_at(&model, f64::NAN), 0);

        let empty = AxisModel::uniform(0, 10).unwrap();
        assert_eq!(index_at(&empty, 55.0), 0);
        assert_eq!(offset_of(&empty, 0), 0.0);
    }

    #[test]
    fn test_adjacent_overrides_and_trailing_override() {
        let model = AxisModel::new(4, 10, HashMap::from([(1, 5), (2, 7), (3, 50)])).unwrap();
        // starts: 0, 10, 15, 22, end 72
        assert_eq!(index_at(&model, 9.0), 0);
        assert_eq!(index_at(&model, 10.0), 1);
        assert_eq!(index_at(&model, 15.0), 2);
        assert_eq!(index_at(&model, 21.0), 2);
        assert_eq!(index_at(&model, 22.0), 3);
        assert_eq!(index_at(&model, 500.0), 3);
        assert_eq!(offset_of(&model, 4), 72.0);
    }

    #[test]
    fn test_offset_matches_progressive_sum() {
        let model =
            AxisModel::new(500, 17, HashMap::from([(0, 3), (7, 90), (8, 1), (499, 44)])).unwrap();
        let mut running = 0.0;
        for index in 0..=model.length() {
            assert_eq!(offset_of(&model, index), running, "index {index}");
            if index < model.length() {
                running += size_of(&model, index);
            }
        }
    }
}
