//! Visible index range of one axis for a given scroll offset and extent.

use serde::Serialize;

use super::offset_cache::OffsetCache;
use super::{locator, AxisModel};

/// First visible index and how many indices the renderer must draw.
///
/// `count` includes the trailing index that straddles the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportWindow {
    /// First index intersecting the viewport.
    pub start_index: u32,
    /// Number of indices to draw, starting at `start_index`.
    pub count: u32,
}

impl ViewportWindow {
    /// Window of an empty axis.
    pub const EMPTY: ViewportWindow = ViewportWindow {
        start_index: 0,
        count: 0,
    };

    /// One past the last index in the window.
    pub fn end_index(&self) -> u32 {
        self.start_index.saturating_add(self.count)
    }

    /// Indices covered by the window.
    pub fn indices(&self) -> std::ops::Range<u32> {
        self.start_index..self.end_index()
    }

    /// True if `index` falls inside the window.
    pub fn contains(&self, index: u32) -> bool {
        self.indices().contains(&index)
    }
}

/// Window covering `[scroll_offset, scroll_offset + viewport_extent)`.
///
/// `count` is clamped to `[1, length - start_index]`; an empty axis yields
/// [`ViewportWindow::EMPTY`].
pub fn viewport_window(
    model: &AxisModel,
    cache: &OffsetCache,
    scroll_offset: f64,
    viewport_extent: f64,
) -> ViewportWindow {
    if model.is_empty() {
        return ViewportWindow::EMPTY;
    }
    let start_index = locator::index_at(model, cache, scroll_offset);
    let extent = if viewport_extent.is_nan() {
        0.0
    } else {
        viewport_extent.max(0.0)
    };
    let end_index = locator::index_at(model, cache, scroll_offset.max(0.0) + extent);
    let remaining = model.length() - start_index;
    let count = end_index
        .saturating_sub(start_index)
        .saturating_add(1)
        .clamp(1, remaining);
    ViewportWindow { start_index, count }
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
    use crate::layout::resolver;
    use std::collections::HashMap;

    fn window(model: &AxisModel, scroll: f64, extent: f64) -> ViewportWindow {
        viewport_window(model, &OffsetCache::new(), scroll, extent)
    }

    #[test]
    fn test_tall_first_row() {
        let model = AxisModel::new(1000, 25, HashMap::from([(0, 100)])).unwrap();
        let win = window(&model, 0.0, 200.0);
        assert_eq!(win.start_index, 0);
        // rows 0..=5 start below 200; row 5 starts exactly at 200 and is included
        assert_eq!(win.count, 6);
        assert!(resolver::offset_of(&model, win.end_index()) >= 200.0);
    }

    #[test]
    fn test_trailing_partial_index_included() {
        let model = AxisModel::uniform(100, 10).unwrap();
        let win = window(&model, 15.0, 30.0);
        assert_eq!(win.start_index, 1);
        assert_eq!(win.count, 4);
        assert!(win.contains(4));
        assert!(!win.contains(5));
    }

    #[test]
    fn test_clamped_at_the_end() {
        let model = AxisModel::uniform(10, 10).unwrap();
        let win = window(&model, 95.0, 500.0);
        assert_eq!(win.start_index, 9);
        assert_eq!(win.count, 1);
        assert_eq!(win.end_index(), 10);
    }

    #[test]
    fn test_zero_extent_still_draws_one() {
        let model = AxisModel::uniform(10, 10).unwrap();
        assert_eq!(window(&model, 42.0, 0.0).count, 1);
        assert_eq!(window(&model, 42.0, f64::NAN).count, 1);
    }

    #[test]
    fn test_empty_axis() {
        let model = AxisModel::uniform(0, 10).unwrap();
        assert_eq!(window(&model, 0.0, 100.0), ViewportWindow::EMPTY);
        assert_eq!(ViewportWindow::EMPTY.indices().count(), 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&ViewportWindow {
            start_index: 3,
            count: 7,
        })
        .unwrap();
        assert_eq!(json, r#"{"startIndex":3,"count":7}"#);
    }
}
