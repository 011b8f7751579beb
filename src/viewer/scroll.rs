//! Scroll-related methods for `GridView`.
//!
//! Wheel deltas, absolute scrolling and scrollbar thumb drags all end in the
//! same clamped viewport update.

use wasm_bindgen::prelude::*;

use super::{to_js, GridView};
use crate::cell_ref::parse_cell_ref_strict;
use crate::types::AxisKind;

impl GridView {
    pub(crate) fn scroll_state(&mut self, delta_x: f64, delta_y: f64) -> Option<(f64, f64)> {
        let moved = self.layout.scroll_by(delta_x, delta_y);
        if let Some((dx, dy)) = moved {
            tracing::trace!(dx, dy, "scrolled");
        }
        moved
    }

    pub(crate) fn thumb_drag_state(&mut self, axis: AxisKind, thumb_position: f64) -> f64 {
        self.layout.drag_thumb(axis, thumb_position);
        self.layout.scroll_offset(axis)
    }
}

#[wasm_bindgen]
impl GridView {
    /// Apply a wheel delta. Returns true if the view moved.
    #[wasm_bindgen]
    pub fn scroll(&mut self, delta_x: f64, delta_y: f64) -> bool {
        self.scroll_state(delta_x, delta_y).is_some()
    }

    /// Scroll to an absolute position. Returns true if the view moved.
    #[wasm_bindgen]
    pub fn set_scroll(&mut self, x: f64, y: f64) -> bool {
        self.layout.set_scroll(x, y).is_some()
    }

    /// Horizontal scroll offset
    #[wasm_bindgen]
    pub fn scroll_x(&self) -> f64 {
        self.layout.viewport().scroll_x
    }

    /// Vertical scroll offset
    #[wasm_bindgen]
    pub fn scroll_y(&self) -> f64 {
        self.layout.viewport().scroll_y
    }

    /// `{visible, thumbExtent, thumbPosition}` of the scrollbar along `axis`.
    #[wasm_bindgen]
    pub fn scrollbar(&self, axis: AxisKind) -> Result<JsValue, JsValue> {
        let extent = self.layout.area_extent(axis);
        to_js(&self.layout.scrollbar_geometry(axis, extent))
    }

    /// Move the thumb of `axis` to `thumb_position` (clamped to the track) and
    /// return the resulting scroll offset.
    #[wasm_bindgen]
    pub fn on_thumb_drag(&mut self, axis: AxisKind, thumb_position: f64) -> f64 {
        self.thumb_drag_state(axis, thumb_position)
    }

    /// Bring a cell such as `"B12"` into view. Returns true if the view moved.
    #[wasm_bindgen]
    pub fn scroll_to_cell(&mut self, cell_ref: &str) -> Result<bool, JsValue> {
        let (col, row) = parse_cell_ref_strict(cell_ref).map_err(super::js_err)?;
        Ok(self.layout.scroll_to_cell(row, col).is_some())
    }
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
    use crate::viewer::tests::view;

    #[test]
    fn test_wheel_scroll_clamps() {
        let (mut view, _queue) = view();
        assert!(!view.scroll(-5.0, -5.0));
        assert!(view.scroll(250.0, 80.0));
        assert_eq!(view.window(AxisKind::Column).start_index, 2);
        assert_eq!(view.window(AxisKind::Row).start_index, 0);
        assert!(view.scroll(1e12, 1e12));
        assert_eq!(view.scroll_x(), 10_000_200.0 - 1000.0);
        assert!(!view.scroll(1.0, 1.0));
    }

    #[test]
    fn test_thumb_drag_reaches_both_ends() {
        let (mut view, _queue) = view();
        assert_eq!(view.on_thumb_drag(AxisKind::Column, 5_000.0), 9_999_200.0);
        assert_eq!(view.on_thumb_drag(AxisKind::Column, -5.0), 0.0);
        assert_eq!(view.scroll_x(), 0.0);
    }

    #[test]
    fn test_scroll_to_cell_ref() {
        let (mut view, _queue) = view();
        assert!(view.scroll_to_cell("A30").unwrap());
        // Row 29 ends at 100 + 29 * 25 = 825, grid area is 500 tall
        assert_eq!(view.scroll_y(), 325.0);
        assert!(!view.scroll_to_cell("A20").unwrap());
    }
}
