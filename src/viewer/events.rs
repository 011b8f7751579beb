//! Pointer handling for `GridView`: hit testing and click selection.

use wasm_bindgen::prelude::*;

use super::{to_js, GridView};
use crate::types::{AxisKind, HitTarget, Selection};

impl GridView {
    pub(crate) fn click_state(&mut self, x: f64, y: f64) -> Option<&Selection> {
        let hit = self.layout.hit_test(x, y);
        let rows = self.layout.axis(AxisKind::Row).len();
        let cols = self.layout.axis(AxisKind::Column).len();
        // Clicks on nothing keep the previous selection.
        if let Some(selection) = hit.selection(rows, cols) {
            tracing::trace!(?hit, "selection changed");
            self.selection = Some(selection);
        }
        self.selection.as_ref()
    }

    pub(crate) fn hit(&self, x: f64, y: f64) -> HitTarget {
        self.layout.hit_test(x, y)
    }
}

#[wasm_bindgen]
impl GridView {
    /// What the pointer at canvas position `(x, y)` is over, as
    /// `{kind, row?, col?}`.
    #[wasm_bindgen]
    pub fn hit_test(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        to_js(&self.hit(x, y))
    }

    /// Handle a click. Returns the selection as `[min_row, min_col, max_row, max_col]`.
    #[wasm_bindgen]
    pub fn on_click(&mut self, x: f64, y: f64) -> Option<Vec<u32>> {
        self.click_state(x, y).map(selection_bounds)
    }

    /// Get selection as [min_row, min_col, max_row, max_col]
    #[wasm_bindgen]
    pub fn get_selection(&self) -> Option<Vec<u32>> {
        self.selection.as_ref().map(selection_bounds)
    }

    /// Drop the current selection.
    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

fn selection_bounds(selection: &Selection) -> Vec<u32> {
    let (min_row, min_col, max_row, max_col) = selection.bounds();
    vec![min_row, min_col, max_row, max_col]
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use crate::types::{HitTarget, SelectionType};
    use crate::viewer::tests::view;

    #[test]
    fn test_click_selects_cell_under_pointer() {
        let (mut view, _queue) = view();
        // 50 px row header, 30 px column header; column 2 spans 200..500
        assert_eq!(view.on_click(50.0 + 260.0, 30.0 + 5.0), Some(vec![0, 2, 0, 2]));
        assert!(view.scroll(300.0, 0.0));
        assert_eq!(view.on_click(50.0 + 10.0, 30.0 + 105.0), Some(vec![1, 2, 1, 2]));
    }

    #[test]
    fn test_header_clicks() {
        let (mut view, _queue) = view();
        assert_eq!(view.hit(60.0, 10.0), HitTarget::ColumnHeader { col: 0 });
        let bounds = view.on_click(60.0, 10.0).unwrap();
        assert_eq!(bounds, vec![0, 0, 999, 0]);
        assert_eq!(
            view.selection().unwrap().selection_type,
            SelectionType::ColumnRange
        );
        assert_eq!(view.on_click(5.0, 5.0), Some(vec![0, 0, 999, 99_999]));
    }

    #[test]
    fn test_click_outside_keeps_selection() {
        let (mut view, _queue) = view();
        view.on_click(60.0, 40.0);
        assert_eq!(view.on_click(-10.0, 40.0), Some(vec![0, 0, 0, 0]));
        view.clear_selection();
        assert_eq!(view.get_selection(), None);
    }
}
