//! `GridView` - the JavaScript-facing entry point.
//!
//! This module provides the WASM-exported `GridView` struct that handles:
//! - Building a [`GridLayout`] from a sheet JSON object
//! - Tracking scroll, size and selection for the host's renderer
//! - Driving the offset indexers (threads natively, host-pumped on wasm32)
//!
//! Rendering stays in JavaScript; everything it needs to place rows, columns
//! and scrollbars comes out of the methods below.

mod events;
mod scroll;

use std::sync::Arc;
use wasm_bindgen::prelude::*;

use crate::cell_ref::column_label;
use crate::layout::{DeferredSpawner, GridLayout, Spawner, ViewportWindow};
use crate::types::{AxisKind, GridOptions, Selection, SheetConfig};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Spawner used by the exported constructors.
///
/// wasm32 has no threads, so jobs queue until the host calls
/// `pump_indexers` from an idle callback.
#[cfg(target_arch = "wasm32")]
fn platform_spawner() -> Option<Arc<DeferredSpawner>> {
    Some(Arc::new(DeferredSpawner::new()))
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_spawner() -> Option<Arc<DeferredSpawner>> {
    None
}

/// Virtualized grid state for one sheet.
#[wasm_bindgen]
pub struct GridView {
    layout: GridLayout,
    /// Present when indexing is host-pumped rather than threaded.
    deferred: Option<Arc<DeferredSpawner>>,
    selection: Option<Selection>,
}

impl GridView {
    /// Build a view, queueing indexer work on `deferred` if given, else on threads.
    ///
    /// # Errors
    /// Returns an error if the sheet is invalid.
    pub fn from_config(
        sheet: &SheetConfig,
        options: GridOptions,
        width: f64,
        height: f64,
        deferred: Option<Arc<DeferredSpawner>>,
    ) -> crate::Result<Self> {
        let spawner: Arc<dyn Spawner> = match &deferred {
            Some(queue) => Arc::clone(queue) as Arc<dyn Spawner>,
            None => Arc::new(crate::layout::ThreadSpawner),
        };
        let layout = GridLayout::new(sheet, options, spawner, width, height)?;
        tracing::debug!(
            rows = sheet.max_row,
            cols = sheet.max_col,
            width,
            height,
            "grid view created"
        );
        Ok(Self {
            layout,
            deferred,
            selection: None,
        })
    }

    /// The underlying layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Current visible window of `axis`.
    pub fn window(&self, axis: AxisKind) -> ViewportWindow {
        self.layout.visible_window(axis)
    }

    /// Current selection, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Advance host-pumped indexers by up to `max_chunks` chunks.
    pub fn pump(&self, max_chunks: usize) -> usize {
        self.deferred
            .as_ref()
            .map_or(0, |queue| queue.pump(max_chunks))
    }
}

#[wasm_bindgen]
impl GridView {
    /// Create a view from a sheet JSON string on a `width` × `height` canvas.
    #[wasm_bindgen(constructor)]
    pub fn new(sheet_json: &str, width: f64, height: f64) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();
        let sheet = SheetConfig::from_json(sheet_json).map_err(js_err)?;
        Self::from_config(
            &sheet,
            GridOptions::default(),
            width,
            height,
            platform_spawner(),
        )
        .map_err(js_err)
    }

    /// Create a view with explicit [`GridOptions`] (camelCase object).
    #[wasm_bindgen(js_name = "withOptions")]
    pub fn with_options(
        sheet_json: &str,
        options: JsValue,
        width: f64,
        height: f64,
    ) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();
        let sheet = SheetConfig::from_json(sheet_json).map_err(js_err)?;
        let options: GridOptions = serde_wasm_bindgen::from_value(options)?;
        Self::from_config(&sheet, options, width, height, platform_spawner()).map_err(js_err)
    }

    /// Resize the canvas. Returns true if the scroll position had to move.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.layout.resize(width, height).is_some()
    }

    /// Show or hide the header strips. Returns true if the scroll position had to move.
    #[wasm_bindgen]
    pub fn set_show_headers(&mut self, visible: bool) -> bool {
        self.layout.set_headers_visible(visible).is_some()
    }

    /// Visible `{startIndex, count}` of `axis` at the current scroll position.
    #[wasm_bindgen]
    pub fn viewport_window(&self, axis: AxisKind) -> Result<JsValue, JsValue> {
        to_js(&self.window(axis))
    }

    /// `{startIndex, count}` of `axis` for an arbitrary scroll offset and extent.
    #[wasm_bindgen]
    pub fn window_at(
        &self,
        axis: AxisKind,
        scroll_offset: f64,
        viewport_extent: f64,
    ) -> Result<JsValue, JsValue> {
        to_js(
            &self
                .layout
                .viewport_window(axis, scroll_offset, viewport_extent),
        )
    }

    /// Sheet-space offset of `index` along `axis`.
    #[wasm_bindgen]
    pub fn offset(&self, axis: AxisKind, index: u32) -> f64 {
        self.layout.offset(axis, index)
    }

    /// Size of `index` along `axis`.
    #[wasm_bindgen]
    pub fn size(&self, axis: AxisKind, index: u32) -> f64 {
        self.layout.size_of(axis, index)
    }

    /// Total content extent along `axis`.
    #[wasm_bindgen]
    pub fn total_extent(&self, axis: AxisKind) -> f64 {
        self.layout.axis(axis).total_extent()
    }

    /// Resize a column and re-index the column axis.
    #[wasm_bindgen]
    pub fn set_col_width(&mut self, col: u32, width: u32) -> Result<(), JsValue> {
        self.layout.set_col_width(col, width).map_err(js_err)
    }

    /// Resize a row and re-index the row axis.
    #[wasm_bindgen]
    pub fn set_row_height(&mut self, row: u32, height: u32) -> Result<(), JsValue> {
        self.layout.set_row_height(row, height).map_err(js_err)
    }

    /// Change the number of rows and columns.
    #[wasm_bindgen]
    pub fn set_dimensions(&mut self, rows: u32, cols: u32) -> Result<(), JsValue> {
        self.layout.set_dimensions(rows, cols).map_err(js_err)?;
        self.selection = None;
        Ok(())
    }

    /// Advance host-pumped indexers. Returns the number of chunks processed.
    ///
    /// A no-op when indexing runs on threads.
    #[wasm_bindgen]
    pub fn pump_indexers(&self, max_chunks: u32) -> u32 {
        let steps = self.pump(usize::try_from(max_chunks).unwrap_or(usize::MAX));
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// True once both axes are fully cached.
    #[wasm_bindgen]
    pub fn is_indexed(&self) -> bool {
        self.layout.axis(AxisKind::Row).is_indexed()
            && self.layout.axis(AxisKind::Column).is_indexed()
    }

    /// Header label of a column (`0 → "A"`).
    #[wasm_bindgen]
    pub fn column_label(col: u32) -> String {
        column_label(col)
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

    pub(super) fn view() -> (GridView, Arc<DeferredSpawner>) {
        let sheet = SheetConfig::from_json(
            r#"{"maxRow": 1000, "maxCol": 100000, "rowHeight": {"0": 100}, "colWidth": {"2": 300}}"#,
        )
        .unwrap();
        let queue = Arc::new(DeferredSpawner::new());
        let view = GridView::from_config(
            &sheet,
            GridOptions::default(),
            1050.0,
            530.0,
            Some(Arc::clone(&queue)),
        )
        .unwrap();
        (view, queue)
    }

    #[test]
    fn test_pumping_indexes_both_axes() {
        let (view, queue) = view();
        assert!(!view.is_indexed());
        assert_eq!(queue.pending(), 2);
        while view.pump_indexers(16) > 0 {}
        assert!(view.is_indexed());
        assert_eq!(view.offset(AxisKind::Column, 3), 500.0);
        assert_eq!(view.size(AxisKind::Row, 0), 100.0);
    }

    #[test]
    fn test_window_and_resize() {
        let (mut view, _queue) = view();
        assert_eq!(view.window(AxisKind::Row).count, 18);
        assert!(!view.resize(2050.0, 530.0));
        assert_eq!(view.window(AxisKind::Column).count, 19);
    }

    #[test]
    fn test_edits() {
        let (mut view, _queue) = view();
        view.set_col_width(0, 10).unwrap();
        assert_eq!(view.offset(AxisKind::Column, 1), 10.0);
        view.set_dimensions(10, 10).unwrap();
        assert_eq!(view.total_extent(AxisKind::Column), 1110.0);
        assert_eq!(GridView::column_label(27), "AB");
    }

    #[test]
    fn test_threaded_view() {
        let sheet = SheetConfig::new(5000, 300);
        let view =
            GridView::from_config(&sheet, GridOptions::default(), 800.0, 600.0, None).unwrap();
        assert_eq!(view.pump_indexers(10), 0);
        let rows = view.layout().axis(AxisKind::Row);
        assert!(rows.wait_until_indexed(std::time::Duration::from_secs(30)));
    }
}
