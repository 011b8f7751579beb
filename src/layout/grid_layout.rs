//! Both axes of a sheet plus headers and the scroll viewport.
//!
//! [`GridLayout`] is what a renderer talks to: visible windows per axis,
//! offsets and sizes of visible indices, scrollbar geometry, and pointer
//! hit testing. Structural edits (resizing a row or column, changing the
//! extent) produce a new [`AxisModel`] revision and re-index that axis.

use std::sync::Arc;

use super::indexer::Spawner;
use super::scrollbar::{ScrollbarGeometry, ScrollbarMapper};
use super::viewport::Viewport;
use super::window::ViewportWindow;
use super::{Axis, AxisModel};
use crate::error::Result;
use crate::types::{AxisKind, GridOptions, HeaderConfig, HitTarget, Selection, SheetConfig};

/// Rectangle of a cell, in sheet or screen coordinates depending on the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    /// Width of the cell
    pub width: f64,
    /// Height of the cell
    pub height: f64,
}

/// A cell the renderer should draw, positioned on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleCell {
    pub row: u32,
    pub col: u32,
    /// Screen rectangle, header strips included in the coordinate space.
    pub rect: CellRect,
}

/// Layout of one sheet: row and column axes, headers, viewport.
#[derive(Debug)]
pub struct GridLayout {
    rows: Axis,
    cols: Axis,
    headers: HeaderConfig,
    options: GridOptions,
    /// Full canvas size, headers included.
    width: f64,
    height: f64,
    /// Scrollable grid area, headers excluded.
    viewport: Viewport,
}

impl GridLayout {
    /// Build the layout for `sheet` on a `width` × `height` canvas and start
    /// indexing both axes on `spawner`.
    ///
    /// # Errors
    /// Returns an error if the sheet's sizes or overrides are invalid.
    pub fn new(
        sheet: &SheetConfig,
        options: GridOptions,
        spawner: Arc<dyn Spawner>,
        width: f64,
        height: f64,
    ) -> Result<Self> {
        let rows = Axis::new(
            AxisKind::Row,
            sheet.row_model()?,
            Arc::clone(&spawner),
            options.chunk_size,
        );
        let cols = Axis::new(
            AxisKind::Column,
            sheet.col_model()?,
            spawner,
            options.chunk_size,
        );
        let headers = sheet.headers();
        let mut layout = Self {
            rows,
            cols,
            headers,
            options,
            width: 0.0,
            height: 0.0,
            viewport: Viewport::new(0.0, 0.0),
        };
        layout.resize(width, height);
        Ok(layout)
    }

    /// Axis of the given kind.
    pub fn axis(&self, kind: AxisKind) -> &Axis {
        match kind {
            AxisKind::Row => &self.rows,
            AxisKind::Column => &self.cols,
        }
    }

    fn axis_mut(&mut self, kind: AxisKind) -> &mut Axis {
        match kind {
            AxisKind::Row => &mut self.rows,
            AxisKind::Column => &mut self.cols,
        }
    }

    /// Header strip configuration.
    pub fn headers(&self) -> &HeaderConfig {
        &self.headers
    }

    /// Show or hide the header strips. The grid area grows or shrinks to match.
    pub fn set_headers_visible(&mut self, visible: bool) -> Option<(f64, f64)> {
        self.headers.visible = visible;
        self.resize(self.width, self.height)
    }

    /// Tuning options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Current scroll position and grid area.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Full canvas size, headers included.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Scroll offset along `kind`.
    pub fn scroll_offset(&self, kind: AxisKind) -> f64 {
        match kind {
            AxisKind::Row => self.viewport.scroll_y,
            AxisKind::Column => self.viewport.scroll_x,
        }
    }

    /// Extent of the scrollable grid area along `kind`.
    pub fn area_extent(&self, kind: AxisKind) -> f64 {
        match kind {
            AxisKind::Row => self.viewport.height,
            AxisKind::Column => self.viewport.width,
        }
    }

    fn content_size(&self) -> (f64, f64) {
        (self.cols.total_extent(), self.rows.total_extent())
    }

    /// Resize the canvas. The grid area is the canvas minus the header strips.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<(f64, f64)> {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.viewport.resize(
            self.width - self.headers.width(),
            self.height - self.headers.height(),
        );
        self.reclamp()
    }

    /// Scroll by a wheel delta, clamped to the content.
    ///
    /// Returns the applied delta, or `None` if nothing moved.
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64) -> Option<(f64, f64)> {
        let (content_w, content_h) = self.content_size();
        self.viewport.scroll_by(delta_x, delta_y, content_w, content_h)
    }

    /// Scroll to an absolute position, clamped to the content.
    pub fn set_scroll(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (content_w, content_h) = self.content_size();
        self.viewport.set_scroll(x, y, content_w, content_h)
    }

    /// Pull the scroll position back into range after the content shrank.
    pub fn reclamp(&mut self) -> Option<(f64, f64)> {
        self.set_scroll(self.viewport.scroll_x, self.viewport.scroll_y)
    }

    /// Indices of `kind` covering `[scroll_offset, scroll_offset + viewport_extent)`.
    pub fn viewport_window(
        &self,
        kind: AxisKind,
        scroll_offset: f64,
        viewport_extent: f64,
    ) -> ViewportWindow {
        self.axis(kind).window(scroll_offset, viewport_extent)
    }

    /// Window of `kind` at the current scroll position and grid area.
    pub fn visible_window(&self, kind: AxisKind) -> ViewportWindow {
        self.viewport_window(kind, self.scroll_offset(kind), self.area_extent(kind))
    }

    /// Sheet-space offset of `index` along `kind`.
    pub fn offset(&self, kind: AxisKind, index: u32) -> f64 {
        self.axis(kind).offset_of(index)
    }

    /// Size of `index` along `kind`.
    pub fn size_of(&self, kind: AxisKind, index: u32) -> f64 {
        self.axis(kind).size_of(index)
    }

    fn scrollbar_mapper(&self, kind: AxisKind, viewport_extent: f64) -> Option<ScrollbarMapper> {
        ScrollbarMapper::new(
            self.axis(kind).total_extent(),
            viewport_extent,
            self.options.min_thumb_extent,
        )
    }

    /// Scrollbar geometry of `kind` for a track as long as `viewport_extent`,
    /// at the current scroll offset.
    pub fn scrollbar_geometry(&self, kind: AxisKind, viewport_extent: f64) -> ScrollbarGeometry {
        self.scrollbar_mapper(kind, viewport_extent)
            .map_or(ScrollbarGeometry::HIDDEN, |mapper| {
                mapper.geometry(self.scroll_offset(kind))
            })
    }

    /// Scroll offset a thumb drag to `thumb_position` maps to. Pure; see
    /// [`GridLayout::drag_thumb`] to apply it.
    pub fn on_thumb_drag(&self, kind: AxisKind, thumb_position: f64, viewport_extent: f64) -> f64 {
        self.scrollbar_mapper(kind, viewport_extent)
            .map_or(0.0, |mapper| mapper.scroll_offset_for_thumb(thumb_position))
    }

    /// Apply a thumb drag on `kind` against the current grid area.
    pub fn drag_thumb(&mut self, kind: AxisKind, thumb_position: f64) -> Option<(f64, f64)> {
        let offset = self.on_thumb_drag(kind, thumb_position, self.area_extent(kind));
        match kind {
            AxisKind::Row => self.set_scroll(self.viewport.scroll_x, offset),
            AxisKind::Column => self.set_scroll(offset, self.viewport.scroll_y),
        }
    }

    /// Set the width of `col` and re-index the column axis.
    ///
    /// # Errors
    /// Returns an error if `col` is out of range or `width` is zero.
    pub fn set_col_width(&mut self, col: u32, width: u32) -> Result<()> {
        self.resize_index(AxisKind::Column, col, width)
    }

    /// Set the height of `row` and re-index the row axis.
    ///
    /// # Errors
    /// Returns an error if `row` is out of range or `height` is zero.
    pub fn set_row_height(&mut self, row: u32, height: u32) -> Result<()> {
        self.resize_index(AxisKind::Row, row, height)
    }

    fn resize_index(&mut self, kind: AxisKind, index: u32, size: u32) -> Result<()> {
        let model = self.axis(kind).model().with_size(index, size)?;
        tracing::debug!(axis = kind.label(), index, size, "resizing");
        self.axis_mut(kind).set_model(model);
        self.reclamp();
        Ok(())
    }

    /// Restore the default size of `index` along `kind`.
    pub fn reset_size(&mut self, kind: AxisKind, index: u32) {
        let model = self.axis(kind).model().without_override(index);
        self.axis_mut(kind).set_model(model);
        self.reclamp();
    }

    /// Change the sheet extent. Overrides past the new ends are dropped.
    ///
    /// # Errors
    /// Returns an error if either axis would grow past the exact offset range.
    /// Neither axis changes in that case.
    pub fn set_dimensions(&mut self, row_count: u32, col_count: u32) -> Result<()> {
        tracing::debug!(rows = row_count, cols = col_count, "changing sheet extent");
        let rows = (row_count != self.rows.len())
            .then(|| self.rows.model().with_length(row_count))
            .transpose()?;
        let cols = (col_count != self.cols.len())
            .then(|| self.cols.model().with_length(col_count))
            .transpose()?;
        if let Some(model) = rows {
            self.rows.set_model(model);
        }
        if let Some(model) = cols {
            self.cols.set_model(model);
        }
        self.reclamp();
        Ok(())
    }

    /// Replace an axis model wholesale.
    pub fn set_model(&mut self, kind: AxisKind, model: AxisModel) {
        self.axis_mut(kind).set_model(model);
        self.reclamp();
    }

    /// Sheet-space rectangle of a cell.
    pub fn cell_rect(&self, row: u32, col: u32) -> CellRect {
        CellRect {
            x: self.cols.offset_of(col),
            y: self.rows.offset_of(row),
            width: self.cols.size_of(col),
            height: self.rows.size_of(row),
        }
    }

    /// Screen-space rectangle of a cell (headers included in the space).
    pub fn screen_rect(&self, row: u32, col: u32) -> CellRect {
        let rect = self.cell_rect(row, col);
        let (x, y) = self.viewport.to_screen(rect.x, rect.y);
        CellRect {
            x: x + self.headers.width(),
            y: y + self.headers.height(),
            ..rect
        }
    }

    /// Scroll the minimum distance that brings the cell fully into view,
    /// preferring its top-left corner when it is larger than the area.
    pub fn scroll_to_cell(&mut self, row: u32, col: u32) -> Option<(f64, f64)> {
        let rect = self.cell_rect(row, col);
        let x = reveal(self.viewport.scroll_x, self.viewport.width, rect.x, rect.width);
        let y = reveal(self.viewport.scroll_y, self.viewport.height, rect.y, rect.height);
        self.set_scroll(x, y)
    }

    /// Cells intersecting the grid area, row-major, with screen rectangles.
    pub fn visible_cells(&self) -> impl Iterator<Item = VisibleCell> + '_ {
        let rows = self.visible_window(AxisKind::Row);
        let cols = self.visible_window(AxisKind::Column);
        rows.indices().flat_map(move |row| {
            cols.indices().map(move |col| VisibleCell {
                row,
                col,
                rect: self.screen_rect(row, col),
            })
        })
    }

    fn in_scrollbar_band(&self, x: f64, y: f64) -> bool {
        let thickness = self.options.scrollbar_thickness;
        if thickness <= 0.0 {
            return false;
        }
        let vertical = self
            .scrollbar_geometry(AxisKind::Row, self.viewport.height)
            .visible
            && x >= self.width - thickness
            && y >= self.headers.height();
        let horizontal = self
            .scrollbar_geometry(AxisKind::Column, self.viewport.width)
            .visible
            && y >= self.height - thickness
            && x >= self.headers.width();
        vertical || horizontal
    }

    /// What the pointer at canvas position `(x, y)` is over.
    pub fn hit_test(&self, x: f64, y: f64) -> HitTarget {
        if x.is_nan() || y.is_nan() || x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return HitTarget::None;
        }
        if self.in_scrollbar_band(x, y) {
            return HitTarget::None;
        }

        let header_width = self.headers.width();
        let header_height = self.headers.height();
        let in_row_header = x < header_width;
        let in_col_header = y < header_height;
        if in_row_header && in_col_header {
            return HitTarget::CornerHeader;
        }

        let col = sheet_index(&self.cols, self.viewport.scroll_x + x - header_width);
        let row = sheet_index(&self.rows, self.viewport.scroll_y + y - header_height);
        match (in_row_header, in_col_header, row, col) {
            (false, true, _, Some(col)) => HitTarget::ColumnHeader { col },
            (true, false, Some(row), _) => HitTarget::RowHeader { row },
            (false, false, Some(row), Some(col)) => HitTarget::Cell { row, col },
            _ => HitTarget::None,
        }
    }

    /// Selection produced by a click at canvas position `(x, y)`.
    pub fn click(&self, x: f64, y: f64) -> Option<Selection> {
        self.hit_test(x, y).selection(self.rows.len(), self.cols.len())
    }
}

/// Index at sheet position `pos`, or `None` past the end of the content.
fn sheet_index(axis: &Axis, pos: f64) -> Option<u32> {
    if axis.is_empty() || pos >= axis.total_extent() {
        return None;
    }
    Some(axis.index_at(pos))
}

/// Scroll offset that shows `[start, start + size)` in an area of `extent`.
fn reveal(scroll: f64, extent: f64, start: f64, size: f64) -> f64 {
    if start < scroll || size >= extent {
        start
    } else if start + size > scroll + extent {
        start + size - extent
    } else {
        scroll
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
    use crate::layout::DeferredSpawner;
    use std::collections::HashMap;

    fn sheet() -> SheetConfig {
        SheetConfig {
            row_height: HashMap::from([(0, 100)]),
            col_width: HashMap::from([(2, 300)]),
            ..SheetConfig::new(1000, 100_000)
        }
    }

    fn layout() -> GridLayout {
        // 50 px row header + 1000 px grid, 30 px column header + 500 px grid
        GridLayout::new(
            &sheet(),
            GridOptions::default(),
            Arc::new(DeferredSpawner::new()),
            1050.0,
            530.0,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_area_excludes_headers() {
        let layout = layout();
        assert_eq!(layout.area_extent(AxisKind::Column), 1000.0);
        assert_eq!(layout.area_extent(AxisKind::Row), 500.0);
        let rows = layout.visible_window(AxisKind::Row);
        // 0..100, then 25 px rows: row 17 starts at 500
        assert_eq!(rows.start_index, 0);
        assert_eq!(rows.count, 18);
        let cols = layout.visible_window(AxisKind::Column);
        assert_eq!(cols.count, 9);
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut layout = layout();
        assert_eq!(layout.scroll_by(-10.0, -10.0), None);
        layout.scroll_by(1e12, 1e12).unwrap();
        assert_eq!(layout.viewport().scroll_x, 10_000_200.0 - 1000.0);
        assert_eq!(layout.viewport().scroll_y, 25_075.0 - 500.0);
        let window = layout.visible_window(AxisKind::Column);
        assert_eq!(window.end_index(), 100_000);
    }

    #[test]
    fn test_shrinking_content_reclamps() {
        let mut layout = layout();
        layout.set_scroll(5_000_000.0, 0.0);
        layout.set_dimensions(1000, 20).unwrap();
        // 20 columns: 19 * 100 + 300 = 2200
        assert_eq!(layout.viewport().scroll_x, 1200.0);
    }

    #[test]
    fn test_resize_column_updates_offsets() {
        let mut layout = layout();
        layout.set_col_width(0, 40).unwrap();
        assert_eq!(layout.offset(AxisKind::Column, 3), 440.0);
        assert!(layout.set_col_width(100_000, 40).is_err());
        layout.reset_size(AxisKind::Column, 0);
        assert_eq!(layout.offset(AxisKind::Column, 3), 500.0);
        layout.set_row_height(1, 75).unwrap();
        assert_eq!(layout.offset(AxisKind::Row, 2), 175.0);
    }

    #[test]
    fn test_hit_test_regions() {
        let mut layout = layout();
        assert_eq!(layout.hit_test(10.0, 10.0), HitTarget::CornerHeader);
        assert_eq!(
            layout.hit_test(50.0 + 250.0, 10.0),
            HitTarget::ColumnHeader { col: 2 }
        );
        assert_eq!(
            layout.hit_test(10.0, 30.0 + 110.0),
            HitTarget::RowHeader { row: 1 }
        );
        assert_eq!(
            layout.hit_test(50.0 + 500.0, 30.0 + 99.0),
            HitTarget::Cell { row: 0, col: 3 }
        );
        assert_eq!(layout.hit_test(-1.0, 5.0), HitTarget::None);
        // Vertical scrollbar track on the right edge
        assert_eq!(layout.hit_test(1045.0, 200.0), HitTarget::None);

        layout.set_scroll(200.0, 100.0);
        assert_eq!(
            layout.hit_test(50.0 + 10.0, 30.0 + 10.0),
            HitTarget::Cell { row: 1, col: 2 }
        );
    }

    #[test]
    fn test_hit_test_past_content() {
        let small = SheetConfig::new(2, 2);
        let layout = GridLayout::new(
            &small,
            GridOptions::default(),
            Arc::new(DeferredSpawner::new()),
            1050.0,
            530.0,
        )
        .unwrap();
        assert_eq!(
            layout.hit_test(50.0 + 150.0, 30.0 + 10.0),
            HitTarget::Cell { row: 0, col: 1 }
        );
        assert_eq!(layout.hit_test(50.0 + 250.0, 30.0 + 10.0), HitTarget::None);
        assert_eq!(layout.click(50.0 + 250.0, 30.0 + 10.0), None);
        assert_eq!(layout.click(60.0, 40.0), Some(Selection::cell(0, 0)));
    }

    #[test]
    fn test_thumb_drag_round_trip() {
        let mut layout = layout();
        let extent = layout.area_extent(AxisKind::Column);
        let offset = layout.on_thumb_drag(AxisKind::Column, 300.0, extent);
        layout.set_scroll(offset, 0.0);
        let geometry = layout.scrollbar_geometry(AxisKind::Column, extent);
        assert!(geometry.visible);
        assert_eq!(geometry.thumb_extent, 12.0);
        assert!((geometry.thumb_position - 300.0).abs() < 1.0);

        layout.drag_thumb(AxisKind::Row, 1e9).unwrap();
        assert_eq!(layout.viewport().scroll_y, 25_075.0 - 500.0);
    }

    #[test]
    fn test_scroll_to_cell() {
        let mut layout = layout();
        layout.scroll_to_cell(0, 20).unwrap();
        // Column 20 spans 2200..2300; right edge aligned with the area
        assert_eq!(layout.viewport().scroll_x, 1300.0);
        assert_eq!(layout.scroll_to_cell(0, 15), None);
        layout.scroll_to_cell(0, 2).unwrap();
        assert_eq!(layout.viewport().scroll_x, 200.0);
    }

    #[test]
    fn test_visible_cells_positions() {
        let layout = layout();
        let cells: Vec<VisibleCell> = layout.visible_cells().collect();
        assert_eq!(cells.len(), 18 * 9);
        let first = cells.first().unwrap();
        assert_eq!((first.row, first.col), (0, 0));
        assert_eq!(first.rect.x, 50.0);
        assert_eq!(first.rect.y, 30.0);
        assert_eq!(first.rect.height, 100.0);
        let wide = cells.iter().find(|c| c.row == 1 && c.col == 2).unwrap();
        assert_eq!(wide.rect.x, 250.0);
        assert_eq!(wide.rect.y, 130.0);
        assert_eq!(wide.rect.width, 300.0);
    }
}
