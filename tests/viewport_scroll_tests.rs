//! Viewport and scroll coordinate tests
//!
//! Tests for verifying scroll position, visible row/column windows,
//! and coordinate transformations through `GridLayout`.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashMap;
use std::sync::Arc;

use xlgrid::layout::{DeferredSpawner, GridLayout, Spawner, Viewport};
use xlgrid::types::{AxisKind, GridOptions, HitTarget, SheetConfig};

/// Create a layout with uniform row/column sizes and no header strips.
///
/// The indexer queue is returned so tests choose how far indexing has got.
fn create_test_layout(
    rows: u32,
    cols: u32,
    row_height: u32,
    col_width: u32,
    width: f64,
    height: f64,
) -> (GridLayout, Arc<DeferredSpawner>) {
    let sheet = SheetConfig {
        default_row_height: row_height,
        default_col_width: col_width,
        default_index_row_height: 0,
        default_index_col_width: 0,
        ..SheetConfig::new(rows, cols)
    };
    create_layout(&sheet, width, height)
}

fn create_layout(
    sheet: &SheetConfig,
    width: f64,
    height: f64,
) -> (GridLayout, Arc<DeferredSpawner>) {
    let spawner = Arc::new(DeferredSpawner::new());
    let options = GridOptions {
        scrollbar_thickness: 0.0,
        ..GridOptions::default()
    };
    let layout = GridLayout::new(
        sheet,
        options,
        Arc::clone(&spawner) as Arc<dyn Spawner>,
        width,
        height,
    )
    .unwrap();
    (layout, spawner)
}

// ============================================================================
// Basic Viewport Tests
// ============================================================================

#[test]
fn test_viewport_default() {
    let viewport = Viewport::default();
    assert_eq!(viewport.scroll_x, 0.0);
    assert_eq!(viewport.scroll_y, 0.0);
    assert_eq!(viewport.width, 800.0);
    assert_eq!(viewport.height, 600.0);
}

#[test]
fn test_viewport_to_screen_and_back() {
    let mut viewport = Viewport::new(800.0, 600.0);
    viewport.set_scroll(100.0, 50.0, 10_000.0, 10_000.0);

    assert_eq!(viewport.to_screen(150.0, 75.0), (50.0, 25.0));
    assert_eq!(viewport.to_sheet(50.0, 25.0), (150.0, 75.0));
}

#[test]
fn test_viewport_set_scroll_reports_delta() {
    let mut viewport = Viewport::new(800.0, 600.0);
    assert_eq!(
        viewport.set_scroll(100.0, 40.0, 10_000.0, 10_000.0),
        Some((100.0, 40.0))
    );
    assert_eq!(viewport.set_scroll(100.0, 40.0, 10_000.0, 10_000.0), None);
}

// ============================================================================
// Visible Window Tests
// ============================================================================

#[test]
fn test_visible_window_at_origin() {
    let (layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);

    let rows = layout.visible_window(AxisKind::Row);
    let cols = layout.visible_window(AxisKind::Column);

    assert_eq!(rows.start_index, 0);
    // 600 / 20 = 30 full rows; the row starting exactly at 600 is included.
    assert_eq!(rows.count, 31);
    assert_eq!(cols.start_index, 0);
    assert_eq!(cols.count, 9);
}

#[test]
fn test_visible_window_after_scroll() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);

    layout.scroll_by(250.0, 410.0);

    let rows = layout.visible_window(AxisKind::Row);
    let cols = layout.visible_window(AxisKind::Column);
    // 410 / 20 = 20.5 → row 20 partially visible
    assert_eq!(rows.start_index, 20);
    assert!(rows.contains(50));
    assert!(!rows.contains(51));
    // 250 / 100 = 2.5 → column 2 partially visible
    assert_eq!(cols.start_index, 2);
    assert_eq!(cols.end_index(), 11);
}

#[test]
fn test_visible_window_never_passes_the_end() {
    let (mut layout, _queue) = create_test_layout(40, 10, 20, 100, 800.0, 600.0);

    layout.scroll_by(1e12, 1e12);

    let rows = layout.visible_window(AxisKind::Row);
    let cols = layout.visible_window(AxisKind::Column);
    assert_eq!(rows.end_index(), 40);
    assert_eq!(cols.end_index(), 10);
    assert_eq!(layout.viewport().scroll_y, 800.0 - 600.0);
    assert_eq!(layout.viewport().scroll_x, 1000.0 - 800.0);
}

#[test]
fn test_window_matches_before_and_after_indexing() {
    let sheet = SheetConfig {
        row_height: HashMap::from([(5, 80), (9_000, 3), (40_000, 500)]),
        col_width: HashMap::from([(1, 10), (700, 1_000)]),
        ..SheetConfig::new(50_000, 1_000)
    };
    let (mut layout, queue) = create_layout(&sheet, 1280.0, 720.0);
    layout.set_scroll(61_234.0, 1_003_421.0);

    let rows_before = layout.visible_window(AxisKind::Row);
    let cols_before = layout.visible_window(AxisKind::Column);
    queue.drain();
    assert!(layout.axis(AxisKind::Row).is_indexed());
    assert_eq!(layout.visible_window(AxisKind::Row), rows_before);
    assert_eq!(layout.visible_window(AxisKind::Column), cols_before);
}

// ============================================================================
// Scroll Clamping Tests
// ============================================================================

#[test]
fn test_negative_scroll_clamps_to_origin() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);

    assert_eq!(layout.scroll_by(-100.0, -100.0), None);
    assert_eq!(layout.viewport().scroll_x, 0.0);
    assert_eq!(layout.viewport().scroll_y, 0.0);
}

#[test]
fn test_nan_scroll_resets_to_origin() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);
    layout.scroll_by(100.0, 100.0);

    layout.set_scroll(f64::NAN, f64::NAN);

    assert_eq!(layout.viewport().scroll_x, 0.0);
    assert_eq!(layout.viewport().scroll_y, 0.0);
}

#[test]
fn test_content_smaller_than_viewport_does_not_scroll() {
    let (mut layout, _queue) = create_test_layout(5, 3, 20, 100, 800.0, 600.0);

    assert_eq!(layout.scroll_by(500.0, 500.0), None);
    assert!(!layout.scrollbar_geometry(AxisKind::Row, 600.0).visible);
    assert!(!layout.scrollbar_geometry(AxisKind::Column, 800.0).visible);
}

#[test]
fn test_shrinking_content_pulls_scroll_back() {
    let (mut layout, _queue) = create_test_layout(1_000, 26, 20, 100, 800.0, 600.0);
    layout.set_scroll(0.0, 15_000.0);

    layout.set_dimensions(100, 26).unwrap();

    assert_eq!(layout.viewport().scroll_y, 2_000.0 - 600.0);
    assert_eq!(layout.visible_window(AxisKind::Row).end_index(), 100);
}

#[test]
fn test_growing_viewport_pulls_scroll_back() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);
    layout.set_scroll(0.0, 1_400.0);

    layout.resize(800.0, 1_000.0);

    assert_eq!(layout.viewport().scroll_y, 1_000.0);
}

// ============================================================================
// Coordinate Transformation Tests
// ============================================================================

#[test]
fn test_screen_rect_follows_scroll_and_headers() {
    let sheet = SheetConfig {
        col_width: HashMap::from([(2, 300)]),
        ..SheetConfig::new(1000, 100)
    };
    let (mut layout, _queue) = create_layout(&sheet, 1050.0, 530.0);

    let rect = layout.screen_rect(1, 3);
    assert_eq!((rect.x, rect.y), (50.0 + 500.0, 30.0 + 25.0));
    assert_eq!((rect.width, rect.height), (100.0, 25.0));

    layout.scroll_by(250.0, 25.0);
    let rect = layout.screen_rect(1, 3);
    assert_eq!((rect.x, rect.y), (50.0 + 250.0, 30.0));
}

#[test]
fn test_hit_test_after_scroll() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 800.0, 600.0);
    layout.scroll_by(150.0, 35.0);

    // Sheet position (150 + 60, 35 + 10) = (210, 45) → row 2, col 2
    assert_eq!(layout.hit_test(60.0, 10.0), HitTarget::Cell { row: 2, col: 2 });
}

#[test]
fn test_scroll_to_cell_minimal_motion() {
    let (mut layout, _queue) = create_test_layout(1_000, 100, 20, 100, 800.0, 600.0);

    // Already visible: nothing moves.
    assert_eq!(layout.scroll_to_cell(10, 3), None);

    // Below the area: bottom edge aligns with the bottom of the area.
    layout.scroll_to_cell(100, 3);
    assert_eq!(layout.viewport().scroll_y, 2_020.0 - 600.0);

    // Above the area: top edge aligns with the top.
    layout.scroll_to_cell(5, 3);
    assert_eq!(layout.viewport().scroll_y, 100.0);

    // Right of the area.
    layout.scroll_to_cell(5, 20);
    assert_eq!(layout.viewport().scroll_x, 2_100.0 - 800.0);
}

#[test]
fn test_visible_cells_cover_window() {
    let (mut layout, _queue) = create_test_layout(100, 26, 20, 100, 400.0, 100.0);
    layout.scroll_by(50.0, 10.0);

    let cells: Vec<_> = layout.visible_cells().collect();
    let rows = layout.visible_window(AxisKind::Row);
    let cols = layout.visible_window(AxisKind::Column);
    assert_eq!(cells.len(), usize::try_from(rows.count * cols.count).unwrap());

    let first = cells[0];
    assert_eq!((first.row, first.col), (0, 0));
    assert_eq!((first.rect.x, first.rect.y), (-50.0, -10.0));
}

// ============================================================================
// Scrollbar Tests
// ============================================================================

#[test]
fn test_thumb_drag_to_end_reaches_last_row() {
    let (mut layout, _queue) = create_test_layout(1_048_576, 16_384, 20, 100, 800.0, 600.0);

    let track = layout.area_extent(AxisKind::Row);
    let bar = layout.scrollbar_geometry(AxisKind::Row, track);
    layout.drag_thumb(AxisKind::Row, track - bar.thumb_extent);

    let total = layout.axis(AxisKind::Row).total_extent();
    assert_eq!(layout.viewport().scroll_y, total - 600.0);
    assert_eq!(layout.visible_window(AxisKind::Row).end_index(), 1_048_576);
}

#[test]
fn test_thumb_tracks_scroll_position() {
    let (mut layout, _queue) = create_test_layout(10_000, 26, 20, 100, 800.0, 600.0);

    assert_eq!(
        layout.scrollbar_geometry(AxisKind::Row, 600.0).thumb_position,
        0.0
    );
    layout.set_scroll(0.0, (200_000.0 - 600.0) / 2.0);
    let bar = layout.scrollbar_geometry(AxisKind::Row, 600.0);
    let travel = 600.0 - bar.thumb_extent;
    assert!((bar.thumb_position - travel / 2.0).abs() < 1e-9);
}
