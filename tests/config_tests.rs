//! Sheet configuration tests
//!
//! Tests for building a `GridLayout` from sheet JSON: defaults, overrides,
//! header strips, grid options and validation errors.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::sync::Arc;

use test_case::test_case;
use xlgrid::cell_ref::{cell_label, parse_cell_ref_strict};
use xlgrid::layout::{DeferredSpawner, GridLayout, Spawner};
use xlgrid::types::{AxisKind, GridOptions, HitTarget, SheetConfig};
use xlgrid::XlgridError;

const SHEET: &str = r#"{
    "id": "1",
    "name": "Sheet1",
    "maxRow": 1000,
    "maxCol": 100000,
    "rowHeight": {"0": 100},
    "colWidth": {"2": 300},
    "defaultRowHeight": 25,
    "defaultColWidth": 100,
    "defaultIndexRowHeight": 30,
    "defaultIndexColWidth": 50,
    "cells": {"A1": {"value": "ignored"}}
}"#;

fn layout_from_json(json: &str, options: GridOptions) -> xlgrid::Result<GridLayout> {
    let sheet = SheetConfig::from_json(json)?;
    let spawner: Arc<dyn Spawner> = Arc::new(DeferredSpawner::new());
    GridLayout::new(&sheet, options, spawner, 1050.0, 530.0)
}

#[test]
fn test_layout_from_sheet_json() {
    let layout = layout_from_json(SHEET, GridOptions::default()).unwrap();

    assert_eq!(layout.axis(AxisKind::Row).len(), 1000);
    assert_eq!(layout.axis(AxisKind::Column).len(), 100_000);
    assert_eq!(layout.axis(AxisKind::Row).total_extent(), 999.0 * 25.0 + 100.0);
    assert_eq!(
        layout.axis(AxisKind::Column).total_extent(),
        99_999.0 * 100.0 + 300.0
    );
    assert_eq!(layout.offset(AxisKind::Column, 3), 500.0);
    assert_eq!(layout.offset(AxisKind::Row, 2), 125.0);
    assert_eq!(layout.size_of(AxisKind::Column, 2), 300.0);

    // Grid area is the canvas minus the header strips.
    assert_eq!(layout.area_extent(AxisKind::Column), 1000.0);
    assert_eq!(layout.area_extent(AxisKind::Row), 500.0);
}

#[test]
fn test_header_strips_follow_index_sizes() {
    let json = r#"{"maxRow": 10, "maxCol": 10, "defaultIndexRowHeight": 40, "defaultIndexColWidth": 80}"#;
    let layout = layout_from_json(json, GridOptions::default()).unwrap();

    assert_eq!(layout.headers().width(), 80.0);
    assert_eq!(layout.headers().height(), 40.0);
    assert_eq!(layout.hit_test(79.0, 39.0), HitTarget::CornerHeader);
    assert_eq!(layout.hit_test(81.0, 39.0), HitTarget::ColumnHeader { col: 0 });
    assert_eq!(layout.hit_test(79.0, 41.0), HitTarget::RowHeader { row: 0 });
}

#[test]
fn test_hidden_headers_give_the_grid_the_whole_canvas() {
    let json = r#"{"maxRow": 1000, "maxCol": 100, "showHeaders": false}"#;
    let mut layout = layout_from_json(json, GridOptions::default()).unwrap();

    assert_eq!(layout.headers().width(), 0.0);
    assert_eq!(layout.area_extent(AxisKind::Column), 1050.0);
    assert_eq!(layout.area_extent(AxisKind::Row), 530.0);
    assert_eq!(layout.hit_test(10.0, 10.0), HitTarget::Cell { row: 0, col: 0 });
    assert_eq!(layout.screen_rect(0, 1).x, 100.0);

    layout.set_headers_visible(true);
    assert_eq!(layout.area_extent(AxisKind::Column), 1000.0);
    assert_eq!(layout.hit_test(10.0, 10.0), HitTarget::CornerHeader);
    assert_eq!(layout.screen_rect(0, 1).x, 150.0);
}

#[test]
fn test_sheet_from_missing_file_is_io_error() {
    let missing = std::env::temp_dir().join("xlgrid-no-such-sheet.json");
    assert!(matches!(
        SheetConfig::from_path(&missing),
        Err(XlgridError::Io(_))
    ));
}

#[test]
fn test_sheet_from_file() {
    let path = std::env::temp_dir().join(format!("xlgrid-sheet-{}.json", std::process::id()));
    std::fs::write(&path, SHEET).unwrap();
    let sheet = SheetConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(sheet.max_col, 100_000);
    assert!(sheet.show_headers);
}

#[test]
fn test_min_thumb_extent_option() {
    let options = GridOptions {
        min_thumb_extent: 40.0,
        ..GridOptions::default()
    };
    let layout = layout_from_json(SHEET, options).unwrap();

    let bar = layout.scrollbar_geometry(AxisKind::Column, 1000.0);
    assert!(bar.visible);
    assert_eq!(bar.thumb_extent, 40.0);
}

#[test]
fn test_grid_options_from_json() {
    let options: GridOptions =
        serde_json::from_str(r#"{"minThumbExtent": 20, "scrollbarThickness": 8}"#).unwrap();
    assert_eq!(options.min_thumb_extent, 20.0);
    assert_eq!(options.scrollbar_thickness, 8.0);
    assert_eq!(options.chunk_size, GridOptions::default().chunk_size);
}

#[test_case(r#"{"maxRow": 10}"# ; "missing max col")]
#[test_case(r#"{"maxRow": -1, "maxCol": 10}"# ; "negative extent")]
#[test_case("not json" ; "malformed")]
fn test_malformed_sheets_are_config_errors(json: &str) {
    assert!(matches!(
        layout_from_json(json, GridOptions::default()),
        Err(XlgridError::Config(_))
    ));
}

#[test]
fn test_invalid_sizes_are_rejected() {
    let zero_default = r#"{"maxRow": 10, "maxCol": 10, "defaultColWidth": 0}"#;
    assert!(matches!(
        layout_from_json(zero_default, GridOptions::default()),
        Err(XlgridError::InvalidDefaultSize)
    ));

    let zero_override = r#"{"maxRow": 10, "maxCol": 10, "rowHeight": {"4": 0}}"#;
    assert!(matches!(
        layout_from_json(zero_override, GridOptions::default()),
        Err(XlgridError::ZeroOverride(4))
    ));

    let out_of_range = r#"{"maxRow": 10, "maxCol": 10, "colWidth": {"10": 30}}"#;
    assert!(matches!(
        layout_from_json(out_of_range, GridOptions::default()),
        Err(XlgridError::OverrideOutOfRange {
            index: 10,
            length: 10
        })
    ));
}

#[test]
fn test_extent_past_exact_range_is_rejected() {
    let too_long = r#"{"maxRow": 10, "maxCol": 3000000, "defaultColWidth": 4294967295}"#;
    assert!(matches!(
        layout_from_json(too_long, GridOptions::default()),
        Err(XlgridError::ExtentTooLarge { .. })
    ));

    let wide = r#"{"maxRow": 10, "maxCol": 10, "defaultColWidth": 4294967295}"#;
    let mut layout = layout_from_json(wide, GridOptions::default()).unwrap();
    assert!(matches!(
        layout.set_dimensions(20, 3_000_000),
        Err(XlgridError::ExtentTooLarge { .. })
    ));
    // A rejected change leaves both axes alone.
    assert_eq!(layout.axis(AxisKind::Row).len(), 10);
    assert_eq!(layout.axis(AxisKind::Column).len(), 10);
    layout.set_dimensions(20, 1_000).unwrap();
    assert_eq!(layout.axis(AxisKind::Column).len(), 1_000);
}

#[test]
fn test_empty_sheet_has_empty_windows() {
    let layout =
        layout_from_json(r#"{"maxRow": 0, "maxCol": 0}"#, GridOptions::default()).unwrap();

    let rows = layout.visible_window(AxisKind::Row);
    assert_eq!((rows.start_index, rows.count), (0, 0));
    assert_eq!(layout.visible_window(AxisKind::Column).count, 0);
    assert!(!layout.scrollbar_geometry(AxisKind::Row, 500.0).visible);
    assert_eq!(layout.hit_test(200.0, 200.0), HitTarget::None);
}

#[test]
fn test_edits_rebuild_axis_revisions() {
    let mut layout = layout_from_json(SHEET, GridOptions::default()).unwrap();
    let before = layout.axis(AxisKind::Column).generation();

    layout.set_col_width(0, 40).unwrap();
    assert_ne!(layout.axis(AxisKind::Column).generation(), before);
    assert_eq!(layout.offset(AxisKind::Column, 3), 440.0);

    layout.reset_size(AxisKind::Column, 2);
    assert_eq!(layout.offset(AxisKind::Column, 3), 240.0);

    assert!(layout.set_row_height(5_000, 10).is_err());
    assert!(layout.set_row_height(3, 0).is_err());
}

#[test_case("A1", 0, 0 ; "origin")]
#[test_case("XFD1048576", 1_048_575, 16_383 ; "last excel cell")]
#[test_case("$C$7", 6, 2 ; "absolute")]
fn test_goto_references(reference: &str, row: u32, col: u32) {
    let (parsed_col, parsed_row) = parse_cell_ref_strict(reference).unwrap();
    assert_eq!((parsed_row, parsed_col), (row, col));
    assert_eq!(cell_label(row, col), reference.replace('$', ""));
}

#[test]
fn test_bad_goto_reference() {
    let err = parse_cell_ref_strict("12B").unwrap_err();
    assert_eq!(err.to_string(), "Invalid cell reference: 12B");
}
