//! Example: scroll a 100 000-column sheet while its offsets index in the background
//!
//! Run with: cargo run --example scroll_sheet
//! Add `RUST_LOG=xlgrid=debug` to see indexer generations start and finish.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use xlgrid::cell_ref::column_label;
use xlgrid::layout::{GridLayout, ThreadSpawner};
use xlgrid::types::{AxisKind, GridOptions, SheetConfig};

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
    "defaultIndexColWidth": 50
}"#;

fn print_view(grid: &GridLayout) {
    let rows = grid.visible_window(AxisKind::Row);
    let cols = grid.visible_window(AxisKind::Column);
    let first = column_label(cols.start_index);
    let last = column_label(cols.end_index().saturating_sub(1));
    println!(
        "scroll=({:.0}, {:.0}) rows {}..{} cols {first}..{last} ({} cols cached)",
        grid.viewport().scroll_x,
        grid.viewport().scroll_y,
        rows.start_index + 1,
        rows.end_index(),
        grid.axis(AxisKind::Column).indexed_len(),
    );
}

fn main() -> xlgrid::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sheet = SheetConfig::from_json(SHEET)?;
    let mut grid = GridLayout::new(
        &sheet,
        GridOptions::default(),
        Arc::new(ThreadSpawner),
        1280.0,
        720.0,
    )?;

    // Queries work immediately, before the indexers have caught up.
    print_view(&grid);
    for _ in 0..5 {
        grid.scroll_by(2_000_000.0, 4_000.0);
        print_view(&grid);
    }

    // Widening a column supersedes the running column index.
    grid.set_col_width(1, 400)?;
    grid.drag_thumb(AxisKind::Column, 600.0);
    print_view(&grid);

    if grid
        .axis(AxisKind::Column)
        .wait_until_indexed(Duration::from_secs(10))
    {
        println!("column index complete");
    }
    let bar = grid.scrollbar_geometry(AxisKind::Column, grid.area_extent(AxisKind::Column));
    println!(
        "horizontal thumb: {:.1}px at {:.1}px",
        bar.thumb_extent, bar.thumb_position
    );
    Ok(())
}
