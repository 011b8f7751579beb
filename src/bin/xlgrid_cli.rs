//! CLI tool for xlgrid - lays out a sheet and reports what a renderer would draw
//!
//! Usage:
//!   xlgrid_cli <sheet.json>                          # 800x600 viewport at the origin
//!   xlgrid_cli <sheet.json> --size 1280x720          # Canvas size, headers included
//!   xlgrid_cli <sheet.json> --scroll 5000,200        # Scroll position
//!   xlgrid_cli <sheet.json> --goto XFD40             # Bring a cell into view
//!   xlgrid_cli <sheet.json> --wait                   # Wait for background indexing
//!   xlgrid_cli <sheet.json> -o report.json           # Write the report to a file
//!
//! Set `RUST_LOG=xlgrid=debug` to watch the indexers.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing_subscriber::EnvFilter;
use xlgrid::cell_ref::parse_cell_ref_strict;
use xlgrid::layout::{GridLayout, ScrollbarGeometry, ThreadSpawner, ViewportWindow};
use xlgrid::types::{AxisKind, GridOptions, SheetConfig};

const USAGE: &str = "Usage: xlgrid_cli <sheet.json> [--size WxH] [--scroll X,Y] [--goto A1] [--wait] [-o output.json]";

/// How long `--wait` blocks for each axis.
const WAIT_TIMEOUT: Duration = Duration::from_secs(60);

struct Args {
    input: String,
    size: (f64, f64),
    scroll: (f64, f64),
    goto: Option<String>,
    wait: bool,
    output: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AxisReport {
    length: u32,
    total_extent: f64,
    indexed: usize,
    window: ViewportWindow,
    /// `[index, offset, size]` for every index in the window
    placements: Vec<(u32, f64, f64)>,
    labels: Vec<String>,
    scrollbar: ScrollbarGeometry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    width: f64,
    height: f64,
    scroll_x: f64,
    scroll_y: f64,
    rows: AxisReport,
    columns: AxisReport,
    elapsed_ms: f64,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn parse_pair(value: &str, sep: char) -> Option<(f64, f64)> {
    let (a, b) = value.split_once(sep)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_args() -> Args {
    let mut args = env::args().skip(1);
    let mut parsed = Args {
        input: String::new(),
        size: (800.0, 600.0),
        scroll: (0.0, 0.0),
        goto: None,
        wait: false,
        output: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--size" => {
                let value = args.next().unwrap_or_default();
                parsed.size = parse_pair(&value, 'x')
                    .unwrap_or_else(|| fail(format!("Invalid --size '{value}', expected WxH")));
            }
            "--scroll" => {
                let value = args.next().unwrap_or_default();
                parsed.scroll = parse_pair(&value, ',')
                    .unwrap_or_else(|| fail(format!("Invalid --scroll '{value}', expected X,Y")));
            }
            "--goto" => parsed.goto = args.next(),
            "--wait" => parsed.wait = true,
            "-o" => parsed.output = args.next(),
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if parsed.input.is_empty() && !arg.starts_with('-') => parsed.input = arg,
            _ => fail(format!("Unexpected argument '{arg}'\n{USAGE}")),
        }
    }
    if parsed.input.is_empty() {
        fail(USAGE);
    }
    parsed
}

fn axis_report(grid: &GridLayout, kind: AxisKind) -> AxisReport {
    let axis = grid.axis(kind);
    let window = grid.visible_window(kind);
    let placements = window
        .indices()
        .map(|i| (i, axis.offset_of(i), axis.size_of(i)))
        .collect();
    let labels = window
        .indices()
        .map(|i| match kind {
            AxisKind::Row => (u64::from(i) + 1).to_string(),
            AxisKind::Column => xlgrid::cell_ref::column_label(i),
        })
        .collect();
    AxisReport {
        length: axis.len(),
        total_extent: axis.total_extent(),
        indexed: axis.indexed_len(),
        window,
        placements,
        labels,
        scrollbar: grid.scrollbar_geometry(kind, grid.area_extent(kind)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    if let Err(e) = run(&args) {
        fail(e);
    }
}

fn run(args: &Args) -> xlgrid::Result<()> {
    let started = Instant::now();
    let sheet = SheetConfig::from_path(&args.input)?;

    let mut grid = GridLayout::new(
        &sheet,
        GridOptions::default(),
        Arc::new(ThreadSpawner),
        args.size.0,
        args.size.1,
    )?;

    grid.set_scroll(args.scroll.0, args.scroll.1);
    if let Some(cell) = &args.goto {
        let (col, row) = parse_cell_ref_strict(cell)?;
        grid.scroll_to_cell(row, col);
    }

    if args.wait {
        for kind in [AxisKind::Row, AxisKind::Column] {
            if !grid.axis(kind).wait_until_indexed(WAIT_TIMEOUT) {
                tracing::warn!(axis = kind.label(), "indexing did not finish in time");
            }
        }
    }

    let (width, height) = grid.size();
    let report = Report {
        width,
        height,
        scroll_x: grid.viewport().scroll_x,
        scroll_y: grid.viewport().scroll_y,
        rows: axis_report(&grid, AxisKind::Row),
        columns: axis_report(&grid, AxisKind::Column),
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("Written: {path}");
        }
        None => writeln!(io::stdout().lock(), "{json}")?,
    }
    Ok(())
}
