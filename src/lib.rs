//! xlgrid - axis offset index for virtualized spreadsheet grids
//!
//! Maps row/column indices to pixel offsets and back for sheets with huge
//! extents and sparse size overrides:
//! - O(k) analytic offsets from a sparse override map
//! - Background prefix-sum indexing, generation-gated against stale results
//! - Scroll offset → index lookup, visible windows, scrollbar thumb math
//! - Hit testing and click selection for header/cell regions
//!
//! # Usage (Rust)
//!
//! ```
//! use std::sync::Arc;
//! use xlgrid::layout::{GridLayout, ThreadSpawner};
//! use xlgrid::types::{AxisKind, GridOptions, SheetConfig};
//!
//! let sheet = SheetConfig::from_json(r#"{"maxRow": 1000, "maxCol": 100000, "colWidth": {"2": 300}}"#)?;
//! let mut grid = GridLayout::new(&sheet, GridOptions::default(), Arc::new(ThreadSpawner), 1050.0, 530.0)?;
//! grid.scroll_by(250.0, 0.0);
//! assert_eq!(grid.visible_window(AxisKind::Column).start_index, 2);
//! assert_eq!(grid.offset(AxisKind::Column, 3), 500.0);
//! # Ok::<(), xlgrid::XlgridError>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView, AxisKind } from 'xlgrid';
//! await init();
//! const view = new GridView(JSON.stringify(sheet), canvas.width, canvas.height);
//! view.scroll(event.deltaX, event.deltaY);
//! const rows = view.viewport_window(AxisKind.Row);
//! requestIdleCallback(() => view.pump_indexers(8));
//! ```

pub mod cell_ref;
pub mod error;
pub mod layout;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{Result, XlgridError};
pub use viewer::GridView;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
