use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Which axis of the grid an operation applies to
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Vertical axis: row heights, vertical scrolling
    Row = 0,
    /// Horizontal axis: column widths, horizontal scrolling
    Column = 1,
}

impl AxisKind {
    /// Short name used in logs and thread names
    pub fn label(self) -> &'static str {
        match self {
            AxisKind::Row => "rows",
            AxisKind::Column => "columns",
        }
    }
}

/// Type of selection for row/column headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionType {
    /// Standard cell selection (default)
    #[default]
    CellRange,
    /// Entire row(s) selected
    RowRange,
    /// Entire column(s) selected
    ColumnRange,
    /// All cells selected (corner click)
    All,
}

/// Selection produced by clicking the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_type: SelectionType,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl Selection {
    /// Single-cell selection
    pub fn cell(row: u32, col: u32) -> Self {
        Self::cell_range(row, col, row, col)
    }

    /// Create a new cell range selection
    pub fn cell_range(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            selection_type: SelectionType::CellRange,
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// Whole rows `start_row..=end_row`, spanning `col_count` columns
    pub fn row_range(start_row: u32, end_row: u32, col_count: u32) -> Self {
        Self {
            selection_type: SelectionType::RowRange,
            start_row,
            start_col: 0,
            end_row,
            end_col: col_count.saturating_sub(1),
        }
    }

    /// Whole columns `start_col..=end_col`, spanning `row_count` rows
    pub fn column_range(start_col: u32, end_col: u32, row_count: u32) -> Self {
        Self {
            selection_type: SelectionType::ColumnRange,
            start_row: 0,
            start_col,
            end_row: row_count.saturating_sub(1),
            end_col,
        }
    }

    /// Every cell of a `row_count` × `col_count` grid
    pub fn all(row_count: u32, col_count: u32) -> Self {
        Self {
            selection_type: SelectionType::All,
            start_row: 0,
            start_col: 0,
            end_row: row_count.saturating_sub(1),
            end_col: col_count.saturating_sub(1),
        }
    }

    /// Get normalized bounds (min/max)
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        (
            self.start_row.min(self.end_row),
            self.start_col.min(self.end_col),
            self.start_row.max(self.end_row),
            self.start_col.max(self.end_col),
        )
    }

    /// True if `(row, col)` lies inside the selection
    pub fn contains(&self, row: u32, col: u32) -> bool {
        let (top, left, bottom, right) = self.bounds();
        (top..=bottom).contains(&row) && (left..=right).contains(&col)
    }
}

/// What a pointer position lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HitTarget {
    /// A regular cell
    Cell { row: u32, col: u32 },
    /// A row header
    RowHeader { row: u32 },
    /// A column header
    ColumnHeader { col: u32 },
    /// The corner header (select all)
    CornerHeader,
    /// Outside any interactive region
    None,
}

impl HitTarget {
    /// Selection a click on this target produces, given the grid size
    pub fn selection(self, row_count: u32, col_count: u32) -> Option<Selection> {
        match self {
            HitTarget::Cell { row, col } => Some(Selection::cell(row, col)),
            HitTarget::RowHeader { row } => Some(Selection::row_range(row, row, col_count)),
            HitTarget::ColumnHeader { col } => Some(Selection::column_range(col, col, row_count)),
            HitTarget::CornerHeader => Some(Selection::all(row_count, col_count)),
            HitTarget::None => None,
        }
    }
}

/// Size of the row and column header strips
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderConfig {
    /// Whether headers are visible
    pub visible: bool,
    /// Width of the row header strip in pixels
    pub row_header_width: f64,
    /// Height of the column header strip in pixels
    pub col_header_height: f64,
}

impl HeaderConfig {
    /// Effective row header width (0 when hidden)
    pub fn width(&self) -> f64 {
        if self.visible {
            self.row_header_width
        } else {
            0.0
        }
    }

    /// Effective column header height (0 when hidden)
    pub fn height(&self) -> f64 {
        if self.visible {
            self.col_header_height
        } else {
            0.0
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            visible: true,
            row_header_width: 50.0,
            col_header_height: 30.0,
        }
    }
}
