use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::HeaderConfig;
use crate::error::Result;
use crate::layout::{AxisModel, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_THUMB_EXTENT};

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: u32 = 25;

/// Default column width in pixels
pub const DEFAULT_COL_WIDTH: u32 = 100;

/// Default height of the column header strip
pub const DEFAULT_INDEX_ROW_HEIGHT: u32 = 30;

/// Default width of the row header strip
pub const DEFAULT_INDEX_COL_WIDTH: u32 = 50;

/// Structural configuration of one sheet, as delivered by the host.
///
/// Unknown fields (cell data, styling) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Number of rows
    pub max_row: u32,
    /// Number of columns
    pub max_col: u32,
    #[serde(default = "default_row_height")]
    pub default_row_height: u32,
    #[serde(default = "default_col_width")]
    pub default_col_width: u32,
    /// Manually set row heights, keyed by row index
    #[serde(default)]
    pub row_height: HashMap<u32, u32>,
    /// Manually set column widths, keyed by column index
    #[serde(default)]
    pub col_width: HashMap<u32, u32>,
    /// Height of the column header strip
    #[serde(default = "default_index_row_height")]
    pub default_index_row_height: u32,
    /// Width of the row header strip
    #[serde(default = "default_index_col_width")]
    pub default_index_col_width: u32,
    /// Whether the row and column header strips are drawn
    #[serde(default = "default_show_headers")]
    pub show_headers: bool,
}

fn default_row_height() -> u32 {
    DEFAULT_ROW_HEIGHT
}

fn default_col_width() -> u32 {
    DEFAULT_COL_WIDTH
}

fn default_index_row_height() -> u32 {
    DEFAULT_INDEX_ROW_HEIGHT
}

fn default_index_col_width() -> u32 {
    DEFAULT_INDEX_COL_WIDTH
}

fn default_show_headers() -> bool {
    true
}

impl SheetConfig {
    /// Sheet of `max_row` × `max_col` with default sizes and no overrides.
    pub fn new(max_row: u32, max_col: u32) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            max_row,
            max_col,
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_col_width: DEFAULT_COL_WIDTH,
            row_height: HashMap::new(),
            col_width: HashMap::new(),
            default_index_row_height: DEFAULT_INDEX_ROW_HEIGHT,
            default_index_col_width: DEFAULT_INDEX_COL_WIDTH,
            show_headers: true,
        }
    }

    /// Decode a sheet from JSON.
    ///
    /// # Errors
    /// Returns [`crate::XlgridError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a sheet JSON file.
    ///
    /// # Errors
    /// Returns [`crate::XlgridError::Io`] if the file cannot be read and
    /// [`crate::XlgridError::Config`] if its JSON is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validated row axis model.
    ///
    /// # Errors
    /// Returns an error if a size is zero or an override is out of range.
    pub fn row_model(&self) -> Result<AxisModel> {
        AxisModel::new(
            self.max_row,
            self.default_row_height,
            self.row_height.clone(),
        )
    }

    /// Validated column axis model.
    ///
    /// # Errors
    /// Returns an error if a size is zero or an override is out of range.
    pub fn col_model(&self) -> Result<AxisModel> {
        AxisModel::new(
            self.max_col,
            self.default_col_width,
            self.col_width.clone(),
        )
    }

    /// Header strip dimensions.
    pub fn headers(&self) -> HeaderConfig {
        HeaderConfig {
            visible: self.show_headers,
            row_header_width: f64::from(self.default_index_col_width),
            col_header_height: f64::from(self.default_index_row_height),
        }
    }
}

/// Tuning knobs that are not part of the sheet itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    /// Smallest scrollbar thumb, in track pixels
    pub min_thumb_extent: f64,
    /// Offsets flushed to the cache per indexer chunk
    pub chunk_size: u32,
    /// Thickness of each scrollbar track. Tracks overlay the grid area's far
    /// edges and swallow clicks there.
    pub scrollbar_thickness: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            min_thumb_extent: DEFAULT_MIN_THUMB_EXTENT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            scrollbar_thickness: 12.0,
        }
    }
}
