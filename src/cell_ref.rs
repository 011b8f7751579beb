//! A1-style cell references and column header labels.

use crate::error::{Result, XlgridError};

/// Header label of a 0-based column: `0 → "A"`, `25 → "Z"`, `26 → "AA"`.
pub fn column_label(col: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(col) + 1; // Convert to 1-based
    while n > 0 {
        n -= 1;
        // n % 26 < 26 fits in u8
        #[allow(clippy::cast_possible_truncation)]
        let c = char::from(b'A' + (n % 26) as u8);
        result.insert(0, c);
        n /= 26;
    }
    result
}

/// Label of a cell, e.g. `(row 11, col 1) → "B12"`.
pub fn cell_label(row: u32, col: u32) -> String {
    format!("{}{}", column_label(col), u64::from(row) + 1)
}

/// Parse a cell reference like "B12" or "$B$12" into 0-based `(col, row)`.
///
/// Letters must come before digits. Returns `None` for malformed input,
/// row 0, or coordinates that overflow `u32`.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for b in cell_ref.trim().bytes() {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
            col = col.checked_mul(26)?.checked_add(digit)?;
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((col - 1, row - 1))
}

/// [`parse_cell_ref`], reporting malformed input as an error.
///
/// # Errors
/// Returns [`XlgridError::CellRef`] if the reference cannot be parsed.
pub fn parse_cell_ref_strict(cell_ref: &str) -> Result<(u32, u32)> {
    parse_cell_ref(cell_ref).ok_or_else(|| XlgridError::CellRef(cell_ref.to_string()))
}

/// Parse a range like "A1:B10" (or a single cell) into
/// `(start_row, start_col, end_row, end_col)`.
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    if let Some((start, end)) = range.split_once(':') {
        let (start_col, start_row) = parse_cell_ref(start)?;
        let (end_col, end_row) = parse_cell_ref(end)?;
        Some((start_row, start_col, end_row, end_col))
    } else {
        let (start_col, start_row) = parse_cell_ref(range)?;
        Some((start_row, start_col, start_row, start_col))
    }
}
