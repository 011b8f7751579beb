//! Structured error types for xlgrid.
//!
//! Only the configuration layer can fail. Offset and index queries are total
//! over `[0, length)` and never return errors.

/// All errors that can occur while building grid axes from configuration.
#[derive(Debug, thiserror::Error)]
pub enum XlgridError {
    /// The default row height / column width must be a positive pixel count.
    #[error("default size must be greater than zero")]
    InvalidDefaultSize,

    /// A size override refers to an index outside the axis.
    #[error("size override for index {index} is outside axis of length {length}")]
    OverrideOutOfRange {
        /// Offending index.
        index: u32,
        /// Axis length at the time of validation.
        length: u32,
    },

    /// A size override must be a positive pixel count.
    #[error("size override for index {0} must be greater than zero")]
    ZeroOverride(u32),

    /// Offsets along the axis could exceed the exactly representable range.
    #[error("axis extent bound {bound} px exceeds 2^53")]
    ExtentTooLarge {
        /// `length * default + Σ max(0, override - default)`.
        bound: u64,
    },

    /// Invalid cell reference such as `"1A"` or `""`.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// Sheet configuration could not be decoded.
    #[error("Sheet config: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlgridError>;

#[cfg(target_arch = "wasm32")]
impl From<XlgridError> for wasm_bindgen::JsValue {
    fn from(e: XlgridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_index() {
        let err = XlgridError::OverrideOutOfRange {
            index: 12,
            length: 10,
        };
        assert_eq!(
            err.to_string(),
            "size override for index 12 is outside axis of length 10"
        );
        assert_eq!(
            XlgridError::ZeroOverride(3).to_string(),
            "size override for index 3 must be greater than zero"
        );
    }

    #[test]
    fn test_json_errors_convert() {
        let err: XlgridError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, XlgridError::Config(_)));
    }
}
