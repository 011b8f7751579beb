//! Immutable description of one grid axis (rows or columns).
//!
//! An [`AxisModel`] is a single revision: resizing a row/column or changing
//! the extent produces a new model via the `with_*` helpers, and the owning
//! [`Axis`](super::Axis) re-indexes from scratch.

use std::collections::HashMap;

use crate::error::{Result, XlgridError};

/// Largest pixel bound for which every prefix sum is an exact `f64` integer.
pub const MAX_EXACT_EXTENT: u64 = 1 << 53;

/// Length, default size and sparse size overrides of one axis.
///
/// Sizes are whole logical pixels and the axis is bounded by
/// [`MAX_EXACT_EXTENT`], so every prefix sum is exactly representable as
/// `f64` and the analytic resolver and the background indexer agree bit for
/// bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisModel {
    length: u32,
    default_size: u32,
    overrides: HashMap<u32, u32>,
    /// Override keys, sorted ascending. Every algorithm walks this.
    override_indices: Vec<u32>,
}

impl AxisModel {
    /// Create a validated axis model.
    ///
    /// # Errors
    /// Returns an error if `default_size` is zero, if an override is zero
    /// or refers to an index `>= length`, or if the axis is too long to keep
    /// its offsets exact (see [`AxisModel::exact_bound`]).
    pub fn new(length: u32, default_size: u32, overrides: HashMap<u32, u32>) -> Result<Self> {
        if default_size == 0 {
            return Err(XlgridError::InvalidDefaultSize);
        }
        for (&index, &size) in &overrides {
            if index >= length {
                return Err(XlgridError::OverrideOutOfRange { index, length });
            }
            if size == 0 {
                return Err(XlgridError::ZeroOverride(index));
            }
        }
        Self::checked(length, default_size, overrides)
    }

    /// Create an axis where every index has `default_size`.
    ///
    /// # Errors
    /// Returns an error if `default_size` is zero.
    pub fn uniform(length: u32, default_size: u32) -> Result<Self> {
        Self::new(length, default_size, HashMap::new())
    }

    fn checked(length: u32, default_size: u32, overrides: HashMap<u32, u32>) -> Result<Self> {
        let model = Self::from_parts(length, default_size, overrides);
        let bound = model.exact_bound();
        if bound > MAX_EXACT_EXTENT {
            return Err(XlgridError::ExtentTooLarge { bound });
        }
        Ok(model)
    }

    fn from_parts(length: u32, default_size: u32, overrides: HashMap<u32, u32>) -> Self {
        let mut override_indices: Vec<u32> = overrides.keys().copied().collect();
        override_indices.sort_unstable();
        Self {
            length,
            default_size,
            overrides,
            override_indices,
        }
    }

    /// Number of indices along the axis.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// True if the axis has no indices.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Size of every index without an override.
    pub fn default_size(&self) -> u32 {
        self.default_size
    }

    /// The manually set size of `index`, if any.
    pub fn override_size(&self, index: u32) -> Option<u32> {
        self.overrides.get(&index).copied()
    }

    /// All overrides keyed by index.
    pub fn overrides(&self) -> &HashMap<u32, u32> {
        &self.overrides
    }

    /// Overridden indices in ascending order.
    pub fn override_indices(&self) -> &[u32] {
        &self.override_indices
    }

    /// Total pixel extent of the axis: `length * default + Σ(override - default)`.
    pub fn total_extent(&self) -> f64 {
        let default = f64::from(self.default_size);
        let diff: f64 = self
            .override_indices
            .iter()
            .filter_map(|index| self.overrides.get(index))
            .map(|&size| f64::from(size) - default)
            .sum();
        f64::from(self.length) * default + diff
    }

    /// `length * default + Σ max(0, override - default)`, in integer pixels.
    ///
    /// Bounds every prefix sum and every intermediate of the analytic
    /// resolver. While it stays within [`MAX_EXACT_EXTENT`] all offset
    /// arithmetic is exact and the resolver matches the indexer bit for bit.
    pub fn exact_bound(&self) -> u64 {
        let default = u64::from(self.default_size);
        let base = u64::from(self.length).saturating_mul(default);
        self.overrides
            .values()
            .map(|&size| u64::from(size).saturating_sub(default))
            .fold(base, u64::saturating_add)
    }

    /// New revision with `index` resized to `size`.
    ///
    /// # Errors
    /// Returns an error if `index` is out of range, `size` is zero, or the
    /// resized axis would exceed [`MAX_EXACT_EXTENT`].
    pub fn with_size(&self, index: u32, size: u32) -> Result<Self> {
        if index >= self.length {
            return Err(XlgridError::OverrideOutOfRange {
                index,
                length: self.length,
            });
        }
        if size == 0 {
            return Err(XlgridError::ZeroOverride(index));
        }
        let mut overrides = self.overrides.clone();
        overrides.insert(index, size);
        Self::checked(self.length, self.default_size, overrides)
    }

    /// New revision with the override on `index` removed (back to default size).
    pub fn without_override(&self, index: u32) -> Self {
        let mut overrides = self.overrides.clone();
        overrides.remove(&index);
        Self::from_parts(self.length, self.default_size, overrides)
    }

    /// New revision with a different extent. Overrides past the new end are dropped.
    ///
    /// # Errors
    /// Returns an error if the new extent would exceed [`MAX_EXACT_EXTENT`].
    pub fn with_length(&self, length: u32) -> Result<Self> {
        let overrides = self
            .overrides
            .iter()
            .filter(|&(&index, _)| index < length)
            .map(|(&index, &size)| (index, size))
            .collect();
        Self::checked(length, self.default_size, overrides)
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

    #[test]
    fn test_override_indices_are_sorted() {
        let overrides = HashMap::from([(9, 10), (2, 300), (5, 40)]);
        let model = AxisModel::new(10, 100, overrides).unwrap();
        assert_eq!(model.override_indices(), &[2, 5, 9]);
        assert_eq!(model.override_size(5), Some(40));
        assert_eq!(model.override_size(4), None);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            AxisModel::uniform(10, 0),
            Err(XlgridError::InvalidDefaultSize)
        ));
        assert!(matches!(
            AxisModel::new(10, 20, HashMap::from([(10, 5)])),
            Err(XlgridError::OverrideOutOfRange {
                index: 10,
                length: 10
            })
        ));
        assert!(matches!(
            AxisModel::new(10, 20, HashMap::from([(3, 0)])),
            Err(XlgridError::ZeroOverride(3))
        ));
    }

    #[test]
    fn test_total_extent() {
        let model = AxisModel::new(100_000, 100, HashMap::from([(2, 300)])).unwrap();
        assert_eq!(model.total_extent(), 100_000.0 * 100.0 + 200.0);

        let empty = AxisModel::uniform(0, 25).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.total_extent(), 0.0);
    }

    #[test]
    fn test_revisions_do_not_touch_the_original() {
        let base = AxisModel::uniform(10, 20).unwrap();
        let resized = base.with_size(4, 80).unwrap();
        assert_eq!(base.override_size(4), None);
        assert_eq!(resized.override_size(4), Some(80));
        assert_eq!(resized.total_extent(), 260.0);

        let reset = resized.without_override(4);
        assert_eq!(reset, base);

        assert!(base.with_size(10, 5).is_err());
        assert!(base.with_size(1, 0).is_err());
    }

    #[test]
    fn test_with_length_drops_trailing_overrides() {
        let model = AxisModel::new(10, 20, HashMap::from([(1, 30), (8, 40)])).unwrap();
        let shrunk = model.with_length(5).unwrap();
        assert_eq!(shrunk.length(), 5);
        assert_eq!(shrunk.override_indices(), &[1]);
        let grown = model.with_length(50).unwrap();
        assert_eq!(grown.override_indices(), &[1, 8]);
    }

    #[test]
    fn test_extent_limited_to_exact_f64() {
        // 2^22 rows of 2^31 px reach 2^53 exactly.
        let at_limit = AxisModel::uniform(1 << 22, 1 << 31).unwrap();
        assert_eq!(at_limit.exact_bound(), MAX_EXACT_EXTENT);
        assert_eq!(at_limit.total_extent(), 9_007_199_254_740_992.0);

        assert!(matches!(
            at_limit.with_size(0, (1 << 31) + 1),
            Err(XlgridError::ExtentTooLarge { .. })
        ));
        assert!(matches!(
            at_limit.with_length((1 << 22) + 1),
            Err(XlgridError::ExtentTooLarge { .. })
        ));
        assert!(at_limit.with_size(0, 1).is_ok());

        // Shrinking overrides do not help: index * default is already inexact.
        assert!(matches!(
            AxisModel::new(3_000_000, u32::MAX, HashMap::from([(1, 3)])),
            Err(XlgridError::ExtentTooLarge { .. })
        ));
    }
}
