//! Array selections.
//!
//! A [`Selection`] describes a hyper-rectangular region of an array with one
//! [`DimSelection`] per axis: a [`Slice`] (with optional start, stop, and step), a single
//! integer (which drops the axis from the result), or the full axis.
//! Semantics match NumPy basic indexing: negative steps iterate in reverse, negative
//! indices count from the end of the axis, and out-of-range slice bounds are clamped
//! rather than rejected.
//!
//! [`basic_indexer`] translates a selection against a chunk grid into per-chunk
//! projections.

pub mod basic_indexer;

use std::ops::Range;

use itertools::izip;
use thiserror::Error;

pub use basic_indexer::{BasicIndexer, ChunkDimProjection, ChunkProjection, ChunkProjections};

/// A slice of an axis.
///
/// Each field is optional; [`None`] means "default". The defaults depend on the sign of
/// the step: with a positive step the slice runs forwards over the whole axis, with a
/// negative step it runs backwards over the whole axis.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Slice {
    /// The first index, or [`None`] for the default.
    pub start: Option<i64>,
    /// The end index (exclusive), or [`None`] for the default.
    pub stop: Option<i64>,
    /// The step, or [`None`] for a step of 1.
    pub step: Option<i64>,
}

impl Slice {
    /// Create a slice from `start` to `stop` with a step of 1.
    #[must_use]
    pub const fn new(start: Option<i64>, stop: Option<i64>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    /// Create a slice from `start` to `stop` with an explicit `step`.
    #[must_use]
    pub const fn with_step(start: Option<i64>, stop: Option<i64>, step: i64) -> Self {
        Self {
            start,
            stop,
            step: Some(step),
        }
    }

    /// Create a slice selecting the full axis.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// Normalize the slice against an axis of length `len`.
    ///
    /// Resolves defaults, adds `len` to negative indices, and clamps out-of-range
    /// bounds to `[0, len]` for a positive step and `[-1, len - 1]` for a negative
    /// step, following the NumPy rules.
    ///
    /// # Errors
    /// Returns [`SelectionError::StepZero`] if the step is zero.
    ///
    /// # Panics
    /// Panics if `len` exceeds [`i64::MAX`].
    pub fn to_indices(&self, len: u64) -> Result<SliceIndices, SelectionError> {
        let len = i64::try_from(len).unwrap();
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(SelectionError::StepZero);
        }

        let (mut start, mut stop) = if step > 0 {
            (self.start.unwrap_or(0), self.stop.unwrap_or(len))
        } else {
            (self.start.unwrap_or(len - 1), self.stop.unwrap_or(-len - 1))
        };

        if start < 0 {
            start += len;
            if start < 0 {
                start = if step < 0 { -1 } else { 0 };
            }
        } else if start >= len {
            start = if step < 0 { len - 1 } else { len };
        }

        if stop < 0 {
            stop += len;
            if stop < 0 {
                stop = if step < 0 { -1 } else { 0 };
            }
        } else if stop >= len {
            stop = if step < 0 { len - 1 } else { len };
        }

        let count = if step > 0 {
            if start < stop {
                (stop - start - 1) / step + 1
            } else {
                0
            }
        } else if stop < start {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };

        Ok(SliceIndices {
            start,
            stop,
            step,
            count: u64::try_from(count).unwrap(),
        })
    }
}

impl From<Range<i64>> for Slice {
    fn from(range: Range<i64>) -> Self {
        Self::new(Some(range.start), Some(range.end))
    }
}

/// Concrete loop indices produced by [`Slice::to_indices`].
///
/// `start` is the first selected index. `stop` is one past the final index in the
/// direction of `step`; for a negative step that runs to the beginning of the axis it
/// is `-1`. The triple is directly usable as a for-loop descriptor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SliceIndices {
    /// The first selected index.
    pub start: i64,
    /// One past the final selected index, in the direction of `step`.
    pub stop: i64,
    /// The step (never zero).
    pub step: i64,
    /// The number of selected indices.
    pub count: u64,
}

/// Normalize an integer index against an axis of length `len`.
///
/// A negative index has `len` added to it.
///
/// # Errors
/// Returns [`SelectionError::OutOfBounds`] if the index does not fall in `[-len, len)`.
///
/// # Panics
/// Panics if `len` exceeds [`i64::MAX`].
pub fn normalize_index(index: i64, len: u64) -> Result<u64, SelectionError> {
    let len_i64 = i64::try_from(len).unwrap();
    let index_norm = if index < 0 { index + len_i64 } else { index };
    if (0..len_i64).contains(&index_norm) {
        Ok(u64::try_from(index_norm).unwrap())
    } else {
        Err(SelectionError::OutOfBounds(index, len))
    }
}

/// The selection of a single axis.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DimSelection {
    /// The full axis.
    Full,
    /// A single index; the axis is dropped from the result.
    Index(i64),
    /// A slice of the axis.
    Slice(Slice),
}

impl From<i64> for DimSelection {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<Slice> for DimSelection {
    fn from(slice: Slice) -> Self {
        Self::Slice(slice)
    }
}

impl From<Range<i64>> for DimSelection {
    fn from(range: Range<i64>) -> Self {
        Self::Slice(range.into())
    }
}

/// A selection of an array: one [`DimSelection`] per axis.
///
/// A selection may have fewer entries than the array has dimensions; the remaining
/// trailing axes are selected in full. A bare integer or a bare [`Slice`] converts into
/// a single-entry selection.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection(Vec<DimSelection>);

impl Selection {
    /// Create a selection from per-axis dimension selections.
    #[must_use]
    pub fn new(dims: Vec<DimSelection>) -> Self {
        Self(dims)
    }

    /// Select the entire array.
    #[must_use]
    pub const fn all() -> Self {
        Self(Vec::new())
    }

    /// The per-axis dimension selections.
    #[must_use]
    pub fn dims(&self) -> &[DimSelection] {
        &self.0
    }

    /// Normalize to exactly `dimensionality` entries by right-padding with
    /// [`DimSelection::Full`].
    ///
    /// # Errors
    /// Returns [`SelectionError::TooManyIndices`] if the selection has more entries
    /// than `dimensionality`.
    pub fn normalize(&self, dimensionality: usize) -> Result<Vec<DimSelection>, SelectionError> {
        if self.0.len() > dimensionality {
            return Err(SelectionError::TooManyIndices(self.0.len(), dimensionality));
        }
        let mut dims = self.0.clone();
        dims.resize(dimensionality, DimSelection::Full);
        Ok(dims)
    }
}

impl From<i64> for Selection {
    fn from(index: i64) -> Self {
        Self(vec![DimSelection::Index(index)])
    }
}

impl From<Slice> for Selection {
    fn from(slice: Slice) -> Self {
        Self(vec![DimSelection::Slice(slice)])
    }
}

impl From<Range<i64>> for Selection {
    fn from(range: Range<i64>) -> Self {
        Self(vec![range.into()])
    }
}

impl From<Vec<DimSelection>> for Selection {
    fn from(dims: Vec<DimSelection>) -> Self {
        Self(dims)
    }
}

impl From<&[DimSelection]> for Selection {
    fn from(dims: &[DimSelection]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[DimSelection; N]> for Selection {
    fn from(dims: [DimSelection; N]) -> Self {
        Self(dims.to_vec())
    }
}

/// A normalized per-axis selection: concrete slice indices or a normalized index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DimIndices {
    /// Concrete slice indices.
    Slice(SliceIndices),
    /// A normalized (non-negative, in-bounds) index.
    Index(u64),
}

impl DimIndices {
    /// The number of elements selected on the axis.
    #[must_use]
    pub const fn count(&self) -> u64 {
        match self {
            Self::Slice(indices) => indices.count,
            Self::Index(_) => 1,
        }
    }
}

impl From<SliceIndices> for DimIndices {
    fn from(indices: SliceIndices) -> Self {
        Self::Slice(indices)
    }
}

/// Returns true if `dims` selects every element of an array with `shape` exactly once
/// in row-major order.
///
/// A dimension is total only if its normalized triple is `(0, len, 1)`; an integer
/// selection is total only on a unit-length axis.
#[must_use]
pub fn is_total_slice(dims: &[DimIndices], shape: &[u64]) -> bool {
    debug_assert_eq!(dims.len(), shape.len());
    izip!(dims, shape).all(|(dim, &len)| match dim {
        DimIndices::Slice(indices) => {
            indices.start == 0 && indices.step == 1 && indices.count == len
        }
        DimIndices::Index(_) => len == 1,
    })
}

/// Returns true if `out_sel` addresses a single contiguous run of an array with
/// `out_shape`.
///
/// This holds when every step is 1 and at most one axis selects a proper sub-range:
/// every axis before it must have unit length and every axis after it must select its
/// full length.
#[must_use]
pub fn is_contiguous_selection(out_sel: &[SliceIndices], out_shape: &[u64]) -> bool {
    debug_assert_eq!(out_sel.len(), out_shape.len());
    if out_sel.iter().any(|indices| indices.step != 1) {
        return false;
    }
    let full =
        |indices: &SliceIndices, len: u64| indices.start == 0 && indices.count == len;
    let Some(first_partial) =
        izip!(out_sel, out_shape).position(|(indices, &len)| !full(indices, len))
    else {
        return true;
    };
    out_shape[..first_partial].iter().all(|&len| len <= 1)
        && izip!(&out_sel[first_partial + 1..], &out_shape[first_partial + 1..])
            .all(|(indices, &len)| full(indices, len))
}

/// A selection error.
#[derive(Copy, Clone, Debug, Error)]
pub enum SelectionError {
    /// An integer index outside the bounds of the axis.
    #[error("index {_0} is out of bounds for axis of length {_1}")]
    OutOfBounds(i64, u64),
    /// A slice step of zero.
    #[error("slice step cannot be zero")]
    StepZero,
    /// More dimension selections than array dimensions.
    #[error("too many indices for array: got {_0}, array is {_1}-dimensional")]
    TooManyIndices(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(start: i64, stop: i64, step: i64, count: u64) -> SliceIndices {
        SliceIndices {
            start,
            stop,
            step,
            count,
        }
    }

    #[test]
    fn slice_to_indices_forward() {
        assert_eq!(
            Slice::full().to_indices(5).unwrap(),
            indices(0, 5, 1, 5)
        );
        assert_eq!(
            Slice::new(Some(1), Some(3)).to_indices(3).unwrap(),
            indices(1, 3, 1, 2)
        );
        assert_eq!(
            Slice::new(Some(-2), None).to_indices(5).unwrap(),
            indices(3, 5, 1, 2)
        );
        assert_eq!(
            Slice::new(None, Some(-1)).to_indices(5).unwrap(),
            indices(0, 4, 1, 4)
        );
        assert_eq!(
            Slice::with_step(None, None, 2).to_indices(5).unwrap(),
            indices(0, 5, 2, 3)
        );
        // out-of-range bounds clamp rather than error
        assert_eq!(
            Slice::new(Some(-10), Some(10)).to_indices(5).unwrap(),
            indices(0, 5, 1, 5)
        );
        assert_eq!(
            Slice::new(Some(5), Some(5)).to_indices(2).unwrap(),
            indices(2, 2, 1, 0)
        );
        assert_eq!(
            Slice::new(Some(0), Some(0)).to_indices(2).unwrap(),
            indices(0, 0, 1, 0)
        );
    }

    #[test]
    fn slice_to_indices_reverse() {
        assert_eq!(
            Slice::with_step(None, None, -1).to_indices(5).unwrap(),
            indices(4, -1, -1, 5)
        );
        assert_eq!(
            Slice::with_step(Some(4), Some(0), -2).to_indices(5).unwrap(),
            indices(4, 0, -2, 2)
        );
        assert_eq!(
            Slice::with_step(None, None, -5).to_indices(2).unwrap(),
            indices(1, -1, -5, 1)
        );
        assert_eq!(
            Slice::with_step(Some(10), Some(-10), -1).to_indices(4).unwrap(),
            indices(3, -1, -1, 4)
        );
        // empty axis
        assert_eq!(
            Slice::with_step(None, None, -1).to_indices(0).unwrap(),
            indices(-1, -1, -1, 0)
        );
    }

    #[test]
    fn slice_step_zero() {
        assert!(matches!(
            Slice::with_step(None, None, 0).to_indices(5),
            Err(SelectionError::StepZero)
        ));
    }

    #[test]
    fn index_normalization() {
        assert_eq!(normalize_index(0, 3).unwrap(), 0);
        assert_eq!(normalize_index(2, 3).unwrap(), 2);
        assert_eq!(normalize_index(-1, 3).unwrap(), 2);
        assert_eq!(normalize_index(-3, 3).unwrap(), 0);
        assert!(normalize_index(3, 3).is_err());
        assert!(normalize_index(-4, 3).is_err());
        assert!(normalize_index(0, 0).is_err());
    }

    #[test]
    fn selection_normalization() {
        let selection = Selection::from(vec![DimSelection::Index(0)]);
        assert_eq!(
            selection.normalize(2).unwrap(),
            vec![DimSelection::Index(0), DimSelection::Full]
        );
        assert!(matches!(
            selection.normalize(0),
            Err(SelectionError::TooManyIndices(1, 0))
        ));
        // the bare integer escape
        assert_eq!(Selection::from(-1), Selection::from(vec![DimSelection::Index(-1)]));
    }

    #[test]
    fn total_slice() {
        let full = |len: u64| {
            DimIndices::Slice(Slice::full().to_indices(len).unwrap())
        };
        assert!(is_total_slice(&[full(2), full(3)], &[2, 3]));
        assert!(is_total_slice(&[], &[]));
        assert!(is_total_slice(&[DimIndices::Index(0)], &[1]));
        assert!(!is_total_slice(&[DimIndices::Index(0)], &[2]));
        assert!(!is_total_slice(
            &[full(2), DimIndices::Slice(Slice::new(Some(0), Some(2)).to_indices(3).unwrap())],
            &[2, 3]
        ));
        assert!(!is_total_slice(
            &[DimIndices::Slice(Slice::with_step(None, None, -1).to_indices(2).unwrap())],
            &[2]
        ));
    }

    #[test]
    fn contiguous_selection() {
        let sel = |start: i64, stop: i64, len: u64| {
            Slice::new(Some(start), Some(stop)).to_indices(len).unwrap()
        };
        assert!(is_contiguous_selection(&[sel(0, 2, 4), sel(0, 3, 3)], &[4, 3]));
        assert!(is_contiguous_selection(&[sel(1, 2, 4), sel(0, 3, 3)], &[4, 3]));
        assert!(is_contiguous_selection(&[sel(0, 4, 4), sel(0, 3, 3)], &[4, 3]));
        assert!(!is_contiguous_selection(&[sel(0, 2, 4), sel(0, 2, 3)], &[4, 3]));
        // a full leading axis of length > 1 followed by a sub-range is not one run
        assert!(!is_contiguous_selection(&[sel(0, 4, 4), sel(0, 2, 3)], &[4, 3]));
        assert!(is_contiguous_selection(&[sel(0, 1, 1), sel(0, 2, 3)], &[1, 3]));
        assert!(!is_contiguous_selection(
            &[Slice::with_step(None, None, 2).to_indices(4).unwrap()],
            &[4]
        ));
        assert!(is_contiguous_selection(&[], &[]));
    }
}
