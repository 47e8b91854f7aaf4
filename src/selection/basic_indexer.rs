//! Translation of a [`Selection`] into per-chunk projections.
//!
//! A [`BasicIndexer`] decomposes a selection against a chunk grid into a stream of
//! [`ChunkProjection`]s: for each chunk touched by the selection, the coordinates of
//! the chunk in the grid, the selection within the chunk's local coordinate system,
//! and the selection within the output array. Axes selected by an integer are dropped
//! from the output.

use std::{iter::FusedIterator, num::NonZeroU64};

use itertools::izip;

use crate::array::ArrayIndices;

use super::{
    normalize_index, DimIndices, DimSelection, Selection, SelectionError, Slice, SliceIndices,
};

/// The projection of a selection onto a single axis of a single chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkDimProjection {
    /// The index of the chunk on the axis.
    pub dim_chunk_index: u64,
    /// The selection within the chunk on the axis.
    pub dim_chunk_sel: DimIndices,
    /// The output range `[start, stop)` on the axis, or [`None`] if the axis is
    /// dropped.
    pub dim_out_sel: Option<(u64, u64)>,
}

/// A per-axis indexer over the chunks touched by a slice.
///
/// Chunks are yielded in the order of the slice's arithmetic progression: ascending
/// chunk index for a positive step, descending for a negative step. Chunks holding no
/// progression point are skipped.
#[derive(Clone, Debug)]
pub struct SliceDimIndexer {
    chunk_len: i64,
    indices: SliceIndices,
}

impl SliceDimIndexer {
    /// Create a new slice indexer for an axis of length `dim_len` chunked by
    /// `chunk_len`.
    ///
    /// # Errors
    /// Returns a [`SelectionError`] if the slice cannot be normalized.
    pub fn new(slice: &Slice, dim_len: u64, chunk_len: NonZeroU64) -> Result<Self, SelectionError> {
        Ok(Self {
            chunk_len: i64::try_from(chunk_len.get()).unwrap(),
            indices: slice.to_indices(dim_len)?,
        })
    }

    /// The number of selected elements on the axis.
    #[must_use]
    pub const fn num_items(&self) -> u64 {
        self.indices.count
    }

    /// Iterate over the per-chunk projections of the axis.
    #[must_use]
    pub fn iter(&self) -> SliceDimProjections {
        SliceDimProjections {
            chunk_len: self.chunk_len,
            indices: self.indices,
            next_item: 0,
        }
    }
}

/// Iterator over the [`ChunkDimProjection`]s of a [`SliceDimIndexer`].
#[derive(Clone, Debug)]
pub struct SliceDimProjections {
    chunk_len: i64,
    indices: SliceIndices,
    next_item: u64,
}

impl Iterator for SliceDimProjections {
    type Item = ChunkDimProjection;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_item >= self.indices.count {
            return None;
        }
        let SliceIndices { start, step, count, .. } = self.indices;

        // First progression point not yet projected, and the chunk holding it.
        let item_first = i64::try_from(self.next_item).unwrap();
        let value_first = start + item_first * step;
        let chunk_index = value_first / self.chunk_len;
        let chunk_begin = chunk_index * self.chunk_len;

        // Last progression point inside the same chunk.
        let item_last = if step > 0 {
            std::cmp::min(
                i64::try_from(count).unwrap() - 1,
                (chunk_begin + self.chunk_len - 1 - start) / step,
            )
        } else {
            std::cmp::min(i64::try_from(count).unwrap() - 1, (start - chunk_begin) / -step)
        };
        let value_last = start + item_last * step;

        let dim_chunk_sel = SliceIndices {
            start: value_first - chunk_begin,
            stop: value_last - chunk_begin + step.signum(),
            step,
            count: u64::try_from(item_last - item_first + 1).unwrap(),
        };
        let dim_out_sel = Some((
            u64::try_from(item_first).unwrap(),
            u64::try_from(item_last + 1).unwrap(),
        ));
        self.next_item = u64::try_from(item_last + 1).unwrap();

        Some(ChunkDimProjection {
            dim_chunk_index: u64::try_from(chunk_index).unwrap(),
            dim_chunk_sel: DimIndices::Slice(dim_chunk_sel),
            dim_out_sel,
        })
    }
}

impl FusedIterator for SliceDimProjections {}

/// A per-axis indexer for an integer selection; the axis is dropped from the output.
#[derive(Clone, Debug)]
pub struct IndexDimIndexer {
    chunk_index: u64,
    local_index: u64,
}

impl IndexDimIndexer {
    /// Create a new integer indexer for an axis of length `dim_len` chunked by
    /// `chunk_len`.
    ///
    /// # Errors
    /// Returns [`SelectionError::OutOfBounds`] if the normalized index does not fall
    /// within the axis.
    pub fn new(index: i64, dim_len: u64, chunk_len: NonZeroU64) -> Result<Self, SelectionError> {
        let index = normalize_index(index, dim_len)?;
        Ok(Self {
            chunk_index: index / chunk_len,
            local_index: index % chunk_len,
        })
    }

    fn projection(&self) -> ChunkDimProjection {
        ChunkDimProjection {
            dim_chunk_index: self.chunk_index,
            dim_chunk_sel: DimIndices::Index(self.local_index),
            dim_out_sel: None,
        }
    }
}

#[derive(Clone, Debug)]
enum DimIndexer {
    Slice(SliceDimIndexer),
    Index(IndexDimIndexer),
}

impl DimIndexer {
    fn projections(&self) -> Vec<ChunkDimProjection> {
        match self {
            Self::Slice(indexer) => indexer.iter().collect(),
            Self::Index(indexer) => vec![indexer.projection()],
        }
    }
}

/// The projection of a selection onto a single chunk.
///
/// The number of elements implied by `chunk_sel` equals the number implied by
/// `out_sel`; over a full [`BasicIndexer`] stream the `out_sel` ranges exactly tile
/// the output with no overlap and no gaps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkProjection {
    /// The coordinates of the chunk in the chunk grid.
    pub chunk_indices: ArrayIndices,
    /// The per-axis selection in the chunk's local coordinate system.
    pub chunk_sel: Vec<DimIndices>,
    /// The per-axis output ranges; dropped axes are excluded and steps are always 1.
    pub out_sel: Vec<SliceIndices>,
}

/// Translates a [`Selection`] against an array shape and chunk shape into a stream of
/// [`ChunkProjection`]s.
#[derive(Clone, Debug)]
pub struct BasicIndexer {
    dim_indexers: Vec<DimIndexer>,
    out_shape: Vec<u64>,
    drop_axes: Vec<usize>,
}

impl BasicIndexer {
    /// Create a new indexer.
    ///
    /// The selection is normalized to exactly one entry per array dimension by
    /// right-padding with full-axis slices.
    ///
    /// # Errors
    /// Returns a [`SelectionError`] if the selection has more entries than the array
    /// has dimensions, an integer index is out of bounds, or a slice step is zero.
    ///
    /// # Panics
    /// Panics if the length of `chunk_shape` does not match the length of
    /// `array_shape`.
    pub fn new(
        selection: &Selection,
        array_shape: &[u64],
        chunk_shape: &[NonZeroU64],
    ) -> Result<Self, SelectionError> {
        assert_eq!(array_shape.len(), chunk_shape.len());
        let dims = selection.normalize(array_shape.len())?;

        let mut dim_indexers = Vec::with_capacity(dims.len());
        let mut out_shape = Vec::with_capacity(dims.len());
        let mut drop_axes = Vec::new();
        for (axis, (dim, &dim_len, &chunk_len)) in
            izip!(&dims, array_shape, chunk_shape).enumerate()
        {
            match dim {
                DimSelection::Full => {
                    let indexer = SliceDimIndexer::new(&Slice::full(), dim_len, chunk_len)?;
                    out_shape.push(indexer.num_items());
                    dim_indexers.push(DimIndexer::Slice(indexer));
                }
                DimSelection::Slice(slice) => {
                    let indexer = SliceDimIndexer::new(slice, dim_len, chunk_len)?;
                    out_shape.push(indexer.num_items());
                    dim_indexers.push(DimIndexer::Slice(indexer));
                }
                DimSelection::Index(index) => {
                    let indexer = IndexDimIndexer::new(*index, dim_len, chunk_len)?;
                    drop_axes.push(axis);
                    dim_indexers.push(DimIndexer::Index(indexer));
                }
            }
        }

        Ok(Self {
            dim_indexers,
            out_shape,
            drop_axes,
        })
    }

    /// The shape of the output of the selection (dropped axes excluded).
    #[must_use]
    pub fn out_shape(&self) -> &[u64] {
        &self.out_shape
    }

    /// The number of elements selected.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.out_shape.iter().product()
    }

    /// Returns true if the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    /// The axes dropped from the output because an integer was supplied.
    #[must_use]
    pub fn drop_axes(&self) -> &[usize] {
        &self.drop_axes
    }

    /// Iterate over the chunk projections of the selection.
    ///
    /// The stream is the row-major Cartesian product of the per-axis projections
    /// (axis 0 outermost). It is empty whenever any axis selects zero elements.
    #[must_use]
    pub fn iter(&self) -> ChunkProjections {
        let dims: Vec<Vec<ChunkDimProjection>> = self
            .dim_indexers
            .iter()
            .map(DimIndexer::projections)
            .collect();
        let length = dims.iter().map(|dim| dim.len() as u64).product();
        ChunkProjections {
            dims,
            index_front: 0,
            length,
        }
    }
}

impl<'a> IntoIterator for &'a BasicIndexer {
    type Item = ChunkProjection;
    type IntoIter = ChunkProjections;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the [`ChunkProjection`]s of a [`BasicIndexer`].
///
/// See [`BasicIndexer::iter`].
#[derive(Clone, Debug)]
pub struct ChunkProjections {
    dims: Vec<Vec<ChunkDimProjection>>,
    index_front: u64,
    length: u64,
}

impl Iterator for ChunkProjections {
    type Item = ChunkProjection;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index_front >= self.length {
            return None;
        }

        // Unravel the linear counter over the per-axis projection counts, last axis
        // fastest.
        let mut picks = vec![0usize; self.dims.len()];
        let mut remaining = self.index_front;
        for (pick, dim) in izip!(picks.iter_mut().rev(), self.dims.iter().rev()) {
            *pick = usize::try_from(remaining % dim.len() as u64).unwrap();
            remaining /= dim.len() as u64;
        }
        self.index_front += 1;

        let mut chunk_indices = Vec::with_capacity(self.dims.len());
        let mut chunk_sel = Vec::with_capacity(self.dims.len());
        let mut out_sel = Vec::with_capacity(self.dims.len());
        for (dim, &pick) in izip!(&self.dims, &picks) {
            let projection = &dim[pick];
            chunk_indices.push(projection.dim_chunk_index);
            chunk_sel.push(projection.dim_chunk_sel);
            if let Some((start, stop)) = projection.dim_out_sel {
                out_sel.push(SliceIndices {
                    start: i64::try_from(start).unwrap(),
                    stop: i64::try_from(stop).unwrap(),
                    step: 1,
                    count: stop - start,
                });
            }
        }

        Some(ChunkProjection {
            chunk_indices,
            chunk_sel,
            out_sel,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.length - self.index_front).unwrap();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkProjections {}

impl FusedIterator for ChunkProjections {}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_shape(shape: &[u64]) -> Vec<NonZeroU64> {
        shape.iter().map(|&len| NonZeroU64::new(len).unwrap()).collect()
    }

    #[test]
    fn slice_dim_indexer_forward() {
        let indexer = SliceDimIndexer::new(
            &Slice::full(),
            5,
            NonZeroU64::new(2).unwrap(),
        )
        .unwrap();
        assert_eq!(indexer.num_items(), 5);
        let projections: Vec<_> = indexer.iter().collect();
        assert_eq!(projections.len(), 3);
        assert_eq!(projections[0].dim_chunk_index, 0);
        assert_eq!(projections[0].dim_out_sel, Some((0, 2)));
        assert_eq!(projections[1].dim_chunk_index, 1);
        assert_eq!(projections[1].dim_out_sel, Some((2, 4)));
        assert_eq!(projections[2].dim_chunk_index, 2);
        assert_eq!(projections[2].dim_out_sel, Some((4, 5)));
        // the last chunk is partial
        assert_eq!(
            projections[2].dim_chunk_sel,
            DimIndices::Slice(SliceIndices { start: 0, stop: 1, step: 1, count: 1 })
        );
    }

    #[test]
    fn slice_dim_indexer_reverse() {
        let indexer = SliceDimIndexer::new(
            &Slice::with_step(None, None, -1),
            5,
            NonZeroU64::new(2).unwrap(),
        )
        .unwrap();
        let projections: Vec<_> = indexer.iter().collect();
        // chunks are visited in progression order: descending
        assert_eq!(
            projections.iter().map(|p| p.dim_chunk_index).collect::<Vec<_>>(),
            vec![2, 1, 0]
        );
        assert_eq!(projections[0].dim_out_sel, Some((0, 1)));
        assert_eq!(
            projections[0].dim_chunk_sel,
            DimIndices::Slice(SliceIndices { start: 0, stop: -1, step: -1, count: 1 })
        );
        assert_eq!(projections[1].dim_out_sel, Some((1, 3)));
        assert_eq!(
            projections[1].dim_chunk_sel,
            DimIndices::Slice(SliceIndices { start: 1, stop: -1, step: -1, count: 2 })
        );
        assert_eq!(projections[2].dim_out_sel, Some((3, 5)));
    }

    #[test]
    fn slice_dim_indexer_skips_untouched_chunks() {
        let indexer = SliceDimIndexer::new(
            &Slice::with_step(None, None, 4),
            8,
            NonZeroU64::new(2).unwrap(),
        )
        .unwrap();
        let projections: Vec<_> = indexer.iter().collect();
        // elements 0 and 4: chunks 1 and 3 hold no progression point
        assert_eq!(
            projections.iter().map(|p| p.dim_chunk_index).collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn basic_indexer_out_shape() {
        let indexer = BasicIndexer::new(
            &Selection::from(vec![
                DimSelection::Index(0),
                DimSelection::Slice(Slice::with_step(None, None, -1)),
            ]),
            &[2, 3],
            &chunk_shape(&[2, 3]),
        )
        .unwrap();
        assert_eq!(indexer.out_shape(), &[3]);
        assert_eq!(indexer.drop_axes(), &[0]);

        let indexer = BasicIndexer::new(
            &Selection::from(0..0),
            &[2, 3],
            &chunk_shape(&[2, 3]),
        )
        .unwrap();
        assert_eq!(indexer.out_shape(), &[0, 3]);
        assert!(indexer.is_empty());
        assert_eq!(indexer.iter().count(), 0);
    }

    #[test]
    fn basic_indexer_projection_counts_match() {
        let indexer = BasicIndexer::new(
            &Selection::from(vec![
                DimSelection::Slice(Slice::with_step(Some(4), Some(0), -2)),
                DimSelection::Index(1),
                DimSelection::Slice(Slice::new(Some(1), Some(5))),
            ]),
            &[5, 3, 6],
            &chunk_shape(&[2, 2, 2]),
        )
        .unwrap();
        assert_eq!(indexer.out_shape(), &[2, 4]);

        let mut total = 0;
        for projection in indexer.iter() {
            let chunk_count: u64 = projection.chunk_sel.iter().map(DimIndices::count).product();
            let out_count: u64 = projection.out_sel.iter().map(|s| s.count).product();
            assert_eq!(chunk_count, out_count);
            total += out_count;
        }
        assert_eq!(total, indexer.num_elements());
    }

    #[test]
    fn basic_indexer_zero_dimensional() {
        let indexer = BasicIndexer::new(&Selection::all(), &[], &chunk_shape(&[])).unwrap();
        assert_eq!(indexer.out_shape(), &[] as &[u64]);
        assert_eq!(indexer.num_elements(), 1);
        let projections: Vec<_> = indexer.iter().collect();
        assert_eq!(projections.len(), 1);
        assert!(projections[0].chunk_indices.is_empty());
        assert!(projections[0].out_sel.is_empty());
    }

    #[test]
    fn basic_indexer_too_many_indices() {
        assert!(matches!(
            BasicIndexer::new(
                &Selection::from(vec![DimSelection::Index(0), DimSelection::Index(0)]),
                &[4],
                &chunk_shape(&[2]),
            ),
            Err(SelectionError::TooManyIndices(2, 1))
        ));
    }
}
