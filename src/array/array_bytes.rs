//! Byte-level kernels for copying and filling selected regions of flat C-order
//! buffers.
//!
//! A normalized selection pairs each axis with either concrete slice indices or a
//! single index. Walks over two selections with matching per-axis element counts visit
//! source and destination offsets in the same row-major order, so copying between them
//! preserves the selection's iteration order. The innermost axis is coalesced into
//! contiguous runs when both sides are unit-stride.

use itertools::izip;

use crate::selection::DimIndices;

/// Row-major element strides of a shape.
fn row_major_strides(shape: &[u64]) -> Vec<u64> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// A per-axis walk of a normalized selection over a flat buffer: the byte offset of
/// the first selected element and a (count, byte stride) pair per slice axis.
struct SelectionWalk {
    base: i64,
    axes: Vec<(u64, i64)>,
}

fn selection_walk(shape: &[u64], sel: &[DimIndices], element_size: usize) -> SelectionWalk {
    debug_assert_eq!(shape.len(), sel.len());
    let strides = row_major_strides(shape);
    let element_size = i64::try_from(element_size).unwrap();
    let mut base = 0;
    let mut axes = Vec::with_capacity(sel.len());
    for (dim, &stride) in izip!(sel, &strides) {
        let stride = i64::try_from(stride).unwrap() * element_size;
        match dim {
            DimIndices::Index(index) => base += i64::try_from(*index).unwrap() * stride,
            DimIndices::Slice(indices) => {
                base += indices.start * stride;
                axes.push((indices.count, indices.step * stride));
            }
        }
    }
    SelectionWalk { base, axes }
}

/// Walk two selections with matching per-axis counts in row-major order, invoking `f`
/// with (source offset, destination offset, run length in bytes) per contiguous run.
fn for_each_run(
    src: &SelectionWalk,
    dst: &SelectionWalk,
    element_size: usize,
    mut f: impl FnMut(usize, usize, usize),
) {
    debug_assert_eq!(src.axes.len(), dst.axes.len());
    let element_size_i64 = i64::try_from(element_size).unwrap();
    let mut axes: Vec<(u64, i64, i64)> = izip!(&src.axes, &dst.axes)
        .map(|(&(count, src_stride), &(dst_count, dst_stride))| {
            debug_assert_eq!(count, dst_count);
            let _ = dst_count;
            (count, src_stride, dst_stride)
        })
        .collect();

    // Coalesce a unit-stride innermost axis into a single run.
    let run = match axes.last() {
        Some(&(count, src_stride, dst_stride))
            if src_stride == element_size_i64 && dst_stride == element_size_i64 =>
        {
            axes.pop();
            count
        }
        _ => 1,
    };
    if run == 0 {
        return;
    }
    let run_bytes = usize::try_from(run).unwrap() * element_size;

    let iterations: u64 = axes.iter().map(|&(count, _, _)| count).product();
    let mut indices = vec![0u64; axes.len()];
    let mut src_offset = src.base;
    let mut dst_offset = dst.base;
    for _ in 0..iterations {
        f(
            usize::try_from(src_offset).unwrap(),
            usize::try_from(dst_offset).unwrap(),
            run_bytes,
        );
        for (axis, &(count, src_stride, dst_stride)) in axes.iter().enumerate().rev() {
            indices[axis] += 1;
            src_offset += src_stride;
            dst_offset += dst_stride;
            if indices[axis] < count {
                break;
            }
            indices[axis] = 0;
            src_offset -= src_stride * i64::try_from(count).unwrap();
            dst_offset -= dst_stride * i64::try_from(count).unwrap();
        }
    }
}

/// Copy the elements selected by `src_sel` in `src` (a flat C-order buffer with shape
/// `src_shape`) into the elements selected by `dst_sel` in `dst`.
///
/// The two selections must select the same number of elements on each slice axis;
/// elements are paired in row-major selection order.
pub(crate) fn copy_selection(
    src: &[u8],
    src_shape: &[u64],
    src_sel: &[DimIndices],
    dst: &mut [u8],
    dst_shape: &[u64],
    dst_sel: &[DimIndices],
    element_size: usize,
) {
    let src_walk = selection_walk(src_shape, src_sel, element_size);
    let dst_walk = selection_walk(dst_shape, dst_sel, element_size);
    for_each_run(&src_walk, &dst_walk, element_size, |src_offset, dst_offset, len| {
        dst[dst_offset..dst_offset + len].copy_from_slice(&src[src_offset..src_offset + len]);
    });
}

/// Broadcast a single element over the elements selected by `dst_sel` in `dst` (a flat
/// C-order buffer with shape `dst_shape`).
pub(crate) fn fill_selection(
    dst: &mut [u8],
    dst_shape: &[u64],
    dst_sel: &[DimIndices],
    element: &[u8],
) {
    let walk = selection_walk(dst_shape, dst_sel, element.len());
    // reuse the pair walk with the destination on both sides
    for_each_run(&walk, &walk, element.len(), |_, dst_offset, len| {
        for out in dst[dst_offset..dst_offset + len].chunks_exact_mut(element.len()) {
            out.copy_from_slice(element);
        }
    });
}

/// Reverse the endianness of each element of `bytes` in place.
pub(crate) fn reverse_endianness(bytes: &mut [u8], element_size: usize) {
    debug_assert_eq!(bytes.len() % element_size, 0);
    if element_size > 1 {
        bytes
            .chunks_exact_mut(element_size)
            .for_each(<[u8]>::reverse);
    }
}

#[cfg(test)]
mod tests {
    use crate::selection::{DimSelection, Selection, Slice};

    use super::*;

    fn normalized(selection: &Selection, shape: &[u64]) -> Vec<DimIndices> {
        selection
            .normalize(shape.len())
            .unwrap()
            .iter()
            .zip(shape)
            .map(|(dim, &len)| match dim {
                DimSelection::Full => DimIndices::Slice(Slice::full().to_indices(len).unwrap()),
                DimSelection::Slice(slice) => DimIndices::Slice(slice.to_indices(len).unwrap()),
                DimSelection::Index(index) => {
                    DimIndices::Index(crate::selection::normalize_index(*index, len).unwrap())
                }
            })
            .collect()
    }

    #[test]
    fn copy_selection_contiguous() {
        // extract rows 1..3 of a 4x3 array
        let src: Vec<u8> = (0..12).collect();
        let mut dst = vec![0u8; 6];
        let src_sel = normalized(&Selection::from(1..3), &[4, 3]);
        let dst_sel = normalized(&Selection::all(), &[2, 3]);
        copy_selection(&src, &[4, 3], &src_sel, &mut dst, &[2, 3], &dst_sel, 1);
        assert_eq!(dst, vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn copy_selection_strided_reverse() {
        let src: Vec<u8> = (0..5).collect();
        let mut dst = vec![0u8; 5];
        let src_sel = normalized(
            &Selection::from(Slice::with_step(None, None, -1)),
            &[5],
        );
        let dst_sel = normalized(&Selection::all(), &[5]);
        copy_selection(&src, &[5], &src_sel, &mut dst, &[5], &dst_sel, 1);
        assert_eq!(dst, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn copy_selection_drops_axis() {
        // row 1 of a 2x3 array, reversed
        let src: Vec<u8> = (0..6).collect();
        let mut dst = vec![0u8; 3];
        let src_sel = normalized(
            &Selection::from(vec![
                DimSelection::Index(1),
                DimSelection::Slice(Slice::with_step(None, None, -1)),
            ]),
            &[2, 3],
        );
        let dst_sel = normalized(&Selection::all(), &[3]);
        copy_selection(&src, &[2, 3], &src_sel, &mut dst, &[3], &dst_sel, 1);
        assert_eq!(dst, vec![5, 4, 3]);
    }

    #[test]
    fn copy_selection_multibyte() {
        let src: Vec<u8> = (0..8).collect();
        let mut dst = vec![0u8; 4];
        let src_sel = normalized(&Selection::from(Slice::with_step(None, None, -2)), &[4]);
        let dst_sel = normalized(&Selection::all(), &[2]);
        copy_selection(&src, &[4], &src_sel, &mut dst, &[2], &dst_sel, 2);
        assert_eq!(dst, vec![6, 7, 2, 3]);
    }

    #[test]
    fn fill_selection_region() {
        let mut dst = vec![0u8; 12];
        let dst_sel = normalized(
            &Selection::from(vec![
                DimSelection::Slice(Slice::new(Some(1), Some(3))),
                DimSelection::Slice(Slice::new(Some(1), Some(3))),
            ]),
            &[4, 3],
        );
        fill_selection(&mut dst, &[4, 3], &dst_sel, &[7]);
        assert_eq!(dst, vec![0, 0, 0, 0, 7, 7, 0, 7, 7, 0, 0, 0]);
    }

    #[test]
    fn reverse_endianness_in_place() {
        let mut bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        reverse_endianness(&mut bytes, 4);
        assert_eq!(bytes, vec![4, 3, 2, 1, 8, 7, 6, 5]);
        let mut bytes = vec![1, 2];
        reverse_endianness(&mut bytes, 1);
        assert_eq!(bytes, vec![1, 2]);
    }
}
