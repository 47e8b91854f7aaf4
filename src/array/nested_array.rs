//! In-memory n-dimensional arrays.

use std::num::NonZeroU64;

use crate::selection::{BasicIndexer, DimIndices, Selection, SliceIndices};

use super::{
    array_bytes::{copy_selection, fill_selection},
    convert_from_bytes_slice, transmute_to_bytes, transmute_to_bytes_vec, ArrayError, ArrayShape,
    DataType, FillValue,
};

/// An n-dimensional array value: an element type, a shape, and one contiguous
/// little-endian C-order element buffer.
///
/// `NestedArray` is the interchange type of array store and retrieve operations. It
/// supports reading ([`get`](NestedArray::get)) and writing
/// ([`set`](NestedArray::set), [`set_scalar`](NestedArray::set_scalar)) regions
/// described by a [`Selection`], with the same NumPy basic-indexing semantics as
/// [`Array`](crate::array::Array) operations. Integer selections drop axes, so a
/// selection fixing every axis yields a 0-dimensional array; its value is accessed
/// with [`scalar`](NestedArray::scalar).
///
/// The buffer length always equals the product of the shape times the element size.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NestedArray {
    data_type: DataType,
    shape: ArrayShape,
    bytes: Vec<u8>,
}

impl NestedArray {
    /// Create a zero-initialised array.
    ///
    /// # Panics
    /// Panics if the number of bytes exceeds [`usize::MAX`].
    #[must_use]
    pub fn new_empty(data_type: DataType, shape: ArrayShape) -> Self {
        let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
        Self {
            data_type,
            shape,
            bytes: vec![0; num_elements * data_type.size()],
        }
    }

    /// Create an array filled with `fill_value`.
    ///
    /// # Panics
    /// Panics if the size of `fill_value` does not match the data type size or the
    /// number of bytes exceeds [`usize::MAX`].
    #[must_use]
    pub fn new_fill_value(data_type: DataType, shape: ArrayShape, fill_value: &FillValue) -> Self {
        assert_eq!(fill_value.size(), data_type.size());
        let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
        Self {
            data_type,
            shape,
            bytes: fill_value.as_le_bytes().repeat(num_elements),
        }
    }

    /// Create an array from a flat little-endian C-order byte buffer.
    ///
    /// This is a zero-copy wrapping of `bytes`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidBytesInputSize`] if the length of `bytes` does not
    /// equal the product of the shape times the element size.
    pub fn from_bytes(
        data_type: DataType,
        shape: ArrayShape,
        bytes: Vec<u8>,
    ) -> Result<Self, ArrayError> {
        let expected = shape.iter().product::<u64>() * data_type.size() as u64;
        if bytes.len() as u64 == expected {
            Ok(Self {
                data_type,
                shape,
                bytes,
            })
        } else {
            Err(ArrayError::InvalidBytesInputSize(bytes.len(), expected))
        }
    }

    /// Create an array from a flat vector of elements in C order.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size
    /// or the number of elements does not match the shape.
    pub fn from_elements<T: bytemuck::Pod>(
        data_type: DataType,
        shape: ArrayShape,
        elements: Vec<T>,
    ) -> Result<Self, ArrayError> {
        if core::mem::size_of::<T>() != data_type.size() {
            return Err(ArrayError::IncompatibleElementType);
        }
        Self::from_bytes(data_type, shape, transmute_to_bytes_vec(elements))
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Get the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Get the number of elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// The flat little-endian C-order bytes of the array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Flatten into the underlying contiguous byte buffer (row-major).
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The elements of the array as a flat vector in C order.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the size of `T` does not
    /// match the data type size.
    pub fn elements<T: bytemuck::Pod>(&self) -> Result<Vec<T>, ArrayError> {
        if core::mem::size_of::<T>() == self.data_type.size() {
            Ok(convert_from_bytes_slice(&self.bytes))
        } else {
            Err(ArrayError::IncompatibleElementType)
        }
    }

    /// The single element of a 0-dimensional array.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidDataShape`] if the array is not 0-dimensional, or
    /// [`ArrayError::IncompatibleElementType`] if the size of `T` does not match the
    /// data type size.
    pub fn scalar<T: bytemuck::Pod>(&self) -> Result<T, ArrayError> {
        if self.shape.is_empty() {
            Ok(self.elements::<T>()?[0])
        } else {
            Err(ArrayError::InvalidDataShape(self.shape.clone(), vec![]))
        }
    }

    /// An indexer treating the whole array as a single chunk.
    fn indexer(&self, selection: &Selection) -> Result<BasicIndexer, ArrayError> {
        let chunk_shape: Vec<NonZeroU64> = self
            .shape
            .iter()
            .map(|&len| NonZeroU64::new(len.max(1)).unwrap())
            .collect();
        Ok(BasicIndexer::new(selection, &self.shape, &chunk_shape)?)
    }

    /// Return the region of the array described by `selection` as a new array.
    ///
    /// Axes selected with an integer are dropped.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the selection is incompatible with the array
    /// shape.
    pub fn get(&self, selection: &Selection) -> Result<Self, ArrayError> {
        let indexer = self.indexer(selection)?;
        let out_shape = indexer.out_shape().to_vec();
        let num_elements = usize::try_from(indexer.num_elements()).unwrap();
        let mut out_bytes = vec![0; num_elements * self.data_type.size()];
        for projection in indexer.iter() {
            let out_sel = out_sel_dims(&projection.out_sel);
            copy_selection(
                &self.bytes,
                &self.shape,
                &projection.chunk_sel,
                &mut out_bytes,
                &out_shape,
                &out_sel,
                self.data_type.size(),
            );
        }
        Self::from_bytes(self.data_type, out_shape, out_bytes)
    }

    /// Write `value` into the region of the array described by `selection`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the selection is incompatible with the array
    /// shape, or the shape or data type of `value` does not match the selection.
    pub fn set(&mut self, selection: &Selection, value: &Self) -> Result<(), ArrayError> {
        if value.data_type != self.data_type {
            return Err(ArrayError::IncompatibleElementType);
        }
        let indexer = self.indexer(selection)?;
        if value.shape() != indexer.out_shape() {
            return Err(ArrayError::InvalidDataShape(
                value.shape().to_vec(),
                indexer.out_shape().to_vec(),
            ));
        }
        for projection in indexer.iter() {
            let out_sel = out_sel_dims(&projection.out_sel);
            copy_selection(
                &value.bytes,
                &value.shape,
                &out_sel,
                &mut self.bytes,
                &self.shape,
                &projection.chunk_sel,
                self.data_type.size(),
            );
        }
        Ok(())
    }

    /// Broadcast `value` over the region of the array described by `selection`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the selection is incompatible with the array
    /// shape, or the size of `T` does not match the data type size.
    pub fn set_scalar<T: bytemuck::Pod>(
        &mut self,
        selection: &Selection,
        value: T,
    ) -> Result<(), ArrayError> {
        if core::mem::size_of::<T>() != self.data_type.size() {
            return Err(ArrayError::IncompatibleElementType);
        }
        let indexer = self.indexer(selection)?;
        let element = transmute_to_bytes(&[value]).to_vec();
        for projection in indexer.iter() {
            fill_selection(&mut self.bytes, &self.shape, &projection.chunk_sel, &element);
        }
        Ok(())
    }
}

/// Convert the output ranges of a chunk projection into a normalized selection.
pub(crate) fn out_sel_dims(out_sel: &[SliceIndices]) -> Vec<DimIndices> {
    out_sel.iter().copied().map(DimIndices::Slice).collect()
}
