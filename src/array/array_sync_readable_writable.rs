use crate::{
    selection::{is_total_slice, BasicIndexer, Selection},
    storage::ReadableWritableStorageTraits,
};

use super::{
    array_bytes::{copy_selection, fill_selection},
    nested_array::out_sel_dims,
    transmute_to_bytes, Array, ArrayError, FillValue, NestedArray,
};

enum SelectionValue<'a> {
    Array(&'a NestedArray),
    Scalar(&'a FillValue),
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Array<TStorage> {
    /// Write `value` into the region of the array described by `selection`.
    ///
    /// The shape of `value` must equal the output shape of the selection. Chunks fully
    /// covered by the selection are replaced without a read; chunks partially covered
    /// are read, updated, and rewritten, with absent chunks initialised from the fill
    /// value (or zeroed when the fill value is null). All chunk writes complete before
    /// this method returns.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the selection is incompatible with the array shape,
    ///  - the shape or data type of `value` does not match the selection,
    ///  - there is a codec error, or
    ///  - an underlying store error.
    pub fn store_basic_selection(
        &self,
        selection: &Selection,
        value: &NestedArray,
    ) -> Result<(), ArrayError> {
        if value.data_type() != self.data_type() {
            return Err(ArrayError::IncompatibleElementType);
        }
        let indexer = BasicIndexer::new(selection, self.shape(), &self.chunk_shape)?;
        if value.shape() != indexer.out_shape() {
            return Err(ArrayError::InvalidDataShape(
                value.shape().to_vec(),
                indexer.out_shape().to_vec(),
            ));
        }
        self.store_selection_value(&indexer, &SelectionValue::Array(value))
    }

    /// Write `elements` (in row-major selection order) into the region of the array
    /// described by `selection`.
    ///
    /// # Errors
    /// In addition to [`store_basic_selection`](Array::store_basic_selection) error
    /// conditions, returns [`ArrayError::IncompatibleElementType`] if the size of `T`
    /// does not match the data type size.
    pub fn store_basic_selection_elements<T: bytemuck::Pod>(
        &self,
        selection: &Selection,
        elements: Vec<T>,
    ) -> Result<(), ArrayError> {
        let indexer = BasicIndexer::new(selection, self.shape(), &self.chunk_shape)?;
        let value =
            NestedArray::from_elements(self.data_type(), indexer.out_shape().to_vec(), elements)?;
        self.store_selection_value(&indexer, &SelectionValue::Array(&value))
    }

    /// Broadcast `value` over the region of the array described by `selection`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the selection is incompatible with the array shape,
    ///  - the size of `T` does not match the data type size,
    ///  - there is a codec error, or
    ///  - an underlying store error.
    pub fn store_basic_selection_scalar<T: bytemuck::Pod>(
        &self,
        selection: &Selection,
        value: T,
    ) -> Result<(), ArrayError> {
        if core::mem::size_of::<T>() != self.data_type().size() {
            return Err(ArrayError::IncompatibleElementType);
        }
        let indexer = BasicIndexer::new(selection, self.shape(), &self.chunk_shape)?;
        let scalar = FillValue::new(transmute_to_bytes(&[value]).to_vec());
        self.store_selection_value(&indexer, &SelectionValue::Scalar(&scalar))
    }

    /// Read-modify-write chunks per chunk projection, skipping the read for chunks the
    /// selection replaces in full.
    fn store_selection_value(
        &self,
        indexer: &BasicIndexer,
        value: &SelectionValue<'_>,
    ) -> Result<(), ArrayError> {
        if indexer.is_empty() {
            return Ok(());
        }
        let element_size = self.data_type().size();
        let chunk_shape = self.chunk_shape_u64();
        let chunk_num_elements = usize::try_from(self.chunk_num_elements()).unwrap();

        for projection in indexer.iter() {
            let key = self.chunk_key(&projection.chunk_indices);
            let mut chunk_bytes = if is_total_slice(&projection.chunk_sel, &chunk_shape) {
                // the selection overwrites every element of the chunk
                vec![0; chunk_num_elements * element_size]
            } else {
                match self.storage.get(&key)? {
                    Some(encoded) => self.decode_chunk_bytes(encoded)?,
                    None => match self.fill_value() {
                        Some(fill_value) => fill_value.as_le_bytes().repeat(chunk_num_elements),
                        None => vec![0; chunk_num_elements * element_size],
                    },
                }
            };

            match value {
                SelectionValue::Array(value) => copy_selection(
                    value.as_bytes(),
                    value.shape(),
                    &out_sel_dims(&projection.out_sel),
                    &mut chunk_bytes,
                    &chunk_shape,
                    &projection.chunk_sel,
                    element_size,
                ),
                SelectionValue::Scalar(scalar) => fill_selection(
                    &mut chunk_bytes,
                    &chunk_shape,
                    &projection.chunk_sel,
                    scalar.as_le_bytes(),
                ),
            }

            let encoded = self.encode_chunk_bytes(chunk_bytes)?;
            self.storage.set(&key, &encoded)?;
        }
        Ok(())
    }
}
