use std::sync::Arc;

use crate::{
    metadata::ArrayMetadataV2,
    selection::{is_contiguous_selection, is_total_slice, BasicIndexer, Selection},
    storage::{
        array_path_prefix, meta_key_v2_array, meta_key_v2_attributes, ReadableStorageTraits,
        StorageError,
    },
};

use super::{
    array_bytes::{copy_selection, fill_selection},
    nested_array::out_sel_dims,
    ravel_indices, Array, ArrayCreateError, ArrayError, NestedArray,
};

impl<TStorage: ?Sized + ReadableStorageTraits> Array<TStorage> {
    /// Open an existing array in `storage` at `path`.
    ///
    /// The `.zarray` metadata is read from the store, along with user attributes from
    /// `.zattrs` if present.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error, the metadata is
    /// missing, or any metadata is invalid.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, ArrayCreateError> {
        let key_prefix = array_path_prefix(path)?;

        let key = meta_key_v2_array(&key_prefix);
        let Some(metadata) = storage.get(&key)? else {
            return Err(ArrayCreateError::MissingMetadata);
        };
        let mut metadata: ArrayMetadataV2 = serde_json::from_slice(&metadata)
            .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()))?;

        let attributes_key = meta_key_v2_attributes(&key_prefix);
        if let Some(attributes) = storage.get(&attributes_key)? {
            metadata.attributes = serde_json::from_slice(&attributes)
                .map_err(|err| StorageError::InvalidMetadata(attributes_key, err.to_string()))?;
        }

        Self::new_with_metadata(storage, path, metadata)
    }

    /// Read and decode the chunk at `chunk_indices` if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk_if_exists(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<NestedArray>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        let Some(encoded) = self.storage.get(&self.chunk_key(chunk_indices))? else {
            return Ok(None);
        };
        let bytes = self.decode_chunk_bytes(encoded)?;
        Ok(Some(NestedArray::from_bytes(
            self.data_type(),
            self.chunk_shape_u64(),
            bytes,
        )?))
    }

    /// Read and decode the chunk at `chunk_indices`, substituting the fill value if it
    /// does not exist.
    ///
    /// # Errors
    /// In addition to [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists)
    /// error conditions, returns [`ArrayError::MissingChunkWithoutFillValue`] if the
    /// chunk does not exist and the array has no fill value.
    pub fn retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<NestedArray, ArrayError> {
        if let Some(chunk) = self.retrieve_chunk_if_exists(chunk_indices)? {
            Ok(chunk)
        } else if let Some(fill_value) = self.fill_value() {
            Ok(NestedArray::new_fill_value(
                self.data_type(),
                self.chunk_shape_u64(),
                fill_value,
            ))
        } else {
            Err(ArrayError::MissingChunkWithoutFillValue(
                self.chunk_key(chunk_indices),
            ))
        }
    }

    /// Read and decode the region of the array described by `selection`.
    ///
    /// Axes selected with an integer are dropped, so a selection fixing every axis
    /// yields a 0-dimensional array; its value is accessible with
    /// [`NestedArray::scalar`]. Chunks absent from the store contribute the fill
    /// value; with a null fill value their elements are left zeroed.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the selection is incompatible with the array shape,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    ///
    /// # Panics
    /// Panics if the size of the output exceeds [`usize::MAX`].
    pub fn retrieve_basic_selection(
        &self,
        selection: &Selection,
    ) -> Result<NestedArray, ArrayError> {
        let indexer = BasicIndexer::new(selection, self.shape(), &self.chunk_shape)?;
        let out_shape = indexer.out_shape().to_vec();
        let element_size = self.data_type().size();
        let num_elements = usize::try_from(indexer.num_elements()).unwrap();
        let mut out_bytes = vec![0; num_elements * element_size];
        if num_elements == 0 {
            return NestedArray::from_bytes(self.data_type(), out_shape, out_bytes);
        }

        let chunk_shape = self.chunk_shape_u64();
        for projection in indexer.iter() {
            let Some(encoded) = self.storage.get(&self.chunk_key(&projection.chunk_indices))?
            else {
                if let Some(fill_value) = self.fill_value() {
                    fill_selection(
                        &mut out_bytes,
                        &out_shape,
                        &out_sel_dims(&projection.out_sel),
                        fill_value.as_le_bytes(),
                    );
                }
                continue;
            };
            let decoded = self.decode_chunk_bytes(encoded)?;
            if self.filters.is_empty()
                && is_total_slice(&projection.chunk_sel, &chunk_shape)
                && is_contiguous_selection(&projection.out_sel, &out_shape)
            {
                // the whole decoded chunk lands in one contiguous output run
                let out_start: Vec<u64> = projection
                    .out_sel
                    .iter()
                    .map(|out| u64::try_from(out.start).unwrap())
                    .collect();
                let offset =
                    usize::try_from(ravel_indices(&out_start, &out_shape)).unwrap() * element_size;
                out_bytes[offset..offset + decoded.len()].copy_from_slice(&decoded);
            } else {
                copy_selection(
                    &decoded,
                    &chunk_shape,
                    &projection.chunk_sel,
                    &mut out_bytes,
                    &out_shape,
                    &out_sel_dims(&projection.out_sel),
                    element_size,
                );
            }
        }
        NestedArray::from_bytes(self.data_type(), out_shape, out_bytes)
    }

    /// Read and decode the region of the array described by `selection` into a vector
    /// of its elements.
    ///
    /// # Errors
    /// In addition to [`retrieve_basic_selection`](Array::retrieve_basic_selection)
    /// error conditions, returns [`ArrayError::IncompatibleElementType`] if the size
    /// of `T` does not match the data type size.
    pub fn retrieve_basic_selection_elements<T: bytemuck::Pod>(
        &self,
        selection: &Selection,
    ) -> Result<Vec<T>, ArrayError> {
        self.retrieve_basic_selection(selection)?.elements()
    }
}
