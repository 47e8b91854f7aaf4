use crate::storage::{meta_key_v2_array, StorageError, WritableStorageTraits};

use super::{Array, ArrayError, NestedArray};

impl<TStorage: ?Sized + WritableStorageTraits> Array<TStorage> {
    /// Serialise and store the array metadata under `.zarray`.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        let key = meta_key_v2_array(self.key_prefix());
        let json = serde_json::to_vec_pretty(self.metadata())
            .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
        self.storage.set(&key, &json)
    }

    /// Encode `chunk` and store it at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - the shape or data type of `chunk` does not match the chunk shape,
    ///  - there is a codec encoding error, or
    ///  - an underlying store error.
    pub fn store_chunk(
        &self,
        chunk_indices: &[u64],
        chunk: &NestedArray,
    ) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        if chunk.data_type() != self.data_type() {
            return Err(ArrayError::IncompatibleElementType);
        }
        if chunk.shape() != self.chunk_shape_u64() {
            return Err(ArrayError::InvalidDataShape(
                chunk.shape().to_vec(),
                self.chunk_shape_u64(),
            ));
        }
        let encoded = self.encode_chunk_bytes(chunk.as_bytes().to_vec())?;
        self.storage
            .set(&self.chunk_key(chunk_indices), &encoded)
            .map_err(ArrayError::StorageError)
    }

    /// Encode `chunk_elements` and store at `chunk_indices`.
    ///
    /// # Errors
    /// In addition to [`store_chunk`](Array::store_chunk) error conditions, returns
    /// [`ArrayError::IncompatibleElementType`] if the size of `T` does not match the
    /// data type size.
    pub fn store_chunk_elements<T: bytemuck::Pod>(
        &self,
        chunk_indices: &[u64],
        chunk_elements: Vec<T>,
    ) -> Result<(), ArrayError> {
        let chunk =
            NestedArray::from_elements(self.data_type(), self.chunk_shape_u64(), chunk_elements)?;
        self.store_chunk(chunk_indices, &chunk)
    }

    /// Erase the chunk at `chunk_indices`.
    ///
    /// Succeeds if the chunk does not exist.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are invalid or there is an
    /// underlying store error.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        self.storage
            .erase(&self.chunk_key(chunk_indices))
            .map_err(ArrayError::StorageError)
    }
}
