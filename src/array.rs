//! Zarr V2 arrays.
//!
//! An array is defined by its `.zarray` metadata: **shape**, **chunks** (the chunk
//! grid), **dtype**, **fill_value**, **order**, **compressor**, **filters**, and
//! **dimension_separator**. Bulk data lives in per-chunk byte blobs addressed by chunk
//! grid coordinates.
//!
//! [`Array`] reads and writes arbitrary hyper-rectangular regions described by a
//! [`Selection`](crate::selection::Selection) and exchanges data as [`NestedArray`]
//! values:
//!  - [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits):
//!    [`open`](Array::open), [`retrieve_chunk`](Array::retrieve_chunk),
//!    [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists),
//!    [`retrieve_basic_selection`](Array::retrieve_basic_selection)
//!  - [`WritableStorageTraits`](crate::storage::WritableStorageTraits):
//!    [`store_metadata`](Array::store_metadata), [`store_chunk`](Array::store_chunk),
//!    [`erase_chunk`](Array::erase_chunk)
//!  - [`ReadableWritableStorageTraits`](crate::storage::ReadableWritableStorageTraits):
//!    [`store_basic_selection`](Array::store_basic_selection) (writes spanning partial
//!    chunks read, update, and rewrite those chunks)
//!
//! Methods with an `_elements` suffix exchange `Vec<T>` for a
//! [`bytemuck::Pod`] element type `T` matching the array data type.
//!
//! An array instance makes no guarantees for concurrent callers mutating overlapping
//! regions; within one operation, chunks are visited and stored in the order the
//! selection's chunk projections are produced.

mod array_bytes;
mod array_errors;
mod array_sync_readable;
mod array_sync_readable_writable;
mod array_sync_writable;
mod chunk_shape;
pub mod data_type;
mod endianness;
mod fill_value;
mod nested_array;

use std::sync::Arc;

pub use self::{
    array_errors::{ArrayCreateError, ArrayError},
    chunk_shape::{chunk_shape_to_array_shape, ChunkShape, NonZeroError},
    data_type::{DataType, IncompatibleFillValueMetadataError, UnsupportedDataTypeError},
    endianness::{Endianness, NATIVE_ENDIAN},
    fill_value::FillValue,
    nested_array::NestedArray,
};

use crate::{
    codec::{self, CodecTraits},
    metadata::{ArrayMetadataV2, ArrayMetadataV2Order, ChunkKeySeparator},
    storage::{array_path_prefix, data_key, StoreKey, StorePrefix},
};

use self::array_bytes::reverse_endianness;

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// A Zarr V2 array.
///
/// ## Initialisation
/// An *existing* array is initialised with [`Array::open`], which reads its `.zarray`
/// metadata (and `.zattrs` attributes) from the store. An array can also be created
/// directly from an [`ArrayMetadataV2`] with [`Array::new_with_metadata`]; metadata
/// created this way must be explicitly written with
/// [`store_metadata`](Array::store_metadata).
///
/// Initialisation errors if the metadata has an unsupported data type, an incompatible
/// fill value, a chunk grid incompatible with the array shape, an unrecognised
/// compressor or filter, or "F" chunk memory order.
#[derive(Debug)]
pub struct Array<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The store prefix the array's keys live under.
    key_prefix: StorePrefix,
    /// The length of each dimension of the array.
    shape: ArrayShape,
    /// The length of each dimension of a chunk.
    chunk_shape: ChunkShape,
    /// The data type of the array.
    data_type: DataType,
    /// The endianness of stored chunk data. In-memory data is always little-endian.
    endianness: Option<Endianness>,
    /// The element value for uninitialised portions of the array, if any.
    fill_value: Option<FillValue>,
    /// The primary compression codec, if any.
    compressor: Option<Box<dyn CodecTraits>>,
    /// Filter codecs, applied after the compressor on decode.
    filters: Vec<Box<dyn CodecTraits>>,
    /// The separator between the dimensions of a chunk key.
    dimension_separator: ChunkKeySeparator,
    /// The metadata used to create the array.
    metadata: ArrayMetadataV2,
}

impl<TStorage: ?Sized> Array<TStorage> {
    /// Create an array in `storage` at `path` with `metadata`.
    ///
    /// This does **not** write to the store; use
    /// [`store_metadata`](Array::store_metadata) to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if any metadata is invalid.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: ArrayMetadataV2,
    ) -> Result<Self, ArrayCreateError> {
        let key_prefix = array_path_prefix(path)?;
        if metadata.chunks.len() != metadata.shape.len() {
            return Err(ArrayCreateError::InvalidChunkGridDimensionality(
                metadata.chunks.len(),
                metadata.shape.len(),
            ));
        }
        let (data_type, endianness) = DataType::from_dtype_str(&metadata.dtype)?;
        let fill_value = data_type.fill_value_from_metadata(&metadata.fill_value)?;
        if metadata.order == ArrayMetadataV2Order::F {
            return Err(ArrayCreateError::UnsupportedOrder);
        }
        let compressor = metadata
            .compressor
            .as_ref()
            .map(codec::from_metadata)
            .transpose()?;
        let filters = metadata
            .filters
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(codec::from_metadata)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            storage,
            key_prefix,
            shape: metadata.shape.clone(),
            chunk_shape: metadata.chunks.clone(),
            data_type,
            endianness,
            fill_value,
            compressor,
            filters,
            dimension_separator: metadata.dimension_separator,
            metadata,
        })
    }

    /// Get the store prefix the array's keys live under.
    #[must_use]
    pub const fn key_prefix(&self) -> &StorePrefix {
        &self.key_prefix
    }

    /// Get the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Get the array dimensionality.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Get the chunk shape.
    #[must_use]
    pub const fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// Get the chunk shape as an [`ArrayShape`].
    #[must_use]
    pub fn chunk_shape_u64(&self) -> ArrayShape {
        chunk_shape_to_array_shape(&self.chunk_shape)
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Get the endianness of stored chunk data.
    ///
    /// [`None`] means not applicable (single-byte data types).
    #[must_use]
    pub const fn endianness(&self) -> Option<Endianness> {
        self.endianness
    }

    /// Get the fill value, if any.
    #[must_use]
    pub const fn fill_value(&self) -> Option<&FillValue> {
        self.fill_value.as_ref()
    }

    /// Get the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata.attributes
    }

    /// Return the underlying array metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ArrayMetadataV2 {
        &self.metadata
    }

    /// Return the shape of the chunk grid (the number of chunks on each axis).
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.shape, self.chunk_shape.iter())
            .map(|(&shape, chunk)| shape.div_ceil(chunk.get()))
            .collect()
    }

    /// Return the number of elements in a chunk.
    #[must_use]
    pub fn chunk_num_elements(&self) -> u64 {
        self.chunk_shape.iter().map(|chunk| chunk.get()).product()
    }

    /// Return the [`StoreKey`] of the chunk at `chunk_indices`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        data_key(&self.key_prefix, chunk_indices, self.dimension_separator)
    }

    /// Validate chunk grid indices against the chunk grid.
    fn validate_chunk_indices(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        let grid_shape = self.chunk_grid_shape();
        if chunk_indices.len() == grid_shape.len()
            && std::iter::zip(chunk_indices, &grid_shape).all(|(index, shape)| index < shape)
        {
            Ok(())
        } else {
            Err(ArrayError::InvalidChunkGridIndices(chunk_indices.to_vec()))
        }
    }

    /// Decode raw chunk bytes: decompress, reverse filters, byte swap, and validate
    /// the decoded length.
    fn decode_chunk_bytes(&self, encoded: Vec<u8>) -> Result<Vec<u8>, ArrayError> {
        let mut bytes = encoded;
        if let Some(compressor) = &self.compressor {
            bytes = compressor.decode(bytes)?;
        }
        for filter in self.filters.iter().rev() {
            bytes = filter.decode(bytes)?;
        }
        if self.endianness == Some(Endianness::Big) {
            reverse_endianness(&mut bytes, self.data_type.size());
        }
        let expected = self.chunk_num_elements() * self.data_type.size() as u64;
        if bytes.len() as u64 == expected {
            Ok(bytes)
        } else {
            Err(ArrayError::UnexpectedChunkDecodedSize(bytes.len(), expected))
        }
    }

    /// Encode chunk bytes: byte swap, apply filters, and compress.
    fn encode_chunk_bytes(&self, decoded: Vec<u8>) -> Result<Vec<u8>, ArrayError> {
        let mut bytes = decoded;
        if self.endianness == Some(Endianness::Big) {
            reverse_endianness(&mut bytes, self.data_type.size());
        }
        for filter in &self.filters {
            bytes = filter.encode(bytes)?;
        }
        if let Some(compressor) = &self.compressor {
            bytes = compressor.encode(bytes)?;
        }
        Ok(bytes)
    }
}

/// Convert from `&[u8]` to `Vec<T>`.
#[must_use]
pub fn convert_from_bytes_slice<T: bytemuck::Pod>(from: &[u8]) -> Vec<T> {
    bytemuck::allocation::pod_collect_to_vec(from)
}

/// Transmute from `Vec<u8>` to `Vec<T>`.
#[must_use]
pub fn transmute_from_bytes_vec<T: bytemuck::Pod>(from: Vec<u8>) -> Vec<T> {
    bytemuck::allocation::try_cast_vec(from)
        .unwrap_or_else(|(_err, from)| convert_from_bytes_slice(&from))
}

/// Convert from `&[T]` to `Vec<u8>`.
#[must_use]
pub fn convert_to_bytes_vec<T: bytemuck::NoUninit>(from: &[T]) -> Vec<u8> {
    bytemuck::allocation::pod_collect_to_vec(from)
}

/// Transmute from `Vec<T>` to `Vec<u8>`.
#[must_use]
pub fn transmute_to_bytes_vec<T: bytemuck::NoUninit>(from: Vec<T>) -> Vec<u8> {
    bytemuck::allocation::try_cast_vec(from)
        .unwrap_or_else(|(_err, from)| convert_to_bytes_vec(&from))
}

/// Transmute from `&[T]` to `&[u8]`.
#[must_use]
pub fn transmute_to_bytes<T: bytemuck::NoUninit>(from: &[T]) -> &[u8] {
    bytemuck::must_cast_slice(from)
}

/// Unravel a linearised index to ND indices.
#[must_use]
pub fn unravel_index(mut index: u64, shape: &[u64]) -> ArrayIndices {
    let mut indices = vec![0; shape.len()];
    for (index_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev()) {
        *index_i = index % dim;
        index /= dim;
    }
    indices
}

/// Ravel ND indices to a linearised index.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}

#[cfg(test)]
mod tests {
    use crate::metadata::FillValueMetadataV2;
    use crate::storage::store::MemoryStore;

    use super::*;

    fn metadata_i4(shape: ArrayShape, chunks: &[u64]) -> ArrayMetadataV2 {
        ArrayMetadataV2::new(
            shape,
            chunks.try_into().unwrap(),
            "<i4",
            FillValueMetadataV2::Number(serde_json::Number::from(0)),
            None,
        )
    }

    #[test]
    fn array_geometry() {
        let store = Arc::new(MemoryStore::new());
        let array =
            Array::new_with_metadata(store, "/array", metadata_i4(vec![5, 4], &[2, 3])).unwrap();
        assert_eq!(array.shape(), &[5, 4]);
        assert_eq!(array.dimensionality(), 2);
        assert_eq!(array.chunk_shape_u64(), vec![2, 3]);
        assert_eq!(array.chunk_grid_shape(), vec![3, 2]);
        assert_eq!(array.chunk_num_elements(), 6);
        assert_eq!(array.data_type(), DataType::Int32);
        assert_eq!(array.endianness(), Some(Endianness::Little));
        assert_eq!(array.chunk_key(&[1, 0]).as_str(), "array/1.0");
    }

    #[test]
    fn array_create_invalid() {
        let store = Arc::new(MemoryStore::new());
        // chunk grid dimensionality mismatch
        assert!(matches!(
            Array::new_with_metadata(store.clone(), "/array", metadata_i4(vec![5], &[2, 2])),
            Err(ArrayCreateError::InvalidChunkGridDimensionality(2, 1))
        ));
        // unknown dtype
        let mut metadata = metadata_i4(vec![4], &[2]);
        metadata.dtype = "<i8".to_string();
        assert!(matches!(
            Array::new_with_metadata(store.clone(), "/array", metadata),
            Err(ArrayCreateError::DataTypeCreateError(_))
        ));
        // F order
        let mut metadata = metadata_i4(vec![4], &[2]);
        metadata.order = crate::metadata::ArrayMetadataV2Order::F;
        assert!(matches!(
            Array::new_with_metadata(store, "/array", metadata),
            Err(ArrayCreateError::UnsupportedOrder)
        ));
    }

    #[test]
    fn ravel_unravel() {
        assert_eq!(unravel_index(7, &[2, 4]), vec![1, 3]);
        assert_eq!(ravel_indices(&[1, 3], &[2, 4]), 7);
        assert_eq!(ravel_indices(&[], &[]), 0);
    }
}
