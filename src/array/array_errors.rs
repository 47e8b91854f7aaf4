use thiserror::Error;

use crate::{
    codec::CodecError,
    selection::SelectionError,
    storage::{InvalidArrayPathError, StorageError, StoreKey},
};

use super::{
    data_type::{IncompatibleFillValueMetadataError, UnsupportedDataTypeError},
    ArrayShape,
};

/// An array creation error.
#[derive(Debug, Error)]
pub enum ArrayCreateError {
    /// An invalid array path.
    #[error(transparent)]
    InvalidArrayPath(#[from] InvalidArrayPathError),
    /// Unsupported data type.
    #[error(transparent)]
    DataTypeCreateError(#[from] UnsupportedDataTypeError),
    /// Invalid fill value metadata.
    #[error(transparent)]
    InvalidFillValueMetadata(#[from] IncompatibleFillValueMetadataError),
    /// Error creating the compressor or a filter.
    #[error(transparent)]
    CodecsCreateError(#[from] CodecError),
    /// The dimensionality of the chunk grid does not match the array shape.
    #[error("chunk grid dimensionality {_0} does not match array dimensionality {_1}")]
    InvalidChunkGridDimensionality(usize, usize),
    /// Column-major chunk memory order.
    #[error(r#"column-major ("F") chunk memory order is not supported"#)]
    UnsupportedOrder,
    /// Storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Missing metadata.
    #[error("array metadata is missing")]
    MissingMetadata,
}

/// Array errors.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// A selection error.
    #[error(transparent)]
    SelectionError(#[from] SelectionError),
    /// Invalid chunk grid indices.
    #[error("invalid chunk grid indices: {_0:?}")]
    InvalidChunkGridIndices(Vec<u64>),
    /// An unexpected chunk decoded size.
    #[error("got chunk decoded size {_0}, expected {_1}")]
    UnexpectedChunkDecodedSize(usize, u64),
    /// An unexpected bytes input size.
    #[error("got bytes with size {_0}, expected {_1}")]
    InvalidBytesInputSize(usize, u64),
    /// Invalid data shape.
    #[error("data has shape {_0:?}, expected {_1:?}")]
    InvalidDataShape(ArrayShape, ArrayShape),
    /// The element type does not match the data type.
    #[error("the element type does not match the data type")]
    IncompatibleElementType,
    /// A chunk is missing and the array has no fill value.
    #[error("chunk {_0} is missing and the array has no fill value")]
    MissingChunkWithoutFillValue(StoreKey),
}
