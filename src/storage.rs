//! Zarr storage.
//!
//! A store is a system that maps slash-delimited string keys to byte values, such as a
//! filesystem or an in-memory map. Arrays consume stores through the traits in this
//! module: [`ReadableStorageTraits`], [`WritableStorageTraits`], and
//! [`ListableStorageTraits`].
//!
//! An array's storage path (e.g. `/group/array`) normalizes to the [`StorePrefix`] its
//! keys live under ([`array_path_prefix`]); [`meta_key_v2_array`],
//! [`meta_key_v2_attributes`], and [`data_key`] derive the keys below that prefix.

mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

use thiserror::Error;

use crate::metadata::ChunkKeySeparator;

pub use self::storage_sync::{
    ListableStorageTraits, ReadableStorageTraits, ReadableWritableListableStorageTraits,
    ReadableWritableStorageTraits, WritableStorageTraits,
};
pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

/// The bytes of a store value, or [`None`] if the key is not present.
pub type MaybeBytes = Option<Vec<u8>>;

/// [`StoreKeys`] and [`StorePrefixes`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StoreKeysPrefixes {
    pub(crate) keys: StoreKeys,
    pub(crate) prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Returns the keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Returns the prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {_0}: {_1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error("invalid store prefix {_0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error("invalid store key {_0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// Any other error.
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// An invalid array path.
#[derive(Debug, Error)]
#[error("invalid array path {_0}")]
pub struct InvalidArrayPathError(String);

/// Normalize an array's storage path into the [`StorePrefix`] its keys live under.
///
/// A path is `/` for the root, or `/`-prefixed non-empty segments such as
/// `/group/array`. The returned prefix is empty for the root and `/`-terminated
/// otherwise (e.g. `group/array/`).
///
/// # Errors
/// Returns [`InvalidArrayPathError`] if the path does not start with `/` or contains
/// an empty segment.
pub fn array_path_prefix(path: &str) -> Result<StorePrefix, InvalidArrayPathError> {
    let Some(segments) = path.strip_prefix('/') else {
        return Err(InvalidArrayPathError(path.to_string()));
    };
    if segments.is_empty() {
        Ok(StorePrefix::root())
    } else if segments.split('/').any(str::is_empty) {
        Err(InvalidArrayPathError(path.to_string()))
    } else {
        Ok(unsafe { StorePrefix::new_unchecked(format!("{segments}/")) })
    }
}

/// Return the metadata key below `prefix` for a specified metadata file name.
#[must_use]
fn meta_key_any(prefix: &StorePrefix, metadata_file_name: &str) -> StoreKey {
    unsafe { StoreKey::new_unchecked(format!("{}{metadata_file_name}", prefix.as_str())) }
}

/// Return the Zarr V2 array metadata key (`.zarray`) below an array prefix.
#[must_use]
pub fn meta_key_v2_array(prefix: &StorePrefix) -> StoreKey {
    meta_key_any(prefix, ".zarray")
}

/// Return the Zarr V2 user-defined attributes key (`.zattrs`) below an array prefix.
#[must_use]
pub fn meta_key_v2_attributes(prefix: &StorePrefix) -> StoreKey {
    meta_key_any(prefix, ".zattrs")
}

/// Return the chunk data key below an array prefix for chunk grid coordinates and a
/// chunk key separator.
///
/// The chunk part of the key is the separator-joined decimal representation of the
/// coordinates; a zero-dimensional array has the single chunk key `0`.
#[must_use]
pub fn data_key(
    prefix: &StorePrefix,
    chunk_grid_indices: &[u64],
    separator: ChunkKeySeparator,
) -> StoreKey {
    let chunk_key = if chunk_grid_indices.is_empty() {
        "0".to_string()
    } else {
        chunk_grid_indices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(separator.as_str())
    };
    unsafe { StoreKey::new_unchecked(format!("{}{chunk_key}", prefix.as_str())) }
}
