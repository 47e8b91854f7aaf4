//! A Rust library for the core of the [Zarr V2](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html) storage format for multidimensional arrays.
//!
//! Arrays are chunked, compressed, n-dimensional containers backed by a key-value
//! [store](storage). Array [metadata] describes the shape, chunk grid, element
//! [data type](array::DataType), fill value, and codecs; bulk data lives in per-chunk
//! byte blobs addressed by chunk grid coordinates. Clients read and write arbitrary
//! hyper-rectangular regions described by a [`Selection`](selection::Selection) with
//! NumPy-compatible semantics (negative steps, negative indices, out-of-range
//! clamping, and dimension dropping), and the engine translates those requests into
//! the minimal set of chunk loads, decodes, partial writes, and encodes.
//!
//! The best docs to start with are [`array::Array`], [`array::NestedArray`], and
//! [`selection`].
//!
//! ## Example
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use zarr2::array::Array;
//! use zarr2::metadata::{ArrayMetadataV2, FillValueMetadataV2};
//! use zarr2::selection::{Selection, Slice};
//! use zarr2::storage::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let metadata = ArrayMetadataV2::new(
//!     vec![4, 4],                  // array shape
//!     vec![2, 2].try_into()?,      // chunk shape
//!     "<i4",
//!     FillValueMetadataV2::Number(serde_json::Number::from(0)),
//!     None,                        // no compressor
//! );
//! let array = Array::new_with_metadata(store, "/array", metadata)?;
//! array.store_metadata()?;
//!
//! array.store_basic_selection_elements::<i32>(
//!     &Selection::from(vec![(1..3).into(), (1..3).into()]),
//!     vec![1, 2, 3, 4],
//! )?;
//! let row = array.retrieve_basic_selection_elements::<i32>(&Selection::from(1))?;
//! assert_eq!(row, vec![0, 1, 2, 0]);
//! let reversed = array.retrieve_basic_selection_elements::<i32>(
//!     &Selection::from(vec![1.into(), Slice::with_step(None, None, -1).into()]),
//! )?;
//! assert_eq!(reversed, vec![0, 2, 1, 0]);
//! # Ok(())
//! # }
//! ```

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]

pub mod array;
pub mod codec;
pub mod metadata;
pub mod selection;
pub mod storage;

/// Re-export [`bytemuck`].
pub use bytemuck;

/// Re-export [`serde_json`].
pub use serde_json;
