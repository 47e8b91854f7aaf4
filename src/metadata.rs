//! Zarr V2 metadata.
//!
//! Serde models of the `.zarray` array descriptor and its constituent parts: codec
//! descriptors, fill value encodings, chunk memory order, and the chunk key separator.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::array::{ArrayShape, ChunkShape};

/// Zarr array metadata (storage specification v2).
///
/// An example `JSON` document for a Zarr V2 array:
/// ```json
/// {
///     "chunks": [
///         1000,
///         1000
///     ],
///     "compressor": {
///         "id": "zlib",
///         "level": 1
///     },
///     "dtype": "<f8",
///     "fill_value": "NaN",
///     "filters": null,
///     "order": "C",
///     "shape": [
///         10000,
///         10000
///     ],
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// An integer defining the version of the storage specification to which the array
    /// adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// An array of integers providing the length of each dimension of the Zarr array.
    pub shape: ArrayShape,
    /// A list of integers defining the length of each dimension of a chunk of the
    /// array.
    pub chunks: ChunkShape,
    /// The data type of the Zarr array as a three-character tag: endianness (`<`, `>`
    /// or `|`), kind, and width in bytes (e.g. `<i4`).
    pub dtype: String,
    /// A JSON object identifying the primary compression codec and providing
    /// configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<CodecMetadataV2>,
    /// A scalar value providing the default value to use for uninitialized portions of
    /// the array, or null if no fill value is to be used.
    pub fill_value: FillValueMetadataV2,
    /// Either "C" or "F", defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// A list of JSON objects providing codec configurations, or null if no filters
    /// are to be applied.
    #[serde(default)]
    pub filters: Option<Vec<CodecMetadataV2>>,
    /// If present, either the string "." or "/" defining the separator placed between
    /// the dimensions of a chunk.
    #[serde(default = "chunk_key_separator_default_zarr_v2")]
    pub dimension_separator: ChunkKeySeparator,
    /// Optional user defined attributes contained in a separate `.zattrs` file.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

const fn chunk_key_separator_default_zarr_v2() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

impl ArrayMetadataV2 {
    /// Create array metadata with "C" order, no filters, and the default separator.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ChunkShape,
        dtype: impl Into<String>,
        fill_value: FillValueMetadataV2,
        compressor: Option<CodecMetadataV2>,
    ) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            shape,
            chunks,
            dtype: dtype.into(),
            compressor,
            fill_value,
            order: ArrayMetadataV2Order::C,
            filters: None,
            dimension_separator: chunk_key_separator_default_zarr_v2(),
            attributes: serde_json::Map::default(),
        }
    }

    /// Set the dimension separator.
    #[must_use]
    pub const fn with_dimension_separator(mut self, separator: ChunkKeySeparator) -> Self {
        self.dimension_separator = separator;
        self
    }

    /// Set the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Option<Vec<CodecMetadataV2>>) -> Self {
        self.filters = filters;
        self
    }
}

/// A Zarr V2 codec descriptor: an `id` and optional configuration.
///
/// For example:
/// ```json
/// {
///     "id": "gzip",
///     "level": 5
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct CodecMetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: serde_json::Map<String, serde_json::Value>,
}

impl CodecMetadataV2 {
    /// Create codec metadata with an empty configuration.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configuration: serde_json::Map::default(),
        }
    }

    /// Create codec metadata with a configuration.
    #[must_use]
    pub fn new_with_configuration(
        id: impl Into<String>,
        configuration: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub const fn configuration(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.configuration
    }
}

/// A scalar value providing the default value to use for uninitialized portions of the
/// array, or null if no fill value is to be used.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
}

impl<'de> serde::Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            String(String),
            Number(serde_json::Number),
            Null,
        }
        let fill_value = FillValueMetadataV2Type::deserialize(d)?;
        match fill_value {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Err(serde::de::Error::custom("unsupported fill value")),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
        }
    }
}

impl core::fmt::Display for FillValueMetadataV2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::NaN => write!(f, "NaN"),
            Self::Infinity => write!(f, "Infinity"),
            Self::NegInfinity => write!(f, "-Infinity"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}

/// The separator placed between the dimensions of a chunk key.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ChunkKeySeparator {
    /// The `.` separator.
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
    /// The `/` separator.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
}

impl ChunkKeySeparator {
    /// The separator as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dot => ".",
            Self::Slash => "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_VALID: &str = r#"{
        "chunks": [2, 2],
        "compressor": {"id": "zlib", "level": 1},
        "dtype": "<i4",
        "fill_value": 0,
        "filters": null,
        "order": "C",
        "shape": [4, 4],
        "zarr_format": 2
    }"#;

    #[test]
    fn array_metadata_v2() {
        let metadata: ArrayMetadataV2 = serde_json::from_str(JSON_VALID).unwrap();
        assert_eq!(metadata.shape, vec![4, 4]);
        assert_eq!(metadata.dtype, "<i4");
        assert_eq!(metadata.order, ArrayMetadataV2Order::C);
        assert_eq!(metadata.dimension_separator, ChunkKeySeparator::Dot);
        assert_eq!(
            metadata.fill_value,
            FillValueMetadataV2::Number(serde_json::Number::from(0))
        );
        let compressor = metadata.compressor.as_ref().unwrap();
        assert_eq!(compressor.id(), "zlib");
        assert_eq!(
            compressor.configuration().get("level"),
            Some(&serde_json::Value::from(1))
        );

        // round trip
        let json = serde_json::to_string(&metadata).unwrap();
        let metadata2: ArrayMetadataV2 = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, metadata2);
    }

    #[test]
    fn array_metadata_v2_invalid_format() {
        let json = JSON_VALID.replace("\"zarr_format\": 2", "\"zarr_format\": 3");
        assert!(serde_json::from_str::<ArrayMetadataV2>(&json).is_err());
    }

    #[test]
    fn array_metadata_v2_dimension_separator() {
        let json = JSON_VALID.replace("\"order\": \"C\"", "\"order\": \"C\", \"dimension_separator\": \"/\"");
        let metadata: ArrayMetadataV2 = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata.dimension_separator, ChunkKeySeparator::Slash);
    }

    #[test]
    fn fill_value_metadata_v2() {
        let fill_value: FillValueMetadataV2 = serde_json::from_str("null").unwrap();
        assert_eq!(fill_value, FillValueMetadataV2::Null);
        let fill_value: FillValueMetadataV2 = serde_json::from_str("\"NaN\"").unwrap();
        assert_eq!(fill_value, FillValueMetadataV2::NaN);
        let fill_value: FillValueMetadataV2 = serde_json::from_str("\"-Infinity\"").unwrap();
        assert_eq!(fill_value, FillValueMetadataV2::NegInfinity);
        let fill_value: FillValueMetadataV2 = serde_json::from_str("1.5").unwrap();
        assert_eq!(
            fill_value,
            FillValueMetadataV2::Number(serde_json::Number::from_f64(1.5).unwrap())
        );
        assert!(serde_json::from_str::<FillValueMetadataV2>("\"Inf\"").is_err());
    }
}
