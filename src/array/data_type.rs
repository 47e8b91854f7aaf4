//! Zarr V2 data types.
//!
//! Element types are tagged with a three-character on-disk `dtype` string: an
//! endianness marker (`<` little, `>` big, `|` not applicable), a kind character, and
//! the width in bytes. For example `<i4` is a little-endian 32-bit signed integer.

use derive_more::From;
use thiserror::Error;

use crate::metadata::FillValueMetadataV2;

use super::{Endianness, FillValue};

/// A data type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DataType {
    /// `u1` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `i1` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `u2` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `i2` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `u4` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `i4` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `f4` IEEE 754 single-precision floating point.
    Float32,
    /// `f8` IEEE 754 double-precision floating point.
    Float64,
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

/// A fill value metadata incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {_1} for data type {_0}")]
pub struct IncompatibleFillValueMetadataError(String, FillValueMetadataV2);

impl DataType {
    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::Int8 => "int8",
            Self::UInt16 => "uint16",
            Self::Int16 => "int16",
            Self::UInt32 => "uint32",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns the size in bytes of an element.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt32 | Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Parse a Zarr V2 `dtype` tag into a data type and the endianness of its stored
    /// representation.
    ///
    /// The `|` marker is only accepted for single-byte types, for which the returned
    /// endianness is [`None`].
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if the tag is not recognised.
    pub fn from_dtype_str(
        dtype: &str,
    ) -> Result<(Self, Option<Endianness>), UnsupportedDataTypeError> {
        let err = || UnsupportedDataTypeError(dtype.to_string());
        let endianness = match dtype.as_bytes().first().ok_or_else(err)? {
            b'<' => Some(Endianness::Little),
            b'>' => Some(Endianness::Big),
            b'|' => None,
            _ => return Err(err()),
        };
        let data_type = match &dtype[1..] {
            "u1" => Self::UInt8,
            "i1" => Self::Int8,
            "u2" => Self::UInt16,
            "i2" => Self::Int16,
            "u4" => Self::UInt32,
            "i4" => Self::Int32,
            "f4" => Self::Float32,
            "f8" => Self::Float64,
            _ => return Err(err()),
        };
        if endianness.is_none() && data_type.size() != 1 {
            return Err(err());
        }
        // single-byte types have no meaningful endianness
        let endianness = if data_type.size() == 1 { None } else { endianness };
        Ok((data_type, endianness))
    }

    /// Format the data type as a Zarr V2 `dtype` tag.
    #[must_use]
    pub fn dtype_str(&self, endianness: Option<Endianness>) -> String {
        let marker = match endianness {
            _ if self.size() == 1 => '|',
            Some(Endianness::Big) => '>',
            _ => '<',
        };
        let kind = match self {
            Self::UInt8 | Self::UInt16 | Self::UInt32 => 'u',
            Self::Int8 | Self::Int16 | Self::Int32 => 'i',
            Self::Float32 | Self::Float64 => 'f',
        };
        format!("{marker}{kind}{}", self.size())
    }

    /// Create a fill value from Zarr V2 fill value metadata.
    ///
    /// Returns [`None`] for a null fill value.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueMetadataError`] if the metadata is incompatible
    /// with the data type, such as a non-finite sentinel for an integer type or an
    /// out-of-range number.
    pub fn fill_value_from_metadata(
        &self,
        fill_value: &FillValueMetadataV2,
    ) -> Result<Option<FillValue>, IncompatibleFillValueMetadataError> {
        let err =
            || IncompatibleFillValueMetadataError(self.name().to_string(), fill_value.clone());
        match fill_value {
            FillValueMetadataV2::Null => Ok(None),
            FillValueMetadataV2::NaN => match self {
                Self::Float32 => Ok(Some(FillValue::from(f32::NAN))),
                Self::Float64 => Ok(Some(FillValue::from(f64::NAN))),
                _ => Err(err()),
            },
            FillValueMetadataV2::Infinity => match self {
                Self::Float32 => Ok(Some(FillValue::from(f32::INFINITY))),
                Self::Float64 => Ok(Some(FillValue::from(f64::INFINITY))),
                _ => Err(err()),
            },
            FillValueMetadataV2::NegInfinity => match self {
                Self::Float32 => Ok(Some(FillValue::from(f32::NEG_INFINITY))),
                Self::Float64 => Ok(Some(FillValue::from(f64::NEG_INFINITY))),
                _ => Err(err()),
            },
            FillValueMetadataV2::Number(number) => {
                let fill_value = match self {
                    Self::UInt8 => number
                        .as_u64()
                        .and_then(|value| u8::try_from(value).ok())
                        .map(FillValue::from),
                    Self::Int8 => number
                        .as_i64()
                        .and_then(|value| i8::try_from(value).ok())
                        .map(FillValue::from),
                    Self::UInt16 => number
                        .as_u64()
                        .and_then(|value| u16::try_from(value).ok())
                        .map(FillValue::from),
                    Self::Int16 => number
                        .as_i64()
                        .and_then(|value| i16::try_from(value).ok())
                        .map(FillValue::from),
                    Self::UInt32 => number
                        .as_u64()
                        .and_then(|value| u32::try_from(value).ok())
                        .map(FillValue::from),
                    Self::Int32 => number
                        .as_i64()
                        .and_then(|value| i32::try_from(value).ok())
                        .map(FillValue::from),
                    #[allow(clippy::cast_possible_truncation)]
                    Self::Float32 => number.as_f64().map(|value| FillValue::from(value as f32)),
                    Self::Float64 => number.as_f64().map(FillValue::from),
                };
                fill_value.map(Some).ok_or_else(err)
            }
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
