//! Chunk codecs.
//!
//! A codec is a bidirectional byte transform applied to encoded chunks: the
//! `compressor` of an array, or one of its `filters`. Codecs are resolved from their
//! Zarr V2 descriptors ([`CodecMetadataV2`](crate::metadata::CodecMetadataV2)) with
//! [`from_metadata`].

mod gzip;
mod zlib;

use thiserror::Error;

use crate::metadata::CodecMetadataV2;

pub use gzip::GzipCodec;
pub use zlib::ZlibCodec;

/// Traits for a codec: a bidirectional byte transform applied to chunks.
pub trait CodecTraits: Send + Sync + core::fmt::Debug {
    /// Unique identifier for the codec.
    fn identifier(&self) -> &'static str;

    /// Encode `decoded_value`.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the codec fails.
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    /// Decode `encoded_value`.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the codec fails or the value is corrupt.
    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;
}

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An unsupported codec.
    #[error("codec {_0} is not supported")]
    UnsupportedCodec(String),
    /// An invalid codec configuration.
    #[error("invalid configuration for codec {_0}: {_1}")]
    InvalidConfiguration(String, String),
}

/// Create a codec from a Zarr V2 codec descriptor.
///
/// # Errors
/// Returns [`CodecError::UnsupportedCodec`] if the codec identifier is not recognised,
/// or [`CodecError::InvalidConfiguration`] if its configuration is invalid.
pub fn from_metadata(metadata: &CodecMetadataV2) -> Result<Box<dyn CodecTraits>, CodecError> {
    match metadata.id() {
        gzip::IDENTIFIER => Ok(Box::new(GzipCodec::new_with_configuration(metadata)?)),
        zlib::IDENTIFIER => Ok(Box::new(ZlibCodec::new_with_configuration(metadata)?)),
        _ => Err(CodecError::UnsupportedCodec(metadata.id().to_string())),
    }
}

fn configuration_level(metadata: &CodecMetadataV2, default: u32) -> Result<u32, CodecError> {
    match metadata.configuration().get("level") {
        None => Ok(default),
        Some(level) => level
            .as_u64()
            .and_then(|level| u32::try_from(level).ok())
            .ok_or_else(|| {
                CodecError::InvalidConfiguration(metadata.id().to_string(), level.to_string())
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_from_metadata() {
        assert_eq!(
            from_metadata(&CodecMetadataV2::new("zlib")).unwrap().identifier(),
            "zlib"
        );
        assert_eq!(
            from_metadata(&CodecMetadataV2::new("gzip")).unwrap().identifier(),
            "gzip"
        );
        assert!(matches!(
            from_metadata(&CodecMetadataV2::new("blosc")),
            Err(CodecError::UnsupportedCodec(_))
        ));
    }
}
