//! The `gzip` codec.

use std::io::{Cursor, Read};

use flate2::bufread::{GzDecoder, GzEncoder};

use crate::metadata::CodecMetadataV2;

use super::{configuration_level, CodecError, CodecTraits};

pub(crate) const IDENTIFIER: &str = "gzip";

const DEFAULT_LEVEL: u32 = 1;

/// A `gzip` codec implementation.
#[derive(Copy, Clone, Debug)]
pub struct GzipCodec {
    compression_level: u32,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidConfiguration`] if `compression_level` exceeds 9.
    pub fn new(compression_level: u32) -> Result<Self, CodecError> {
        if compression_level > 9 {
            Err(CodecError::InvalidConfiguration(
                IDENTIFIER.to_string(),
                format!("invalid compression level {compression_level}"),
            ))
        } else {
            Ok(Self { compression_level })
        }
    }

    /// Create a new `gzip` codec from a codec descriptor.
    ///
    /// The compression level is read from the `level` field, defaulting to 1.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidConfiguration`] if the level is not a valid
    /// compression level.
    pub fn new_with_configuration(metadata: &CodecMetadataV2) -> Result<Self, CodecError> {
        Self::new(configuration_level(metadata, DEFAULT_LEVEL)?)
    }
}

impl CodecTraits for GzipCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut decoder = GzDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
