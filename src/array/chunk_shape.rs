use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ArrayShape;

/// A non zero error.
///
/// Returned when a shape with a zero component is converted to a [`ChunkShape`].
#[derive(Debug, Error)]
#[error("value must be non-zero")]
pub struct NonZeroError;

/// The shape of a chunk. All dimensions must be non-zero.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ChunkShape(Vec<NonZeroU64>);

impl std::ops::Deref for ChunkShape {
    type Target = Vec<NonZeroU64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<NonZeroU64>> for ChunkShape {
    fn from(value: Vec<NonZeroU64>) -> Self {
        Self(value)
    }
}

impl TryFrom<Vec<u64>> for ChunkShape {
    type Error = NonZeroError;

    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        value.as_slice().try_into()
    }
}

impl TryFrom<&[u64]> for ChunkShape {
    type Error = NonZeroError;

    fn try_from(value: &[u64]) -> Result<Self, Self::Error> {
        Ok(Self(
            value
                .iter()
                .map(|&i| NonZeroU64::new(i).ok_or(NonZeroError))
                .collect::<Result<_, _>>()?,
        ))
    }
}

impl<const N: usize> TryFrom<[u64; N]> for ChunkShape {
    type Error = NonZeroError;

    fn try_from(value: [u64; N]) -> Result<Self, Self::Error> {
        value.as_slice().try_into()
    }
}

/// Convert a [`ChunkShape`] to an [`ArrayShape`].
#[must_use]
pub fn chunk_shape_to_array_shape(chunk_shape: &[NonZeroU64]) -> ArrayShape {
    chunk_shape.iter().map(|i| i.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_shape_conversions() {
        let chunk_shape: ChunkShape = vec![1u64, 2, 3].try_into().unwrap();
        assert_eq!(chunk_shape_to_array_shape(&chunk_shape), vec![1, 2, 3]);
        assert!(ChunkShape::try_from(vec![1u64, 0]).is_err());
    }
}
