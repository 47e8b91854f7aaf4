//! Zarr fill values.

/// The fill value of a Zarr array.
///
/// Provides an element value to use for uninitialised portions of the array, stored as
/// the little-endian byte representation of one element.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FillValue(Vec<u8>);

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<u8>> for FillValue {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<u8> for FillValue {
    fn from(value: u8) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<i8> for FillValue {
    fn from(value: i8) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<u16> for FillValue {
    fn from(value: u16) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<i16> for FillValue {
    fn from(value: i16) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<u32> for FillValue {
    fn from(value: u32) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<i32> for FillValue {
    fn from(value: i32) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<f32> for FillValue {
    fn from(value: f32) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        Self(value.to_le_bytes().to_vec())
    }
}

impl FillValue {
    /// Create a new fill value composed of `bytes`.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the size in bytes of the fill value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return the little-endian byte representation of the fill value.
    #[must_use]
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value_bytes() {
        assert_eq!(FillValue::from(0u8).as_le_bytes(), &[0]);
        assert_eq!(FillValue::from(-1i16).as_le_bytes(), &[0xff, 0xff]);
        assert_eq!(FillValue::from(1i32).as_le_bytes(), &[1, 0, 0, 0]);
        assert_eq!(FillValue::from(1f32).as_le_bytes(), 1f32.to_le_bytes());
        assert_eq!(FillValue::from(1f32).size(), 4);
    }
}
