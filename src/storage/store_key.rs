use derive_more::{Display, From};
use thiserror::Error;

/// A Zarr abstract store key.
///
/// A key is one or more non-empty `/`-separated segments. Every key this crate writes
/// is composed from a validated [`StorePrefix`](super::StorePrefix) and a final
/// segment (a metadata file name or an encoded chunk identifier), so the segment rule
/// subsumes the storage specification's requirements: a key is not empty and neither
/// starts nor ends with `/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StoreKey(String);

/// An invalid store key.
#[derive(Debug, From, Error)]
#[error("invalid store key {_0}")]
pub struct StoreKeyError(String);

/// A list of [`StoreKey`].
pub type StoreKeys = Vec<StoreKey>;

impl StoreKey {
    /// Create a new store key from `key`.
    ///
    /// # Errors
    /// Returns [`StoreKeyError`] if `key` is not valid according to
    /// [`StoreKey::validate`].
    pub fn new(key: impl Into<String>) -> Result<Self, StoreKeyError> {
        let key = key.into();
        if Self::validate(&key) {
            Ok(Self(key))
        } else {
            Err(StoreKeyError(key))
        }
    }

    /// Create a new store key from `key` without validation.
    ///
    /// # Safety
    /// `key` is not validated, so this can result in an invalid store key.
    #[must_use]
    pub unsafe fn new_unchecked(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(Self::validate(&key));
        Self(key)
    }

    /// Extracts a string slice of the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a key: every `/`-separated segment must be non-empty.
    #[must_use]
    pub fn validate(key: &str) -> bool {
        !key.is_empty() && !key.split('/').any(str::is_empty)
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = StoreKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key() {
        assert!(StoreKey::new("a").is_ok());
        assert!(StoreKey::new("a/b/c").is_ok());
        assert!(StoreKey::new(".zarray").is_ok());
        assert_eq!(StoreKey::new("a").unwrap().to_string(), "a");
        assert!(StoreKey::new("a/").is_err());
        assert!(StoreKey::new("/a").is_err());
        assert!(StoreKey::new("a//b").is_err());
        assert!(StoreKey::new("").is_err());
        assert_eq!(
            StoreKey::new("a/").unwrap_err().to_string(),
            "invalid store key a/"
        );
    }
}
