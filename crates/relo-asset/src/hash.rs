//! Content hashing
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest used to compare stored
//! asset contents: store snapshots, and checking that a destination file a
//! relocation would skip really holds the source it was copied from.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content hash (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Compute hash from serializable value (JSON encoding)
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn compute_serializable<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", blake3::Hash::from(self.0).to_hex())
    }
}

/// Errors that can occur when hashing asset content
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ContentHash::compute(b"hello"), ContentHash::compute(b"hello"));
        assert_ne!(ContentHash::compute(b"data1"), ContentHash::compute(b"data2"));
    }

    #[test]
    fn displays_as_hex() {
        let hash = ContentHash::compute(b"test");
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(text, blake3::hash(b"test").to_hex().as_str());
    }

    #[test]
    fn serializable_hash_follows_json() {
        let a = ContentHash::compute_serializable(&vec!["a", "b"]).unwrap();
        assert_eq!(a, ContentHash::compute(br#"["a","b"]"#));
    }
}
