//! Type-safe encoding wrappers
//!
//! Newtypes around hex encoded strings so digests, signatures and key
//! identifiers can't be mixed up with arbitrary text.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hex-encoded data
///
/// This type represents data that is hex-encoded (lowercase).
/// It provides safe conversion to/from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hex(String);

impl Hex {
    /// Create a new Hex wrapper from a string
    ///
    /// Note: This does not validate the hex encoding.
    /// Use `decode()` to validate and extract bytes.
    pub fn new(s: String) -> Self {
        Hex(s)
    }

    /// Create a Hex wrapper from raw bytes
    pub fn encode(bytes: &[u8]) -> Self {
        Hex(hex::encode(bytes))
    }

    /// Decode the hex string to bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        hex::decode(&self.0).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {}", e)))
    }

    /// Get the underlying string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Hex {
    fn from(s: String) -> Self {
        Hex(s)
    }
}

impl AsRef<str> for Hex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Hex {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Hex {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identifier of a public key inside root metadata
///
/// The hex encoded SHA-256 of the key's canonical JSON form, see
/// [`crate::PublicKey::key_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Wrap an already computed key id
    pub fn new(id: impl Into<String>) -> Self {
        KeyId(id.into())
    }

    /// Key id for a SHA-256 digest
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        KeyId(hex::encode(digest))
    }

    /// Get the underlying string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let data = b"hello world";
        let encoded = Hex::encode(data);
        assert_eq!(encoded, "68656c6c6f20776f726c64");
        assert_eq!(&encoded.decode().unwrap(), data);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Hex::new("not hex".to_string()).decode().is_err());
    }

    #[test]
    fn test_key_id_serializes_as_plain_string() {
        let id = KeyId::from_digest(&[0xab; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
    }
}
