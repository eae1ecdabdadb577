//! Error types for tuft-types

use thiserror::Error;

/// Errors that can occur in tuft-types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Crypto error
    #[error("crypto error: {0}")]
    Crypto(#[from] tuft_crypto::Error),

    /// Invalid encoding
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Role name that is not one of root, targets, snapshot, timestamp
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// No signature from the given key on a metadata document
    #[error("no signature by key {0}")]
    MissingSignature(crate::KeyId),

    /// Payload accessed as the wrong role kind
    #[error("expected {expected} payload, found {found}")]
    WrongPayload {
        /// Role kind the caller asked for
        expected: crate::RoleKind,
        /// Role kind actually carried
        found: crate::RoleKind,
    },
}

/// Result type for tuft-types operations
pub type Result<T> = std::result::Result<T, Error>;
