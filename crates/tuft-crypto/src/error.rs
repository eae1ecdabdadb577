//! Error types for tuft-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Key generation error
    #[error("key generation error: {0}")]
    KeyGeneration(String),

    /// Signing error
    #[error("signing error: {0}")]
    Signing(String),

    /// Verification error
    #[error("verification error: {0}")]
    Verification(String),

    /// Invalid key format
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Key type / scheme pair that this crate cannot handle
    #[error("unsupported scheme: keytype {keytype:?}, scheme {scheme:?}")]
    UnsupportedScheme {
        /// Metadata key type, e.g. `ed25519`
        keytype: String,
        /// Metadata signature scheme, e.g. `ecdsa-sha2-nistp256`
        scheme: String,
    },

    /// Unsupported digest algorithm name
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    /// Hex decoding error
    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// AWS-LC-RS error
    #[error("crypto error: {0}")]
    AwsLc(String),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::AwsLc("unspecified error".to_string())
    }
}

impl From<aws_lc_rs::error::KeyRejected> for Error {
    fn from(e: aws_lc_rs::error::KeyRejected) -> Self {
        Error::InvalidKeyFormat(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
