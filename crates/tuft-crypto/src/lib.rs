//! Cryptographic primitives for tuft repositories
//!
//! This crate provides the signing keys used to sign role metadata, the
//! matching verification keys, and the content digests recorded for
//! published targets. aws-lc-rs is the cryptographic backend.

pub mod error;
pub mod hash;
pub mod signing;
pub mod verification;

pub use error::{Error, Result};
pub use hash::{digest, sha256, sha512, DigestAlgorithm, MultiHasher};
pub use signing::{KeyPair, Signature, SigningScheme};
pub use verification::{verify_signature, VerificationKey};
