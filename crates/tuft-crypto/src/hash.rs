//! Content digests using aws-lc-rs
//!
//! Target entries record one digest per algorithm, keyed by the algorithm's
//! metadata name (`sha256`, `sha512`).

use crate::error::{Error, Result};
use aws_lc_rs::digest::{self, Context, SHA256, SHA512};

/// Digest algorithms that can be recorded for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DigestAlgorithm {
    /// SHA2-256
    Sha256,
    /// SHA2-512
    Sha512,
}

impl DigestAlgorithm {
    /// Every algorithm recorded for published targets, in recording order
    pub const ALL: [DigestAlgorithm; 2] = [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512];

    /// Name used as the key in a target's `hashes` map
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Parse a metadata algorithm name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            other => Err(Error::UnsupportedDigest(other.to_string())),
        }
    }

    /// Digest size in bytes
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    fn backend(&self) -> &'static digest::Algorithm {
        match self {
            DigestAlgorithm::Sha256 => &SHA256,
            DigestAlgorithm::Sha512 => &SHA512,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash data with the given algorithm
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    digest::digest(algorithm.backend(), data).as_ref().to_vec()
}

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = digest::digest(&SHA256, data);
    let mut result = [0u8; 32];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Hash data using SHA-512
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let digest = digest::digest(&SHA512, data);
    let mut result = [0u8; 64];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Incremental hasher feeding every [`DigestAlgorithm`] at once
///
/// Also counts the bytes seen, so a single pass over a target yields both
/// its length and all of its recorded digests.
pub struct MultiHasher {
    contexts: Vec<(DigestAlgorithm, Context)>,
    length: u64,
}

impl MultiHasher {
    /// Create a hasher over [`DigestAlgorithm::ALL`]
    pub fn new() -> Self {
        Self::with_algorithms(&DigestAlgorithm::ALL)
    }

    /// Create a hasher over a chosen set of algorithms
    pub fn with_algorithms(algorithms: &[DigestAlgorithm]) -> Self {
        Self {
            contexts: algorithms
                .iter()
                .map(|alg| (*alg, Context::new(alg.backend())))
                .collect(),
            length: 0,
        }
    }

    /// Update the hasher with data
    pub fn update(&mut self, data: &[u8]) {
        for (_, ctx) in &mut self.contexts {
            ctx.update(data);
        }
        self.length += data.len() as u64;
    }

    /// Number of bytes hashed so far
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Finalize, returning the byte count and one digest per algorithm
    pub fn finalize(self) -> (u64, Vec<(DigestAlgorithm, Vec<u8>)>) {
        let digests = self
            .contexts
            .into_iter()
            .map(|(alg, ctx)| (alg, ctx.finish().as_ref().to_vec()))
            .collect();
        (self.length, digests)
    }
}

impl Default for MultiHasher {
    fn default() -> Self {
        Self::new()
    }
}
