//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use crate::signing::SigningScheme;
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    ED25519,
};

/// A public key for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    /// Raw public key bytes
    pub bytes: Vec<u8>,
    /// The scheme to use for verification
    pub scheme: SigningScheme,
}

impl VerificationKey {
    /// Create a new verification key
    pub fn new(bytes: Vec<u8>, scheme: SigningScheme) -> Self {
        Self { bytes, scheme }
    }

    /// Verify a signature over data
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let algorithm: &'static dyn VerificationAlgorithm = match self.scheme {
            SigningScheme::Ed25519 => &ED25519,
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
        };
        UnparsedPublicKey::new(algorithm, &self.bytes)
            .verify(data, signature)
            .map_err(|_| Error::Verification(format!("{} signature invalid", self.scheme)))
    }
}

/// Verify a signature using the specified scheme
pub fn verify_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    VerificationKey::new(public_key.to_vec(), scheme).verify(data, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::KeyPair;

    #[test]
    fn test_verify_ecdsa_p256() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let data = b"test data";
        let sig = kp.sign(data).unwrap();

        let vk = VerificationKey::new(kp.public_key_bytes().to_vec(), kp.scheme());
        assert!(vk.verify(data, sig.as_bytes()).is_ok());
    }

    #[test]
    fn test_verify_ed25519() {
        let kp = KeyPair::generate_ed25519().unwrap();
        let data = b"test data";
        let sig = kp.sign(data).unwrap();

        assert!(verify_signature(kp.public_key_bytes(), data, sig.as_bytes(), kp.scheme()).is_ok());
    }

    #[test]
    fn test_verify_bad_signature() {
        let kp = KeyPair::generate_ed25519().unwrap();
        let vk = VerificationKey::new(kp.public_key_bytes().to_vec(), SigningScheme::Ed25519);
        assert!(vk.verify(b"test data", &[0u8; 64]).is_err());
    }

    #[test]
    fn test_verify_wrong_data() {
        let kp = KeyPair::generate_ed25519().unwrap();
        let sig = kp.sign(b"test data").unwrap();

        let vk = VerificationKey::new(kp.public_key_bytes().to_vec(), SigningScheme::Ed25519);
        assert!(vk.verify(b"wrong data", sig.as_bytes()).is_err());
    }
}
