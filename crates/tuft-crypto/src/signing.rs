//! Key generation and signing using aws-lc-rs

use crate::error::{Error, Result};
use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair as AwsKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
        ECDSA_P384_SHA384_ASN1_SIGNING,
    },
};

/// A cryptographic signature
///
/// Wraps raw signature bytes. Role metadata stores signatures hex encoded,
/// see [`Signature::to_hex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a new Signature from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a hex encoded signature
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s)?))
    }

    /// Get the raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Get the length of the signature in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the signature is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the signature as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Encode the signature as base64
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Supported signing schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningScheme {
    /// Ed25519
    Ed25519,
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
}

impl SigningScheme {
    /// Key type string as written into root metadata
    pub fn keytype(&self) -> &'static str {
        match self {
            SigningScheme::Ed25519 => "ed25519",
            SigningScheme::EcdsaP256Sha256 | SigningScheme::EcdsaP384Sha384 => "ecdsa",
        }
    }

    /// Scheme string as written into root metadata
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::Ed25519 => "ed25519",
            SigningScheme::EcdsaP256Sha256 => "ecdsa-sha2-nistp256",
            SigningScheme::EcdsaP384Sha384 => "ecdsa-sha2-nistp384",
        }
    }

    /// Resolve the scheme from a metadata key's `keytype` and `scheme` fields
    pub fn from_metadata(keytype: &str, scheme: &str) -> Result<Self> {
        match (keytype, scheme) {
            ("ed25519", "ed25519") => Ok(SigningScheme::Ed25519),
            ("ecdsa" | "ecdsa-sha2-nistp256", "ecdsa-sha2-nistp256") => {
                Ok(SigningScheme::EcdsaP256Sha256)
            }
            ("ecdsa" | "ecdsa-sha2-nistp384", "ecdsa-sha2-nistp384") => {
                Ok(SigningScheme::EcdsaP384Sha384)
            }
            _ => Err(Error::UnsupportedScheme {
                keytype: keytype.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A key pair for signing role metadata
pub enum KeyPair {
    /// Ed25519 key pair
    Ed25519(Ed25519KeyPair),
    /// ECDSA P-256 key pair
    EcdsaP256(EcdsaKeyPair),
    /// ECDSA P-384 key pair
    EcdsaP384(EcdsaKeyPair),
}

impl KeyPair {
    /// Generate a new key pair for the given scheme
    pub fn generate(scheme: SigningScheme) -> Result<Self> {
        let pkcs8 = Self::generate_pkcs8(scheme)?;
        Self::from_pkcs8(scheme, &pkcs8)
    }

    /// Generate a new Ed25519 key pair
    pub fn generate_ed25519() -> Result<Self> {
        Self::generate(SigningScheme::Ed25519)
    }

    /// Generate a new ECDSA P-256 key pair
    pub fn generate_ecdsa_p256() -> Result<Self> {
        Self::generate(SigningScheme::EcdsaP256Sha256)
    }

    /// Generate a fresh private key and return it PKCS#8 (DER) encoded
    ///
    /// The returned document can be stored and later turned back into a
    /// key pair with [`KeyPair::from_pkcs8`].
    pub fn generate_pkcs8(scheme: SigningScheme) -> Result<Vec<u8>> {
        let rng = SystemRandom::new();
        let document = match scheme {
            SigningScheme::Ed25519 => Ed25519KeyPair::generate_pkcs8(&rng),
            SigningScheme::EcdsaP256Sha256 => {
                EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            }
            SigningScheme::EcdsaP384Sha384 => {
                EcdsaKeyPair::generate_pkcs8(&ECDSA_P384_SHA384_ASN1_SIGNING, &rng)
            }
        }
        .map_err(|_| Error::KeyGeneration(format!("failed to generate {} key", scheme)))?;
        Ok(document.as_ref().to_vec())
    }

    /// Load a key pair from a PKCS#8 (DER) document
    pub fn from_pkcs8(scheme: SigningScheme, pkcs8: &[u8]) -> Result<Self> {
        Ok(match scheme {
            SigningScheme::Ed25519 => KeyPair::Ed25519(Ed25519KeyPair::from_pkcs8(pkcs8)?),
            SigningScheme::EcdsaP256Sha256 => KeyPair::EcdsaP256(EcdsaKeyPair::from_pkcs8(
                &ECDSA_P256_SHA256_ASN1_SIGNING,
                pkcs8,
            )?),
            SigningScheme::EcdsaP384Sha384 => KeyPair::EcdsaP384(EcdsaKeyPair::from_pkcs8(
                &ECDSA_P384_SHA384_ASN1_SIGNING,
                pkcs8,
            )?),
        })
    }

    /// Get the signing scheme for this key pair
    pub fn scheme(&self) -> SigningScheme {
        match self {
            KeyPair::Ed25519(_) => SigningScheme::Ed25519,
            KeyPair::EcdsaP256(_) => SigningScheme::EcdsaP256Sha256,
            KeyPair::EcdsaP384(_) => SigningScheme::EcdsaP384Sha384,
        }
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> &[u8] {
        match self {
            KeyPair::Ed25519(kp) => kp.public_key().as_ref(),
            KeyPair::EcdsaP256(kp) => kp.public_key().as_ref(),
            KeyPair::EcdsaP384(kp) => kp.public_key().as_ref(),
        }
    }

    /// Sign data with this key pair
    pub fn sign(&self, data: &[u8]) -> Result<Signature> {
        match self {
            KeyPair::Ed25519(kp) => Ok(Signature::new(kp.sign(data).as_ref().to_vec())),
            KeyPair::EcdsaP256(kp) | KeyPair::EcdsaP384(kp) => {
                let rng = SystemRandom::new();
                let sig = kp
                    .sign(&rng, data)
                    .map_err(|_| Error::Signing(format!("{} signing failed", self.scheme())))?;
                Ok(Signature::new(sig.as_ref().to_vec()))
            }
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("scheme", &self.scheme())
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_generate_ed25519() {
        let kp = KeyPair::generate_ed25519().unwrap();
        assert_eq!(kp.public_key_bytes().len(), 32);
        assert_eq!(kp.scheme(), SigningScheme::Ed25519);
    }

    #[test]
    fn test_sign_ed25519() {
        let kp = KeyPair::generate_ed25519().unwrap();
        let sig = kp.sign(b"test data to sign").unwrap();
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_ecdsa_p256_public_key_len() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let bytes = kp.public_key_bytes();
        // Uncompressed point: 0x04 || X || Y
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 0x04);
    }

    #[test]
    fn test_pkcs8_reload_keeps_public_key() {
        let pkcs8 = KeyPair::generate_pkcs8(SigningScheme::Ed25519).unwrap();
        let a = KeyPair::from_pkcs8(SigningScheme::Ed25519, &pkcs8).unwrap();
        let b = KeyPair::from_pkcs8(SigningScheme::Ed25519, &pkcs8).unwrap();
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_pkcs8_wrong_scheme_rejected() {
        let pkcs8 = KeyPair::generate_pkcs8(SigningScheme::Ed25519).unwrap();
        assert!(KeyPair::from_pkcs8(SigningScheme::EcdsaP256Sha256, &pkcs8).is_err());
    }

    #[rstest]
    #[case(SigningScheme::Ed25519)]
    #[case(SigningScheme::EcdsaP256Sha256)]
    #[case(SigningScheme::EcdsaP384Sha384)]
    fn test_scheme_metadata_names(#[case] scheme: SigningScheme) {
        let parsed = SigningScheme::from_metadata(scheme.keytype(), scheme.name()).unwrap();
        assert_eq!(parsed, scheme);
    }

    #[test]
    fn test_unknown_scheme() {
        assert!(SigningScheme::from_metadata("rsa", "rsassa-pss-sha256").is_err());
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Signature::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(sig.to_hex(), "deadbeef");
        assert_eq!(Signature::from_hex("deadbeef").unwrap(), sig);
    }
}
