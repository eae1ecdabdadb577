//! Signing keys used to sign role metadata

use tuft_crypto::{KeyPair, Signature, SigningScheme};
use tuft_types::{KeyId, PublicKey};

use crate::error::Result;

/// A key that can sign role metadata
///
/// Implementations only sign bytes; building the canonical payload and
/// attaching the signature is done by [`crate::RoleRecord::sign`].
pub trait Signer: Send + Sync {
    /// Id of the public half, as listed in root metadata
    fn key_id(&self) -> &KeyId;

    /// Public half, as listed in root metadata
    fn public_key(&self) -> &PublicKey;

    /// Sign `data`
    fn sign(&self, data: &[u8]) -> Result<Signature>;
}

/// In-memory key pair
pub struct SigningKey {
    key_pair: KeyPair,
    public_key: PublicKey,
    key_id: KeyId,
}

impl SigningKey {
    /// Wrap an existing key pair
    pub fn new(key_pair: KeyPair) -> Result<Self> {
        let public_key = PublicKey::from_key_pair(&key_pair);
        let key_id = public_key.key_id()?;
        Ok(Self {
            key_pair,
            public_key,
            key_id,
        })
    }

    /// Fresh random key
    pub fn generate(scheme: SigningScheme) -> Result<Self> {
        Self::new(KeyPair::generate(scheme)?)
    }

    /// Key from PKCS#8 DER bytes
    pub fn from_pkcs8(scheme: SigningScheme, der: &[u8]) -> Result<Self> {
        Self::new(KeyPair::from_pkcs8(scheme, der)?)
    }

    pub fn scheme(&self) -> SigningScheme {
        self.key_pair.scheme()
    }
}

impl Signer for SigningKey {
    fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(&self, data: &[u8]) -> Result<Signature> {
        Ok(self.key_pair.sign(data)?)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("scheme", &self.key_pair.scheme())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_signs() {
        let key = SigningKey::generate(SigningScheme::Ed25519).unwrap();
        let sig = key.sign(b"payload").unwrap();
        let vk = key.public_key().verification_key().unwrap();
        assert!(vk.verify(b"payload", sig.as_bytes()).is_ok());
        assert_eq!(key.key_id(), &key.public_key().key_id().unwrap());
    }

    #[test]
    fn test_pkcs8_import_keeps_identity() {
        let der = KeyPair::generate_pkcs8(SigningScheme::EcdsaP256Sha256).unwrap();
        let a = SigningKey::from_pkcs8(SigningScheme::EcdsaP256Sha256, &der).unwrap();
        let b = SigningKey::from_pkcs8(SigningScheme::EcdsaP256Sha256, &der).unwrap();
        assert_eq!(a.key_id(), b.key_id());
        assert_eq!(a.scheme(), SigningScheme::EcdsaP256Sha256);
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = SigningKey::generate(SigningScheme::Ed25519).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("key_id"));
        assert!(!debug.contains("key_pair"));
    }
}
