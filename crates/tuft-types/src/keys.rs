//! Public keys as listed in root metadata

use crate::encoding::{Hex, KeyId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tuft_crypto::{KeyPair, SigningScheme, VerificationKey};

/// Key material of a [`PublicKey`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVal {
    /// Hex encoded raw public key
    pub public: Hex,
}

/// A public key authorized by root metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// Key type, e.g. `ed25519` or `ecdsa`
    pub keytype: String,
    /// Signature scheme, e.g. `ed25519` or `ecdsa-sha2-nistp256`
    pub scheme: String,
    /// Key material
    pub keyval: KeyVal,
}

impl PublicKey {
    /// Describe raw public key bytes for the given scheme
    pub fn new(scheme: SigningScheme, public_key: &[u8]) -> Self {
        Self {
            keytype: scheme.keytype().to_string(),
            scheme: scheme.name().to_string(),
            keyval: KeyVal {
                public: Hex::encode(public_key),
            },
        }
    }

    /// Public half of a signing key pair
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        Self::new(key_pair.scheme(), key_pair.public_key_bytes())
    }

    /// Key id: hex SHA-256 over the key's canonical JSON encoding
    pub fn key_id(&self) -> Result<KeyId> {
        let canonical = serde_json::to_vec(&serde_json::to_value(self)?)?;
        Ok(KeyId::from_digest(&tuft_crypto::sha256(&canonical)))
    }

    /// Signing scheme named by this key
    pub fn signing_scheme(&self) -> Result<SigningScheme> {
        Ok(SigningScheme::from_metadata(&self.keytype, &self.scheme)?)
    }

    /// Verification key for checking signatures made by this key
    pub fn verification_key(&self) -> Result<VerificationKey> {
        Ok(VerificationKey::new(
            self.keyval.public.decode()?,
            self.signing_scheme()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_id_is_stable() {
        let kp = KeyPair::generate_ed25519().unwrap();
        let a = PublicKey::from_key_pair(&kp);
        let b = PublicKey::new(SigningScheme::Ed25519, kp.public_key_bytes());
        assert_eq!(a.key_id().unwrap(), b.key_id().unwrap());
        assert_eq!(a.key_id().unwrap().as_str().len(), 64);
    }

    #[test]
    fn test_distinct_keys_have_distinct_ids() {
        let a = PublicKey::from_key_pair(&KeyPair::generate_ed25519().unwrap());
        let b = PublicKey::from_key_pair(&KeyPair::generate_ed25519().unwrap());
        assert_ne!(a.key_id().unwrap(), b.key_id().unwrap());
    }

    #[test]
    fn test_verification_key_checks_signature() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let key = PublicKey::from_key_pair(&kp);
        assert_eq!(key.keytype, "ecdsa");

        let sig = kp.sign(b"payload").unwrap();
        let vk = key.verification_key().unwrap();
        assert!(vk.verify(b"payload", sig.as_bytes()).is_ok());
    }
}
