//! Role name to signing key mapping

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::RoleRecord;
use crate::signer::Signer;

/// Signing keys by role name
///
/// Built once and then shared read-only between the seed and the builder.
#[derive(Clone, Default)]
pub struct KeyManager {
    keys: BTreeMap<String, Arc<dyn Signer>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under every name in `roles`
    pub fn from_single_key<I, S>(key: Arc<dyn Signer>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = roles
            .into_iter()
            .map(|role| (role.into(), Arc::clone(&key)))
            .collect();
        Self { keys }
    }

    /// Register `key` for `role`, returning the key it replaces
    pub fn insert(
        &mut self,
        role: impl Into<String>,
        key: Arc<dyn Signer>,
    ) -> Option<Arc<dyn Signer>> {
        self.keys.insert(role.into(), key)
    }

    /// Builder-style [`KeyManager::insert`]
    pub fn with_key(mut self, role: impl Into<String>, key: Arc<dyn Signer>) -> Self {
        self.insert(role, key);
        self
    }

    pub fn get(&self, role: &str) -> Option<&Arc<dyn Signer>> {
        self.keys.get(role)
    }

    /// Key for `role`, or [`Error::MissingKey`]
    pub fn require(&self, role: &str) -> Result<&Arc<dyn Signer>> {
        self.keys.get(role).ok_or_else(|| Error::MissingKey {
            role: role.to_string(),
        })
    }

    pub fn contains(&self, role: &str) -> bool {
        self.keys.contains_key(role)
    }

    /// Role names with a registered key, sorted
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Signer>)> {
        self.keys.iter().map(|(role, key)| (role.as_str(), key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sign `record` with the key of its role if it needs signing
    ///
    /// A clean record is left alone and `false` is returned, whether or not
    /// a key is registered for it.
    pub fn sign(&self, record: &mut RoleRecord) -> Result<bool> {
        if !record.needs_signing() {
            return Ok(false);
        }
        let key = self.require(record.name())?;
        record.sign(key.as_ref())
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.keys.iter().map(|(role, key)| (role, key.key_id())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RoleRegistry;
    use crate::signer::SigningKey;
    use tuft_crypto::SigningScheme;
    use tuft_types::RoleKind;

    fn key() -> Arc<dyn Signer> {
        Arc::new(SigningKey::generate(SigningScheme::Ed25519).unwrap())
    }

    #[test]
    fn test_single_key_covers_every_role() {
        let registry = RoleRegistry::standard();
        let keys = registry.key_manager_from_single_key(key());
        assert_eq!(keys.len(), 4);
        for name in registry.names() {
            assert!(keys.contains(name));
        }
        let ids: Vec<_> = keys.iter().map(|(_, k)| k.key_id().clone()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_insert_replaces() {
        let mut keys = KeyManager::new().with_key("targets", key());
        let replacement = key();
        let old = keys.insert("targets", Arc::clone(&replacement)).unwrap();
        assert_ne!(old.key_id(), replacement.key_id());
        assert_eq!(keys.get("targets").unwrap().key_id(), replacement.key_id());
        assert_eq!(keys.roles().collect::<Vec<_>>(), vec!["targets"]);
    }

    #[test]
    fn test_sign_requires_key_only_when_dirty() {
        let registry = RoleRegistry::standard();
        let keys = KeyManager::new().with_key("targets", key());

        let mut snapshot = RoleRecord::create_empty(registry.get(RoleKind::Snapshot));
        assert!(matches!(
            keys.sign(&mut snapshot),
            Err(Error::MissingKey { role }) if role == "snapshot"
        ));
        assert!(snapshot.needs_signing());

        let mut targets = RoleRecord::create_empty(registry.get(RoleKind::Targets));
        assert!(keys.sign(&mut targets).unwrap());
        assert!(!keys.sign(&mut targets).unwrap());

        let clean = KeyManager::new();
        assert!(!clean.sign(&mut targets).unwrap());
    }
}
