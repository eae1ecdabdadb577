//! The root of trust: root metadata plus the repository's signing keys

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tuft_types::{RoleKind, RootMeta};

use crate::error::{Error, Result};
use crate::keys::KeyManager;
use crate::record::RoleRecord;
use crate::strategy::{RolesStrategy, RootSource};

/// Root metadata and the keys that sign the repository
#[derive(Debug, Clone)]
pub struct RepoSeed {
    root: RoleRecord,
    keys: Arc<KeyManager>,
}

impl RepoSeed {
    /// Pair an existing root record with keys
    pub fn new(root: RoleRecord, keys: Arc<KeyManager>) -> Result<Self> {
        if root.kind() != RoleKind::Root {
            return Err(Error::RoleTypeMismatch {
                expected: RoleKind::Root,
                found: root.kind(),
            });
        }
        Ok(Self { root, keys })
    }

    /// Create and sign a new root authorizing the keys in `keys`
    ///
    /// Every role gets the key registered under its own name. With
    /// `allow_parent_keys` a role also accepts the keys of every role it
    /// depends on, so for example the root key can sign targets.
    pub fn make(
        strategy: &RolesStrategy,
        keys: Arc<KeyManager>,
        consistent: bool,
        allow_parent_keys: bool,
    ) -> Result<Self> {
        let registry = strategy.registry();
        let mut root = strategy.create_empty_root(consistent)?;

        {
            let meta = root.signed_mut().as_root_mut()?;
            authorize(meta, &keys, RoleKind::Root, RoleKind::Root)?;
            for spec in registry.non_root() {
                authorize(meta, &keys, spec.kind, spec.kind)?;
                if allow_parent_keys {
                    for parent in registry.parents(spec.kind) {
                        authorize(meta, &keys, parent, spec.kind)?;
                    }
                }
            }
        }

        keys.sign(&mut root)?;
        info!(consistent, version = root.version(), "created root");
        Ok(Self { root, keys })
    }

    /// Read an existing root, without signing it
    pub fn load(
        strategy: &RolesStrategy,
        source: RootSource,
        keys: Arc<KeyManager>,
        consistent: bool,
    ) -> Result<Self> {
        let root = strategy.load_root(source, consistent)?;
        Ok(Self { root, keys })
    }

    pub fn root(&self) -> &RoleRecord {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RoleRecord {
        &mut self.root
    }

    pub fn keys(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Whether the root enables versioned file names
    pub fn is_consistent(&self) -> Result<bool> {
        Ok(self.root.signed().as_root()?.consistent_snapshot)
    }

    /// Sign the root if it changed
    pub fn sign(&mut self) -> Result<bool> {
        self.keys.sign(&mut self.root)
    }

    /// Write the root into `dir` as `root.<ext>`
    pub fn save(&mut self, strategy: &RolesStrategy, dir: &Path) -> Result<PathBuf> {
        let consistent = self.is_consistent()?;
        strategy.save(dir, &mut self.root, consistent)
    }
}

/// Authorize the key registered for `signer` to sign `role`
fn authorize(
    meta: &mut RootMeta,
    keys: &KeyManager,
    signer: RoleKind,
    role: RoleKind,
) -> Result<()> {
    let key = keys.require(signer.name())?;
    meta.add_key(key.public_key().clone(), role.name())?;
    Ok(())
}
