//! Mutable wrapper around one role's signed metadata

use tracing::debug;
use tuft_types::{Hex, Metadata, MetadataSignature, RoleKind, Signed};

use crate::error::{Error, Result};
use crate::naming;
use crate::registry::RoleSpec;
use crate::signer::Signer;

/// One role's metadata plus its signing and saving state
///
/// A record is created empty (version 0, needs signing) or loaded from
/// storage (clean). Every mutation of the payload through
/// [`RoleRecord::signed_mut`] marks it as needing a signature, and a record
/// that needs a signature can't be saved.
#[derive(Debug, Clone)]
pub struct RoleRecord {
    spec: RoleSpec,
    metadata: Metadata,
    needs_signing: bool,
    needs_saving: bool,
}

impl RoleRecord {
    /// Unsigned empty payload at version 0
    pub fn create_empty(spec: &RoleSpec) -> Self {
        Self {
            spec: spec.clone(),
            metadata: Metadata::new(Signed::empty(spec.kind, spec.expiry_from_now())),
            needs_signing: true,
            needs_saving: true,
        }
    }

    /// Wrap metadata read from storage
    pub fn from_metadata(spec: &RoleSpec, metadata: Metadata) -> Result<Self> {
        let found = metadata.signed.kind();
        if found != spec.kind {
            return Err(Error::RoleTypeMismatch {
                expected: spec.kind,
                found,
            });
        }
        Ok(Self {
            spec: spec.clone(),
            metadata,
            needs_signing: false,
            needs_saving: false,
        })
    }

    /// Registry entry for this role
    pub fn spec(&self) -> &RoleSpec {
        &self.spec
    }

    /// Role kind of the payload
    pub fn kind(&self) -> RoleKind {
        self.spec.kind
    }

    /// Role name, e.g. `targets`
    pub fn name(&self) -> &'static str {
        self.spec.name()
    }

    /// The signed envelope
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Consume the record, returning the envelope
    pub fn into_metadata(self) -> Metadata {
        self.metadata
    }

    /// Read-only payload
    pub fn signed(&self) -> &Signed {
        &self.metadata.signed
    }

    /// Mutable payload; the record will need signing afterwards
    pub fn signed_mut(&mut self) -> &mut Signed {
        self.mark_dirty();
        &mut self.metadata.signed
    }

    /// Version recorded in the payload
    pub fn version(&self) -> u64 {
        self.metadata.signed.version()
    }

    /// Raise the version; lowering it is an error and leaves it unchanged
    pub fn set_version(&mut self, version: u64) -> Result<()> {
        let current = self.version();
        if version < current {
            return Err(Error::VersionDecrease {
                role: self.kind(),
                current,
                requested: version,
            });
        }
        if version > current {
            self.metadata.signed.set_version(version);
            self.mark_dirty();
        }
        Ok(())
    }

    /// Increment the version by one
    pub fn bump_version(&mut self) -> Result<()> {
        let next = self.next_version()?;
        self.metadata.signed.set_version(next);
        self.mark_dirty();
        Ok(())
    }

    fn next_version(&self) -> Result<u64> {
        let version = self.version();
        version.checked_add(1).ok_or(Error::VersionOverflow {
            role: self.kind(),
            version,
        })
    }

    /// Flag the record for signing and saving
    pub fn mark_dirty(&mut self) {
        self.needs_signing = true;
        self.needs_saving = true;
    }

    /// Whether the payload changed since it was last signed
    pub fn needs_signing(&self) -> bool {
        self.needs_signing
    }

    /// Whether the signed payload has not been written yet
    pub fn needs_saving(&self) -> bool {
        self.needs_saving
    }

    pub(crate) fn mark_saved(&mut self) {
        self.needs_saving = false;
    }

    /// File name of the current version
    pub fn file_name(&self, ext: &str, consistent: bool) -> String {
        naming::file_name(
            self.name(),
            self.version(),
            self.spec.is_versioned(consistent),
            ext,
        )
    }

    /// Bump the version, refresh the expiry and sign with `signer`
    ///
    /// Returns `false` without touching anything if the record is clean. On
    /// error the record is left as it was.
    pub fn sign(&mut self, signer: &dyn Signer) -> Result<bool> {
        if !self.needs_signing {
            return Ok(false);
        }

        let mut signed = self.metadata.signed.clone();
        signed.set_version(self.next_version()?);
        signed.set_expires(self.spec.expiry_from_now());
        let signature = signer.sign(&signed.canonical_bytes()?)?;

        self.metadata.signed = signed;
        self.metadata.signatures = vec![MetadataSignature {
            keyid: signer.key_id().clone(),
            sig: Hex::encode(signature.as_bytes()),
        }];
        self.needs_signing = false;
        self.needs_saving = true;
        debug!(role = self.name(), version = self.version(), "signed");
        Ok(true)
    }
}
