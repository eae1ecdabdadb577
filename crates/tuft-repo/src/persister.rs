//! Reading and writing role files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use tuft_types::Metadata;

use crate::error::{Error, Result};
use crate::naming::{self, DiscoveredFile};
use crate::record::RoleRecord;
use crate::registry::RoleSpec;
use crate::serializer::{JsonSerializer, Serializer};

/// Loads and saves [`RoleRecord`]s through a [`Serializer`]
#[derive(Clone)]
pub struct RolePersister {
    serializer: Arc<dyn Serializer>,
}

impl RolePersister {
    pub fn new(serializer: Arc<dyn Serializer>) -> Self {
        Self { serializer }
    }

    /// Persister writing tab-indented JSON
    pub fn json() -> Self {
        Self::new(Arc::new(JsonSerializer))
    }

    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    /// Extension of every role file
    pub fn extension(&self) -> &str {
        self.serializer.file_extension()
    }

    /// Name of `spec`'s file at `version`
    pub fn file_name(&self, spec: &RoleSpec, version: u64, consistent: bool) -> String {
        naming::file_name(
            spec.name(),
            version,
            spec.is_versioned(consistent),
            self.extension(),
        )
    }

    /// Write `record` into `dir` and clear its saving flag
    ///
    /// A record that still needs signing is rejected with
    /// [`Error::UnsignedRole`].
    pub fn save(&self, dir: &Path, record: &mut RoleRecord, consistent: bool) -> Result<PathBuf> {
        if record.needs_signing() {
            return Err(Error::UnsignedRole {
                role: record.kind(),
            });
        }

        std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
        let path = dir.join(record.file_name(self.extension(), consistent));
        let data = self.serializer.encode(&record.metadata().to_value()?)?;
        std::fs::write(&path, data).map_err(Error::io(&path))?;
        record.mark_saved();

        info!(
            role = record.name(),
            version = record.version(),
            "wrote {}",
            path.display()
        );
        Ok(path)
    }

    /// Files of `spec` present in `dir`, ascending by version
    pub fn discover_versions(
        &self,
        dir: &Path,
        spec: &RoleSpec,
        consistent: bool,
    ) -> Result<Vec<DiscoveredFile>> {
        let names = naming::list_file_names(dir)?;
        naming::discover_versions(
            &names,
            spec.name(),
            self.extension(),
            spec.is_versioned(consistent),
        )
    }

    /// Load `spec` from `dir`
    ///
    /// With a `version` the file of that version is read and its payload must
    /// carry the same version. Without one, the latest file found by
    /// discovery is read. `Ok(None)` means there is no such file.
    pub fn load_from_repo(
        &self,
        dir: &Path,
        spec: &RoleSpec,
        version: Option<u64>,
        consistent: bool,
    ) -> Result<Option<RoleRecord>> {
        match version {
            Some(version) => {
                let path = dir.join(self.file_name(spec, version, consistent));
                self.load_from_file(spec, &path, Some(version))
            }
            None => {
                let Some(found) = self
                    .discover_versions(dir, spec, consistent)?
                    .pop()
                else {
                    debug!(role = spec.name(), "no file in {}", dir.display());
                    return Ok(None);
                };
                self.load_from_file(spec, &dir.join(&found.file_name), found.version)
            }
        }
    }

    /// Load `spec` from `path`; `Ok(None)` if the file does not exist
    pub fn load_from_file(
        &self,
        spec: &RoleSpec,
        path: &Path,
        expected: Option<u64>,
    ) -> Result<Option<RoleRecord>> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path)(e)),
        };
        let origin = path.display().to_string();
        self.load_from_data(spec, &data, expected, &origin).map(Some)
    }

    /// Decode a role file's contents
    pub fn load_from_data(
        &self,
        spec: &RoleSpec,
        data: &[u8],
        expected: Option<u64>,
        origin: &str,
    ) -> Result<RoleRecord> {
        let value = self.serializer.decode(data)?;
        self.load_from_value(spec, value, expected, origin)
    }

    /// Build a record from an already decoded structure
    pub fn load_from_value(
        &self,
        spec: &RoleSpec,
        value: Value,
        expected: Option<u64>,
        origin: &str,
    ) -> Result<RoleRecord> {
        let record = RoleRecord::from_metadata(spec, Metadata::from_value(value)?)?;
        if let Some(expected) = expected {
            if record.version() != expected {
                warn!(
                    role = spec.name(),
                    expected,
                    found = record.version(),
                    "payload version disagrees with {origin}"
                );
                return Err(Error::VersionMismatch {
                    role: spec.kind,
                    file: origin.to_string(),
                    expected,
                    found: record.version(),
                });
            }
        }
        debug!(role = spec.name(), version = record.version(), "loaded {origin}");
        Ok(record)
    }

    /// Load `spec` from `dir` or create it empty when absent
    pub fn load_or_create(
        &self,
        dir: Option<&Path>,
        spec: &RoleSpec,
        version: Option<u64>,
        consistent: bool,
    ) -> Result<RoleRecord> {
        if let Some(dir) = dir {
            if let Some(record) = self.load_from_repo(dir, spec, version, consistent)? {
                return Ok(record);
            }
        }
        info!(role = spec.name(), "creating empty metadata");
        Ok(RoleRecord::create_empty(spec))
    }
}

impl Default for RolePersister {
    fn default() -> Self {
        Self::json()
    }
}

impl std::fmt::Debug for RolePersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RolePersister")
            .field("extension", &self.extension())
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

    fn signed_record(kind: RoleKind) -> RoleRecord {
        let key = SigningKey::generate(SigningScheme::Ed25519).unwrap();
        let mut record = RoleRecord::create_empty(RoleRegistry::standard().get(kind));
        record.sign(&key).unwrap();
        record
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let persister = RolePersister::json();
        let registry = RoleRegistry::standard();
        let spec = registry.get(RoleKind::Targets);

        let mut record = signed_record(RoleKind::Targets);
        let path = persister.save(dir.path(), &mut record, true).unwrap();
        assert_eq!(path, dir.path().join("1.targets.json"));
        assert!(!record.needs_saving());

        let loaded = persister
            .load_from_repo(dir.path(), spec, Some(1), true)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.metadata(), record.metadata());
        assert!(!loaded.needs_signing());

        let latest = persister
            .load_from_repo(dir.path(), spec, None, true)
            .unwrap()
            .unwrap();
        assert_eq!(latest.version(), 1);
    }

    #[test]
    fn test_refuses_unsigned() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = RoleRecord::create_empty(RoleRegistry::standard().get(RoleKind::Snapshot));
        let err = RolePersister::json()
            .save(dir.path(), &mut record, false)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsignedRole {
                role: RoleKind::Snapshot
            }
        ));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RoleRegistry::standard();
        let persister = RolePersister::json();
        let spec = registry.get(RoleKind::Timestamp);
        assert!(persister
            .load_from_repo(dir.path(), spec, None, true)
            .unwrap()
            .is_none());
        assert!(persister
            .load_from_repo(dir.path(), spec, Some(3), true)
            .unwrap()
            .is_none());

        let created = persister
            .load_or_create(Some(dir.path()), spec, None, true)
            .unwrap();
        assert_eq!(created.version(), 0);
        assert!(created.needs_signing());
    }

    #[test]
    fn test_expected_version_checked() {
        let persister = RolePersister::json();
        let registry = RoleRegistry::standard();
        let record = signed_record(RoleKind::Timestamp);
        let data = persister
            .serializer()
            .encode(&record.metadata().to_value().unwrap())
            .unwrap();

        let spec = registry.get(RoleKind::Timestamp);
        assert!(persister.load_from_data(spec, &data, Some(1), "mem").is_ok());
        assert!(matches!(
            persister.load_from_data(spec, &data, Some(2), "mem"),
            Err(Error::VersionMismatch {
                role: RoleKind::Timestamp,
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_role_type_checked() {
        let persister = RolePersister::json();
        let registry = RoleRegistry::standard();
        let record = signed_record(RoleKind::Timestamp);
        let value = record.metadata().to_value().unwrap();
        assert!(matches!(
            persister.load_from_value(registry.get(RoleKind::Snapshot), value, None, "mem"),
            Err(Error::RoleTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_simple_mode_names() {
        let dir = tempfile::tempdir().unwrap();
        let persister = RolePersister::json();
        let mut record = signed_record(RoleKind::Snapshot);
        let path = persister.save(dir.path(), &mut record, false).unwrap();
        assert_eq!(path, dir.path().join("snapshot.json"));

        let registry = RoleRegistry::standard();
        let loaded = persister
            .load_from_repo(dir.path(), registry.get(RoleKind::Snapshot), Some(1), false)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.version(), 1);
    }
}
