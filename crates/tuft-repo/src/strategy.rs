//! Reconciling a full role set from a repository directory
//!
//! Roles are resolved in dependency order. Timestamp is named simply and
//! found blindly; the snapshot version it references pins which snapshot is
//! read, and a pinned snapshot missing on disk is recreated empty. The
//! snapshot's metadata listing then names the file and version of every
//! remaining role. Any disagreement between file names, the snapshot
//! listing and payload versions aborts reconciliation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use tuft_types::{MetaFile, RoleKind};

use crate::error::{Error, Result};
use crate::naming;
use crate::persister::RolePersister;
use crate::record::RoleRecord;
use crate::registry::RoleRegistry;

/// Where to read root metadata from
#[derive(Debug, Clone)]
pub enum RootSource {
    /// A root file, or a directory to search for one
    Path(PathBuf),
    /// Encoded file contents
    Bytes(Vec<u8>),
    /// Already decoded structure
    Value(Value),
}

/// One record per role kind
#[derive(Debug, Clone)]
pub struct RoleSet {
    pub root: RoleRecord,
    pub targets: RoleRecord,
    pub snapshot: RoleRecord,
    pub timestamp: RoleRecord,
}

impl RoleSet {
    /// Assemble from a map that must hold every role kind
    pub fn from_map(mut records: BTreeMap<RoleKind, RoleRecord>) -> Result<Self> {
        let missing: Vec<RoleKind> = RoleKind::ALL
            .into_iter()
            .filter(|kind| !records.contains_key(kind))
            .collect();
        if !missing.is_empty() {
            return Err(Error::IncompleteRoles { missing });
        }

        let mut take = |kind: RoleKind| {
            records
                .remove(&kind)
                .ok_or(Error::IncompleteRoles { missing: vec![kind] })
        };
        Ok(Self {
            root: take(RoleKind::Root)?,
            targets: take(RoleKind::Targets)?,
            snapshot: take(RoleKind::Snapshot)?,
            timestamp: take(RoleKind::Timestamp)?,
        })
    }

    pub fn get(&self, kind: RoleKind) -> &RoleRecord {
        match kind {
            RoleKind::Root => &self.root,
            RoleKind::Targets => &self.targets,
            RoleKind::Snapshot => &self.snapshot,
            RoleKind::Timestamp => &self.timestamp,
        }
    }

    pub fn get_mut(&mut self, kind: RoleKind) -> &mut RoleRecord {
        match kind {
            RoleKind::Root => &mut self.root,
            RoleKind::Targets => &mut self.targets,
            RoleKind::Snapshot => &mut self.snapshot,
            RoleKind::Timestamp => &mut self.timestamp,
        }
    }

    /// Records in delegation order, root first
    pub fn iter(&self) -> impl Iterator<Item = &RoleRecord> {
        [&self.root, &self.targets, &self.snapshot, &self.timestamp].into_iter()
    }
}

/// Registry plus persister: everything needed to load and save a role set
#[derive(Debug, Clone, Default)]
pub struct RolesStrategy {
    registry: RoleRegistry,
    persister: RolePersister,
}

impl RolesStrategy {
    pub fn new(registry: RoleRegistry, persister: RolePersister) -> Self {
        Self {
            registry,
            persister,
        }
    }

    /// Stock roles, JSON files
    pub fn standard() -> Self {
        Self::new(RoleRegistry::standard(), RolePersister::json())
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn persister(&self) -> &RolePersister {
        &self.persister
    }

    /// Extension of every role file
    pub fn extension(&self) -> &str {
        self.persister.extension()
    }

    /// Name of `record`'s file at its current version
    pub fn file_name_for(&self, record: &RoleRecord, consistent: bool) -> String {
        record.file_name(self.extension(), consistent)
    }

    /// Load `kind` from `dir`, or create it empty
    pub fn load_or_create(
        &self,
        dir: Option<&Path>,
        kind: RoleKind,
        version: Option<u64>,
        consistent: bool,
    ) -> Result<RoleRecord> {
        self.persister
            .load_or_create(dir, self.registry.get(kind), version, consistent)
    }

    /// Write `record` into `dir`
    pub fn save(&self, dir: &Path, record: &mut RoleRecord, consistent: bool) -> Result<PathBuf> {
        self.persister.save(dir, record, consistent)
    }

    /// Unsigned root with the repository's naming mode recorded in it
    pub fn create_empty_root(&self, consistent: bool) -> Result<RoleRecord> {
        let mut root = RoleRecord::create_empty(self.registry.get(RoleKind::Root));
        root.signed_mut().as_root_mut()?.consistent_snapshot = consistent;
        Ok(root)
    }

    /// Read root metadata without signing it
    ///
    /// A directory is searched as described in [`naming::find_root_file`]
    /// using `consistent` as the repository mode.
    pub fn load_root(&self, source: RootSource, consistent: bool) -> Result<RoleRecord> {
        let spec = self.registry.get(RoleKind::Root);
        match source {
            RootSource::Path(path) => {
                let file = if path.is_dir() {
                    naming::find_root_file(&path, self.extension(), consistent)?
                        .ok_or_else(|| Error::RootNotFound { dir: path.clone() })?
                } else {
                    path
                };
                self.persister
                    .load_from_file(spec, &file, None)?
                    .ok_or(Error::RootNotFound { dir: file })
            }
            RootSource::Bytes(data) => self.persister.load_from_data(spec, &data, None, "<bytes>"),
            RootSource::Value(value) => self.persister.load_from_value(spec, value, None, "<value>"),
        }
    }

    /// Load or create every role by blind discovery, without cross-checks
    pub fn load_dumb(&self, dir: &Path, consistent: bool) -> Result<RoleSet> {
        let mut records = BTreeMap::new();
        for spec in self.registry.iter() {
            let record = self
                .persister
                .load_or_create(Some(dir), spec, None, consistent)?;
            records.insert(spec.kind, record);
        }
        RoleSet::from_map(records)
    }

    /// Reconcile the full role set from `dir`
    ///
    /// Without a directory every role is created empty.
    pub fn load_or_create_roles(&self, dir: Option<&Path>, consistent: bool) -> Result<RoleSet> {
        let Some(dir) = dir else {
            debug!("no repository directory, creating every role");
            let mut records = BTreeMap::new();
            for spec in self.registry.iter() {
                let record = match spec.kind {
                    RoleKind::Root => self.create_empty_root(consistent)?,
                    _ => RoleRecord::create_empty(spec),
                };
                records.insert(spec.kind, record);
            }
            return RoleSet::from_map(records);
        };

        let mut records = BTreeMap::new();

        let timestamp_spec = self.registry.get(RoleKind::Timestamp);
        let loaded_timestamp = self
            .persister
            .load_from_repo(dir, timestamp_spec, None, consistent)?;
        let pinned_snapshot = loaded_timestamp
            .as_ref()
            .map(|timestamp| -> Result<u64> {
                Ok(timestamp.signed().as_timestamp()?.snapshot_meta.version)
            })
            .transpose()?
            .filter(|version| *version > 0);
        let timestamp = match loaded_timestamp {
            Some(record) => {
                info!(version = record.version(), "loaded timestamp");
                record
            }
            None => {
                info!("creating timestamp");
                RoleRecord::create_empty(timestamp_spec)
            }
        };
        records.insert(RoleKind::Timestamp, timestamp);

        let snapshot = self.reconcile_snapshot(dir, pinned_snapshot, consistent)?;
        let listing = snapshot.signed().as_snapshot()?.meta.clone();
        records.insert(RoleKind::Snapshot, snapshot);

        for spec in self.registry.iter() {
            if records.contains_key(&spec.kind) {
                continue;
            }
            let record = self.reconcile_listed(dir, spec.kind, &listing, consistent)?;
            records.insert(spec.kind, record);
        }

        RoleSet::from_map(records)
    }

    fn reconcile_snapshot(
        &self,
        dir: &Path,
        pinned: Option<u64>,
        consistent: bool,
    ) -> Result<RoleRecord> {
        let spec = self.registry.get(RoleKind::Snapshot);
        match pinned {
            Some(version) => {
                match self
                    .persister
                    .load_from_repo(dir, spec, Some(version), consistent)?
                {
                    Some(record) => {
                        info!(version, "loaded pinned snapshot");
                        Ok(record)
                    }
                    None => {
                        warn!(version, "snapshot referenced by timestamp is missing, creating");
                        Ok(RoleRecord::create_empty(spec))
                    }
                }
            }
            None => match self.persister.load_from_repo(dir, spec, None, consistent)? {
                Some(record) => {
                    info!(version = record.version(), "loaded snapshot");
                    Ok(record)
                }
                None => {
                    info!("creating snapshot");
                    Ok(RoleRecord::create_empty(spec))
                }
            },
        }
    }

    fn reconcile_listed(
        &self,
        dir: &Path,
        kind: RoleKind,
        listing: &BTreeMap<String, MetaFile>,
        consistent: bool,
    ) -> Result<RoleRecord> {
        let spec = self.registry.get(kind);
        let mut candidates = naming::discover_versions(
            listing.keys(),
            spec.name(),
            self.extension(),
            spec.is_versioned(consistent),
        )?;

        if candidates.len() > 1 {
            let candidates: Vec<String> = candidates.into_iter().map(|c| c.file_name).collect();
            warn!(role = spec.name(), ?candidates, "ambiguous snapshot listing");
            return Err(Error::AmbiguousRoleFiles {
                role: kind,
                candidates,
            });
        }

        let Some(candidate) = candidates.pop() else {
            info!(role = spec.name(), "not listed in snapshot, creating");
            return match kind {
                RoleKind::Root => self.create_empty_root(consistent),
                _ => Ok(RoleRecord::create_empty(spec)),
            };
        };

        let recorded = listing
            .get(&candidate.file_name)
            .map(|meta| meta.version)
            .ok_or_else(|| Error::MissingRoleFile {
                role: kind,
                file: candidate.file_name.clone(),
            })?;
        if let Some(named) = candidate.version {
            if named != recorded {
                warn!(
                    role = spec.name(),
                    file = %candidate.file_name,
                    named,
                    recorded,
                    "file name disagrees with snapshot"
                );
                return Err(Error::VersionMismatch {
                    role: kind,
                    file: candidate.file_name,
                    expected: recorded,
                    found: named,
                });
            }
        }

        let path = dir.join(&candidate.file_name);
        let record = self
            .persister
            .load_from_file(spec, &path, Some(recorded))?
            .ok_or_else(|| {
                warn!(role = spec.name(), "listed in snapshot but missing on disk");
                Error::MissingRoleFile {
                    role: kind,
                    file: candidate.file_name.clone(),
                }
            })?;
        info!(role = spec.name(), version = recorded, "loaded");
        Ok(record)
    }
}
