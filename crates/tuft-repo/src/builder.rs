//! Publishing user files into a repository
//!
//! A build cycle binds user file content into targets, binds the current
//! root and targets file names into snapshot, stamps the snapshot version
//! into timestamp and signs each of them on the way. Saving then writes
//! every changed role file followed by the content.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use tuft_types::{MetaFile, RoleKind, TargetFile};

use crate::error::{Error, Result};
use crate::keys::KeyManager;
use crate::layout::RepoLayout;
use crate::record::RoleRecord;
use crate::seed::RepoSeed;
use crate::strategy::RolesStrategy;

/// Owns the role records of one build cycle
#[derive(Debug)]
pub struct RepoBuilder<'a> {
    strategy: &'a RolesStrategy,
    seed: RepoSeed,
    consistent: bool,
    targets: RoleRecord,
    snapshot: RoleRecord,
    timestamp: RoleRecord,
    user_files: BTreeMap<String, Vec<u8>>,
}

impl<'a> RepoBuilder<'a> {
    /// Builder for a repository with no role files yet
    pub fn new(strategy: &'a RolesStrategy, seed: RepoSeed) -> Result<Self> {
        Self::reconcile(strategy, seed, None)
    }

    /// Builder continuing the repository whose role files are in `metadata_dir`
    ///
    /// Fails if the root found on disk is newer than the seed's.
    pub fn load(strategy: &'a RolesStrategy, seed: RepoSeed, metadata_dir: &Path) -> Result<Self> {
        Self::reconcile(strategy, seed, Some(metadata_dir))
    }

    fn reconcile(strategy: &'a RolesStrategy, seed: RepoSeed, dir: Option<&Path>) -> Result<Self> {
        let consistent = seed.is_consistent()?;
        let roles = strategy.load_or_create_roles(dir, consistent)?;

        if roles.root.version() > seed.root().version() {
            return Err(Error::VersionDecrease {
                role: RoleKind::Root,
                current: roles.root.version(),
                requested: seed.root().version(),
            });
        }

        debug!(
            targets = roles.targets.version(),
            snapshot = roles.snapshot.version(),
            timestamp = roles.timestamp.version(),
            "reconciled"
        );
        Ok(Self {
            strategy,
            seed,
            consistent,
            targets: roles.targets,
            snapshot: roles.snapshot,
            timestamp: roles.timestamp,
            user_files: BTreeMap::new(),
        })
    }

    pub fn seed(&self) -> &RepoSeed {
        &self.seed
    }

    pub fn into_seed(self) -> RepoSeed {
        self.seed
    }

    pub fn keys(&self) -> &Arc<KeyManager> {
        self.seed.keys()
    }

    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    pub fn root(&self) -> &RoleRecord {
        self.seed.root()
    }

    pub fn targets(&self) -> &RoleRecord {
        &self.targets
    }

    pub fn snapshot(&self) -> &RoleRecord {
        &self.snapshot
    }

    pub fn timestamp(&self) -> &RoleRecord {
        &self.timestamp
    }

    /// User files added so far, by target path
    pub fn user_files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.user_files
    }

    /// Queue `data` for publication under the relative `path`
    pub fn add_file(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        validate_target_path(&path)?;
        self.user_files.insert(path, data.into());
        Ok(())
    }

    /// [`RepoBuilder::add_file`] for each pair
    pub fn add_files<I, P, D>(&mut self, files: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, D)>,
        P: Into<String>,
        D: Into<Vec<u8>>,
    {
        for (path, data) in files {
            self.add_file(path, data)?;
        }
        Ok(())
    }

    /// On-disk content name of every user file, in path order
    ///
    /// Consistent repositories prefix the path with the SHA-256 recorded in
    /// targets, so files must be bound first.
    pub fn user_file_names(&self) -> Result<Vec<String>> {
        self.user_files
            .keys()
            .map(|path| self.content_name(path))
            .collect()
    }

    fn content_name(&self, path: &str) -> Result<String> {
        if !self.consistent {
            return Ok(path.to_string());
        }
        let targets = self.targets.signed().as_targets()?;
        let digest = targets
            .targets
            .get(path)
            .and_then(TargetFile::sha256)
            .ok_or_else(|| Error::UnboundTarget {
                path: path.to_string(),
            })?;
        Ok(format!("{digest}.{path}"))
    }

    /// Record every user file in targets and sign targets
    ///
    /// Targets is re-signed on every call, with or without new files.
    pub fn bind_content(&mut self) -> Result<bool> {
        let targets = self.targets.signed_mut().as_targets_mut()?;
        for (path, data) in &self.user_files {
            targets.targets.insert(path.clone(), TargetFile::from_data(data));
        }
        self.seed.keys().sign(&mut self.targets)
    }

    /// Record the current root and targets file names in snapshot and sign it
    ///
    /// The listing is rebuilt from scratch, so it holds exactly the roles
    /// other than snapshot and timestamp.
    pub fn bind_metadata(&mut self) -> Result<bool> {
        let ext = self.strategy.extension();
        let meta: BTreeMap<String, MetaFile> = [self.seed.root(), &self.targets]
            .into_iter()
            .map(|record| {
                (
                    record.file_name(ext, self.consistent),
                    MetaFile::new(record.version()),
                )
            })
            .collect();

        self.snapshot.signed_mut().as_snapshot_mut()?.meta = meta;
        self.seed.keys().sign(&mut self.snapshot)
    }

    /// Point timestamp at the current snapshot version and sign it
    pub fn stamp(&mut self) -> Result<bool> {
        let version = self.snapshot.version();
        self.timestamp
            .signed_mut()
            .as_timestamp_mut()?
            .snapshot_meta = MetaFile::new(version);
        self.seed.keys().sign(&mut self.timestamp)
    }

    /// Full cascade: root if changed, then content, metadata and stamp
    pub fn publish(&mut self) -> Result<()> {
        self.seed.sign()?;
        self.bind_content()?;
        self.bind_metadata()?;
        self.stamp()?;
        info!(
            targets = self.targets.version(),
            snapshot = self.snapshot.version(),
            timestamp = self.timestamp.version(),
            "published"
        );
        Ok(())
    }

    /// Write every role file that needs saving into `dir`
    ///
    /// Root is also written when its file is missing from `dir`. Timestamp
    /// goes last so an interrupted save never references a snapshot that
    /// was not written.
    pub fn save_meta(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        let consistent = self.consistent;

        let root_path = dir.join(self.strategy.file_name_for(self.seed.root(), consistent));
        if self.seed.root().needs_saving() || !root_path.exists() {
            written.push(self.strategy.save(dir, self.seed.root_mut(), consistent)?);
        }
        for record in [&mut self.targets, &mut self.snapshot, &mut self.timestamp] {
            if record.needs_saving() {
                written.push(self.strategy.save(dir, record, consistent)?);
            }
        }
        Ok(written)
    }

    /// Write every user file into `dir` under its content name
    pub fn save_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (path, data) in &self.user_files {
            let target = dir.join(self.content_name(path)?);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(Error::io(parent))?;
            }
            std::fs::write(&target, data).map_err(Error::io(&target))?;
            debug!(path, "wrote {}", target.display());
            written.push(target);
        }
        Ok(written)
    }

    /// Write metadata and content into `layout`
    pub fn save(&mut self, layout: &RepoLayout) -> Result<()> {
        layout.create_dirs()?;
        self.save_meta(&layout.metadata_dir())?;
        self.save_files(&layout.content_dir())?;
        Ok(())
    }
}

/// Target paths are relative and stay inside the content directory
fn validate_target_path(path: &str) -> Result<()> {
    let invalid = || Error::InvalidTargetPath {
        path: path.to_string(),
    };
    if path.is_empty() {
        return Err(invalid());
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{Signer, SigningKey};
    use rstest::rstest;
    use tuft_crypto::SigningScheme;

    fn seed(strategy: &RolesStrategy, consistent: bool) -> RepoSeed {
        let key: Arc<dyn Signer> = Arc::new(SigningKey::generate(SigningScheme::Ed25519).unwrap());
        let keys = Arc::new(strategy.registry().key_manager_from_single_key(key));
        RepoSeed::make(strategy, keys, consistent, false).unwrap()
    }

    #[rstest]
    #[case("")]
    #[case("/etc/passwd")]
    #[case("../escape")]
    #[case("a/../../b")]
    fn test_rejects_bad_paths(#[case] path: &str) {
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        assert!(matches!(
            builder.add_file(path, b"x".to_vec()),
            Err(Error::InvalidTargetPath { .. })
        ));
        assert!(builder.user_files().is_empty());
    }

    #[test]
    fn test_bind_content_records_targets() {
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder
            .add_files([("a.txt", b"hello".to_vec()), ("dir/b.bin", vec![0u8; 3])])
            .unwrap();

        assert!(matches!(
            builder.user_file_names(),
            Err(Error::UnboundTarget { .. })
        ));

        assert!(builder.bind_content().unwrap());
        assert_eq!(builder.targets().version(), 1);
        let targets = builder.targets().signed().as_targets().unwrap();
        assert_eq!(targets.targets["a.txt"].length, 5);
        assert_eq!(targets.targets["dir/b.bin"].length, 3);

        assert_eq!(
            builder.user_file_names().unwrap(),
            vec![
                "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824.a.txt"
                    .to_string(),
                format!("{}.dir/b.bin", hex::encode(tuft_crypto::sha256(&[0u8; 3]))),
            ]
        );
    }

    #[test]
    fn test_plain_names_without_consistency() {
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, false)).unwrap();
        builder.add_file("a.txt", b"hello".to_vec()).unwrap();
        assert_eq!(builder.user_file_names().unwrap(), vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_bind_metadata_lists_root_and_targets_only() {
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder.bind_content().unwrap();
        builder.bind_metadata().unwrap();

        let meta = &builder.snapshot().signed().as_snapshot().unwrap().meta;
        let names: Vec<_> = meta.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["1.targets.json", "root.json"]);
        assert_eq!(meta["1.targets.json"].version, 1);
        assert_eq!(meta["root.json"].version, 1);
        assert_eq!(builder.snapshot().version(), 1);
    }

    #[test]
    fn test_stamp_references_snapshot() {
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder.publish().unwrap();
        builder.publish().unwrap();

        assert_eq!(builder.snapshot().version(), 2);
        let timestamp = builder.timestamp().signed().as_timestamp().unwrap();
        assert_eq!(timestamp.snapshot_meta.version, 2);
        assert_eq!(builder.timestamp().version(), 2);
        assert_eq!(builder.targets().version(), 2);
    }

    #[test]
    fn test_bind_content_without_files_resigns_targets() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = RolesStrategy::standard();
        let layout = RepoLayout::new(dir.path(), strategy.extension());
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder.add_file("a.txt", b"hello".to_vec()).unwrap();
        builder.publish().unwrap();
        builder.save(&layout).unwrap();

        let mut reloaded =
            RepoBuilder::load(&strategy, builder.into_seed(), &layout.metadata_dir()).unwrap();
        assert_eq!(reloaded.targets().version(), 1);
        let old_signatures = reloaded.targets().metadata().signatures.clone();

        assert!(reloaded.bind_content().unwrap());
        assert_eq!(reloaded.targets().version(), 2);
        assert!(reloaded.targets().needs_saving());
        assert_ne!(reloaded.targets().metadata().signatures, old_signatures);
        let targets = reloaded.targets().signed().as_targets().unwrap();
        assert!(targets.targets.contains_key("a.txt"));
    }

    #[test]
    fn test_save_meta_refuses_unsigned() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder.add_file("a.txt", b"hello".to_vec()).unwrap();
        builder.bind_content().unwrap();

        assert!(matches!(
            builder.save_meta(dir.path()),
            Err(Error::UnsignedRole {
                role: RoleKind::Snapshot
            })
        ));
    }

    #[test]
    fn test_save_writes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepoLayout::new(dir.path(), "json");
        let strategy = RolesStrategy::standard();
        let mut builder = RepoBuilder::new(&strategy, seed(&strategy, true)).unwrap();
        builder.add_file("docs/a.txt", b"hello".to_vec()).unwrap();
        builder.publish().unwrap();
        builder.save(&layout).unwrap();

        let meta = layout.metadata_dir();
        for name in ["root.json", "1.targets.json", "1.snapshot.json", "timestamp.json"] {
            assert!(meta.join(name).is_file(), "{name} missing");
        }
        let content = layout.content_dir().join(format!(
            "{}.docs/a.txt",
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        ));
        assert_eq!(std::fs::read(content).unwrap(), b"hello");

        assert!(builder.root().metadata().signatures.len() == 1);
        assert!(builder.save_meta(&meta).unwrap().is_empty());
    }
}
