//! Updater for repositories mirrored on the local file system
//!
//! The mirror is a directory laid out like a repository built by
//! [`tuft_repo::RepoBuilder::save`]. Its role files are reconciled with the
//! same version cross-checks the builder uses, but signature thresholds are
//! not checked here.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use tuft_repo::{naming, RepoLayout, RoleRecord, RolesStrategy, RootSource};
use tuft_types::TargetFile;
use url::Url;

use crate::error::{Error, Result};
use crate::updater::{TargetInfo, TrustUpdater, UpdaterFactory};

/// Creates [`LocalMirrorUpdater`]s for `file://` base URIs
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMirrorFactory;

impl UpdaterFactory for LocalMirrorFactory {
    fn create(
        &self,
        strategy: &RolesStrategy,
        layout: &RepoLayout,
        base_uri: &Url,
    ) -> Result<Box<dyn TrustUpdater>> {
        if base_uri.scheme() != "file" {
            return Err(Error::Updater(format!(
                "unsupported URI scheme {:?}",
                base_uri.scheme()
            )));
        }
        let mirror = base_uri
            .to_file_path()
            .map_err(|()| Error::Updater(format!("not a local path: {base_uri}")))?;
        Ok(Box::new(LocalMirrorUpdater::new(
            mirror,
            layout.clone(),
            strategy.clone(),
        )))
    }
}

/// Reads metadata and content from a mirror directory
#[derive(Debug)]
pub struct LocalMirrorUpdater {
    mirror: RepoLayout,
    local: RepoLayout,
    strategy: RolesStrategy,
    consistent: bool,
    targets: Option<BTreeMap<String, TargetFile>>,
}

impl LocalMirrorUpdater {
    pub fn new(mirror_root: PathBuf, local: RepoLayout, strategy: RolesStrategy) -> Self {
        let mirror = RepoLayout::new(mirror_root, strategy.extension());
        Self {
            mirror,
            local,
            strategy,
            consistent: false,
            targets: None,
        }
    }

    fn targets(&self) -> Result<&BTreeMap<String, TargetFile>> {
        self.targets
            .as_ref()
            .ok_or_else(|| Error::Updater("metadata has not been refreshed".into()))
    }
}

impl TrustUpdater for LocalMirrorUpdater {
    fn refresh(&mut self) -> Result<()> {
        let local_meta = self.local.metadata_dir();
        let trusted = self
            .strategy
            .load_root(RootSource::Path(local_meta.clone()), false)?;
        let consistent = trusted.signed().as_root()?.consistent_snapshot;

        let mut roles = self
            .strategy
            .load_or_create_roles(Some(&self.mirror.metadata_dir()), consistent)?;
        if roles.timestamp.needs_signing() {
            return Err(Error::Updater(format!(
                "no timestamp metadata in {}",
                self.mirror.metadata_dir().display()
            )));
        }
        if roles.root.version() < trusted.version() {
            warn!(
                mirror = roles.root.version(),
                trusted = trusted.version(),
                "mirror root is older than the trusted root"
            );
            return Err(Error::Updater("mirror root is older than the trusted root".into()));
        }

        for record in [&mut roles.targets, &mut roles.snapshot, &mut roles.timestamp] {
            // unlisted roles come back empty and unsigned
            if !record.needs_signing() {
                self.strategy.save(&local_meta, record, consistent)?;
                prune_superseded(&local_meta, record, self.strategy.extension(), consistent)?;
            }
        }

        self.targets = Some(roles.targets.signed().as_targets()?.targets.clone());
        self.consistent = consistent;
        info!(
            snapshot = roles.snapshot.version(),
            targets = roles.targets.version(),
            "refreshed from {}",
            self.mirror.root().display()
        );
        Ok(())
    }

    fn resolve_target(&self, path: &str) -> Result<Option<TargetInfo>> {
        Ok(self.targets()?.get(path).map(|file| TargetInfo {
            path: path.to_string(),
            file: file.clone(),
        }))
    }

    fn find_cached(&self, target: &TargetInfo) -> Result<Option<PathBuf>> {
        let path = content_path(&self.local.content_dir(), &target.path)?;
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&path)(e)),
        };
        if matches_target(&data, &target.file) {
            Ok(Some(path))
        } else {
            debug!(path = %target.path, "cached copy does not match targets metadata");
            Ok(None)
        }
    }

    fn download(&mut self, target: &TargetInfo) -> Result<()> {
        let name = if self.consistent {
            let digest = target.file.sha256().ok_or_else(|| {
                Error::Updater(format!("no sha256 digest for {}", target.path))
            })?;
            format!("{digest}.{}", target.path)
        } else {
            target.path.clone()
        };

        let source = content_path(&self.mirror.content_dir(), &name)?;
        let data = std::fs::read(&source).map_err(Error::io(&source))?;
        if !matches_target(&data, &target.file) {
            return Err(Error::Updater(format!(
                "{} does not match targets metadata",
                source.display()
            )));
        }

        let dest = content_path(&self.local.content_dir(), &target.path)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(Error::io(parent))?;
        }
        std::fs::write(&dest, data).map_err(Error::io(&dest))?;
        debug!(path = %target.path, "downloaded {}", source.display());
        Ok(())
    }

    fn target_names(&self) -> Result<Vec<String>> {
        Ok(self.targets()?.keys().cloned().collect())
    }
}

/// Remove older versioned files of `record`'s role from `dir`
fn prune_superseded(dir: &Path, record: &RoleRecord, ext: &str, consistent: bool) -> Result<()> {
    if !record.spec().is_versioned(consistent) {
        return Ok(());
    }
    let names = naming::list_file_names(dir)?;
    for found in naming::discover_versions(&names, record.name(), ext, true)? {
        if found.version == Some(record.version()) {
            continue;
        }
        let path = dir.join(&found.file_name);
        std::fs::remove_file(&path).map_err(Error::io(&path))?;
        debug!(file = %found.file_name, "removed superseded metadata");
    }
    Ok(())
}

fn matches_target(data: &[u8], expected: &TargetFile) -> bool {
    let actual = TargetFile::from_data(data);
    actual.length == expected.length
        && expected.sha256().is_some()
        && actual.sha256() == expected.sha256()
}

/// `dir` joined with a relative path that must stay inside it
fn content_path(dir: &Path, relative: &str) -> Result<PathBuf> {
    let escapes = relative.is_empty()
        || Path::new(relative)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::Updater(format!("refusing target path {relative:?}")));
    }
    Ok(dir.join(relative))
}
