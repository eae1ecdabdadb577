//! A locally registered repository

use std::path::PathBuf;

use tracing::{debug, warn};
use tuft_repo::RepoLayout;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::updater::TrustUpdater;

/// One repository under the repos root, addressed by pet name
pub struct Repo {
    pet_name: String,
    layout: RepoLayout,
    settings: Settings,
    updater: Box<dyn TrustUpdater>,
}

impl Repo {
    /// Open `<repos_root>/<pet_name>` and create its updater
    pub fn open(config: &ClientConfig, pet_name: &str) -> Result<Self> {
        let serializer = config.serializer();
        let layout = RepoLayout::new(
            config.repos_root().join(pet_name),
            serializer.file_extension(),
        );
        if !layout.root().is_dir() {
            return Err(Error::UnknownRepository {
                pet_name: pet_name.to_string(),
            });
        }

        let settings = Settings::load(&layout.settings_path(), serializer.as_ref())?;
        let base_uri = settings
            .base_uris
            .first()
            .ok_or_else(|| Error::NoBaseUri {
                pet_name: pet_name.to_string(),
            })?;
        let base_uri = parse_uri(base_uri)?;
        let updater = config
            .updater_factory()
            .create(&config.strategy(), &layout, &base_uri)?;

        debug!(pet_name, %base_uri, "opened repository");
        Ok(Self::with_updater(pet_name, layout, settings, updater))
    }

    /// Assemble from parts, bypassing the configured updater factory
    pub fn with_updater(
        pet_name: impl Into<String>,
        layout: RepoLayout,
        settings: Settings,
        updater: Box<dyn TrustUpdater>,
    ) -> Self {
        Self {
            pet_name: pet_name.into(),
            layout,
            settings,
            updater,
        }
    }

    pub fn pet_name(&self) -> &str {
        &self.pet_name
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Preferred base URI
    pub fn base_uri(&self) -> Option<&str> {
        self.settings.base_uris.first().map(String::as_str)
    }

    pub fn base_uris(&self) -> &[String] {
        &self.settings.base_uris
    }

    /// Refresh trusted metadata
    pub fn update(&mut self) -> Result<()> {
        self.updater.refresh()
    }

    /// Every target path the repository lists
    pub fn target_names(&self) -> Result<Vec<String>> {
        self.updater.target_names()
    }

    /// Local path holding verified content of the target `path`
    ///
    /// Uses the cached copy when intact, otherwise downloads it first.
    pub fn get_target_path(&mut self, path: &str) -> Result<PathBuf> {
        let target = self
            .updater
            .resolve_target(path)?
            .ok_or_else(|| Error::TargetNotFound {
                path: path.to_string(),
            })?;

        if let Some(cached) = self.updater.find_cached(&target)? {
            return Ok(cached);
        }

        if let Err(e) = self.updater.download(&target) {
            warn!(pet_name = %self.pet_name, path, "download failed: {e}");
        }

        self.updater
            .find_cached(&target)?
            .ok_or_else(|| Error::TargetUnavailable {
                path: path.to_string(),
            })
    }
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("pet_name", &self.pet_name)
            .field("layout", &self.layout)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

pub(crate) fn parse_uri(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|source| Error::InvalidUri {
        uri: uri.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use tuft_types::TargetFile;

    use crate::updater::TargetInfo;

    #[derive(Default)]
    struct Calls {
        downloads: usize,
    }

    /// Updater serving targets from memory into a scratch directory
    struct MockUpdater {
        dir: PathBuf,
        targets: BTreeMap<String, Vec<u8>>,
        serve: bool,
        calls: Arc<Mutex<Calls>>,
    }

    impl TrustUpdater for MockUpdater {
        fn refresh(&mut self) -> Result<()> {
            Ok(())
        }

        fn resolve_target(&self, path: &str) -> Result<Option<TargetInfo>> {
            Ok(self.targets.get(path).map(|data| TargetInfo {
                path: path.to_string(),
                file: TargetFile::from_data(data),
            }))
        }

        fn find_cached(&self, target: &TargetInfo) -> Result<Option<PathBuf>> {
            let path = self.dir.join(&target.path);
            Ok(path.exists().then_some(path))
        }

        fn download(&mut self, target: &TargetInfo) -> Result<()> {
            self.calls.lock().unwrap().downloads += 1;
            if !self.serve {
                return Err(Error::Updater("offline".into()));
            }
            std::fs::write(self.dir.join(&target.path), &self.targets[&target.path]).unwrap();
            Ok(())
        }

        fn target_names(&self) -> Result<Vec<String>> {
            Ok(self.targets.keys().cloned().collect())
        }
    }

    fn repo(dir: &std::path::Path, serve: bool) -> (Repo, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let updater = MockUpdater {
            dir: dir.to_path_buf(),
            targets: BTreeMap::from([("a.txt".to_string(), b"hello".to_vec())]),
            serve,
            calls: Arc::clone(&calls),
        };
        let repo = Repo::with_updater(
            "main",
            RepoLayout::new(dir, "json"),
            Settings::new(vec!["file:///srv/a".into(), "file:///srv/b".into()]),
            Box::new(updater),
        );
        (repo, calls)
    }

    #[test]
    fn test_downloads_once_then_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repo, calls) = repo(dir.path(), true);

        let path = repo.get_target_path("a.txt").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        repo.get_target_path("a.txt").unwrap();
        assert_eq!(calls.lock().unwrap().downloads, 1);
    }

    #[test]
    fn test_unknown_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repo, calls) = repo(dir.path(), true);
        assert!(matches!(
            repo.get_target_path("missing.txt"),
            Err(Error::TargetNotFound { path }) if path == "missing.txt"
        ));
        assert_eq!(calls.lock().unwrap().downloads, 0);
    }

    #[test]
    fn test_unavailable_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repo, calls) = repo(dir.path(), false);
        assert!(matches!(
            repo.get_target_path("a.txt"),
            Err(Error::TargetUnavailable { path }) if path == "a.txt"
        ));
        assert_eq!(calls.lock().unwrap().downloads, 1);
    }

    #[test]
    fn test_accessors() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repo, _) = repo(dir.path(), true);
        assert_eq!(repo.pet_name(), "main");
        assert_eq!(repo.base_uri(), Some("file:///srv/a"));
        assert_eq!(repo.base_uris().len(), 2);
        repo.update().unwrap();
        assert_eq!(repo.target_names().unwrap(), vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_parse_uri() {
        assert!(parse_uri("file:///srv/mirror").is_ok());
        assert!(matches!(
            parse_uri("not a uri"),
            Err(Error::InvalidUri { .. })
        ));
    }
}
