//! Client configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tuft_repo::{JsonSerializer, RoleRegistry, RolePersister, RolesStrategy, Serializer};

use crate::error::{Error, Result};
use crate::local::LocalMirrorFactory;
use crate::updater::UpdaterFactory;

/// Where local repositories live and how their files are read
#[derive(Clone)]
pub struct ClientConfig {
    /// Directory holding one sub-directory per repository pet name
    pub repos_root: PathBuf,
    serializer: Arc<dyn Serializer>,
    updater_factory: Arc<dyn UpdaterFactory>,
}

impl ClientConfig {
    /// JSON repositories under `repos_root`, updated from file mirrors
    pub fn new(repos_root: impl Into<PathBuf>) -> Self {
        Self {
            repos_root: repos_root.into(),
            serializer: Arc::new(JsonSerializer),
            updater_factory: Arc::new(LocalMirrorFactory),
        }
    }

    /// Configuration rooted at [`default_repos_root`]
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(default_repos_root()?))
    }

    /// Set the repos root directory
    pub fn with_repos_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.repos_root = path.into();
        self
    }

    /// Set the file serializer
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Set how trust updaters are created
    pub fn with_updater_factory(mut self, factory: Arc<dyn UpdaterFactory>) -> Self {
        self.updater_factory = factory;
        self
    }

    pub fn repos_root(&self) -> &Path {
        &self.repos_root
    }

    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    pub fn updater_factory(&self) -> &Arc<dyn UpdaterFactory> {
        &self.updater_factory
    }

    /// Role loading with the configured serializer
    pub fn strategy(&self) -> RolesStrategy {
        RolesStrategy::new(
            RoleRegistry::standard(),
            RolePersister::new(Arc::clone(&self.serializer)),
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("repos_root", &self.repos_root)
            .field("extension", &self.serializer.file_extension())
            .finish_non_exhaustive()
    }
}

/// Get the default repos root directory
///
/// This returns the platform-specific data directory:
/// - Linux: `~/.local/share/tuft/repos/`
/// - macOS: `~/Library/Application Support/dev.tuft.tuft/repos/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\tuft\tuft\data\repos\`
pub fn default_repos_root() -> Result<PathBuf> {
    let project_dirs =
        directories::ProjectDirs::from("dev", "tuft", "tuft").ok_or(Error::NoProjectDirs)?;
    Ok(project_dirs.data_dir().join("repos"))
}
