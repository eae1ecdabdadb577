//! Registry of local repositories under one root directory

use std::path::{Component, Path};

use tracing::info;
use tuft_repo::{RepoLayout, RootSource};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::repo::{parse_uri, Repo};
use crate::settings::Settings;

/// Local repositories, one sub-directory of the repos root per pet name
///
/// ```text
/// <repos_root>/
///   <pet_name>/
///     metadata/root.<ext>
///     content/
///     local.<ext>
/// ```
#[derive(Debug, Clone)]
pub struct RepoManager {
    config: ClientConfig,
    pet_names: Vec<String>,
}

impl RepoManager {
    /// Manager over `config.repos_root`, listing what is already there
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut manager = Self {
            config,
            pet_names: Vec::new(),
        };
        manager.refresh()?;
        Ok(manager)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Re-read the pet names from disk
    pub fn refresh(&mut self) -> Result<()> {
        let root = self.config.repos_root();
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.pet_names.clear();
                return Ok(());
            }
            Err(e) => return Err(Error::io(root)(e)),
        };

        let mut pet_names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Error::io(root))?;
            let is_dir = entry.file_type().map_err(Error::io(&entry.path()))?.is_dir();
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                pet_names.push(name.to_string());
            }
        }
        pet_names.sort();
        self.pet_names = pet_names;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pet_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pet_names.is_empty()
    }

    /// Pet names, sorted
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pet_names.iter().map(String::as_str)
    }

    pub fn contains(&self, pet_name: &str) -> bool {
        self.pet_names.iter().any(|name| name == pet_name)
    }

    /// Open the repository registered as `pet_name`
    pub fn get(&self, pet_name: &str) -> Result<Repo> {
        if !self.contains(pet_name) {
            return Err(Error::UnknownRepository {
                pet_name: pet_name.to_string(),
            });
        }
        Repo::open(&self.config, pet_name)
    }

    /// Register a repository trusting `root` and fetched from `base_uris`
    ///
    /// `root` must decode as root metadata. It is stored as
    /// `metadata/root.<ext>` next to the settings file.
    pub fn add(&mut self, pet_name: &str, root: &[u8], base_uris: Vec<String>) -> Result<Settings> {
        validate_pet_name(pet_name)?;
        for uri in &base_uris {
            parse_uri(uri)?;
        }

        let strategy = self.config.strategy();
        let mut trusted = strategy.load_root(RootSource::Bytes(root.to_vec()), false)?;

        let layout = self.layout(pet_name);
        layout.create_dirs()?;
        // root files are never versioned
        strategy.save(&layout.metadata_dir(), &mut trusted, false)?;

        let settings = Settings::new(base_uris);
        settings.save(&layout.settings_path(), self.config.serializer().as_ref())?;
        info!(pet_name, version = trusted.version(), "added repository");

        self.refresh()?;
        Ok(settings)
    }

    /// Delete the repository directory of `pet_name`, returning whether it existed
    pub fn remove(&mut self, pet_name: &str) -> Result<bool> {
        validate_pet_name(pet_name)?;
        let dir = self.config.repos_root().join(pet_name);
        let removed = match std::fs::remove_dir_all(&dir) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(Error::io(&dir)(e)),
        };
        if removed {
            info!(pet_name, "removed repository");
        }
        self.refresh()?;
        Ok(removed)
    }

    fn layout(&self, pet_name: &str) -> RepoLayout {
        RepoLayout::new(
            self.config.repos_root().join(pet_name),
            self.config.serializer().file_extension(),
        )
    }
}

/// Pet names are single, plain path components
fn validate_pet_name(pet_name: &str) -> Result<()> {
    let mut components = Path::new(pet_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidPetName {
            pet_name: pet_name.to_string(),
        }),
    }
}
