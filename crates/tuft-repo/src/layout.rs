//! Directory layout of one repository

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory holding role files
pub const METADATA_DIR: &str = "metadata";

/// Directory holding published target content
pub const CONTENT_DIR: &str = "content";

/// Stem of the per-repository settings file
pub const SETTINGS_STEM: &str = "local";

/// Paths inside one repository directory
///
/// ```text
/// <root>/
///   metadata/        role files
///   content/         target content
///   local.<ext>      settings
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
    extension: String,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(format!("{SETTINGS_STEM}.{}", self.extension))
    }

    /// Create the metadata and content directories
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [self.metadata_dir(), self.content_dir()] {
            std::fs::create_dir_all(&dir).map_err(Error::io(&dir))?;
        }
        Ok(())
    }
}
