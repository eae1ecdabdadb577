//! Per-repository settings file

use std::path::Path;

use serde::{Deserialize, Serialize};
use tuft_repo::Serializer;

use crate::error::{Error, Result};

/// Where a repository is fetched from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base locations of the repository, in order of preference
    #[serde(rename = "baseURIs", default)]
    pub base_uris: Vec<String>,
}

impl Settings {
    pub fn new(base_uris: Vec<String>) -> Self {
        Self { base_uris }
    }

    /// Read settings from `path`
    pub fn load(path: &Path, serializer: &dyn Serializer) -> Result<Self> {
        let data = std::fs::read(path).map_err(Error::io(path))?;
        let value = serializer.decode(&data)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Write settings to `path`
    pub fn save(&self, path: &Path, serializer: &dyn Serializer) -> Result<()> {
        let data = serializer.encode(&serde_json::to_value(self)?)?;
        std::fs::write(path, data).map_err(Error::io(path))
    }
}
