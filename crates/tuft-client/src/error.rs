//! Error types for the client crate

use std::path::{Path, PathBuf};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing or reading local repositories
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (file operations, etc.)
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Repository metadata error
    #[error(transparent)]
    Repo(#[from] tuft_repo::Error),

    /// Metadata model error
    #[error(transparent)]
    Types(#[from] tuft_types::Error),

    /// The repository has no targets entry for the path
    #[error("Target not found: {path}")]
    TargetNotFound { path: String },

    /// The target is known but could not be cached, even after downloading
    #[error("Target unavailable: {path}")]
    TargetUnavailable { path: String },

    /// No repository directory for the pet name
    #[error("Unknown repository: {pet_name}")]
    UnknownRepository { pet_name: String },

    /// Pet name that can't be used as a directory name
    #[error("Invalid repository name: {pet_name:?}")]
    InvalidPetName { pet_name: String },

    /// The settings file lists no base URI
    #[error("No base URI configured for {pet_name}")]
    NoBaseUri { pet_name: String },

    /// A base URI could not be parsed
    #[error("Invalid URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// The trust updater failed
    #[error("Updater error: {0}")]
    Updater(String),

    /// The platform has no data directory for the default repos root
    #[error("Could not determine the data directory")]
    NoProjectDirs,
}

impl Error {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
