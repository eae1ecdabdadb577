//! Error types for repository construction

use std::path::{Path, PathBuf};

use thiserror::Error;
use tuft_types::RoleKind;

/// Errors that can occur while loading, building or saving a repository
#[derive(Debug, Error)]
pub enum Error {
    /// File system error, with the path it happened on
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding a metadata or settings file failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Metadata model error
    #[error("metadata error: {0}")]
    Types(#[from] tuft_types::Error),

    /// Signing error
    #[error("crypto error: {0}")]
    Crypto(#[from] tuft_crypto::Error),

    /// File name discovery pattern could not be built
    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// More than one file name matches a role's discovery pattern
    #[error("{role}: more than one metadata file matches, refusing to guess: {candidates:?}")]
    AmbiguousRoleFiles {
        /// Role being discovered
        role: RoleKind,
        /// Every matching file name
        candidates: Vec<String>,
    },

    /// File name, snapshot pin and payload version do not agree
    #[error("{role}: version mismatch for {file}: expected {expected}, found {found}")]
    VersionMismatch {
        /// Role being loaded
        role: RoleKind,
        /// File name (or data origin) being checked
        file: String,
        /// Version required by the file name or the snapshot
        expected: u64,
        /// Version actually found
        found: u64,
    },

    /// Attempt to lower a role's version
    #[error("{role}: version decrease from {current} to {requested}")]
    VersionDecrease {
        /// Role whose version was set
        role: RoleKind,
        /// Version before the attempt
        current: u64,
        /// Rejected version
        requested: u64,
    },

    /// Role version cannot be incremented any further
    #[error("{role}: version {version} cannot be incremented")]
    VersionOverflow {
        /// Role being bumped
        role: RoleKind,
        /// Current version
        version: u64,
    },

    /// Attempt to persist a role that still needs signing
    #[error("{role}: refusing to save unsigned metadata")]
    UnsignedRole {
        /// Role that was about to be written
        role: RoleKind,
    },

    /// Reconciliation finished with declared roles unresolved
    #[error("not all roles were resolved: {missing:?}")]
    IncompleteRoles {
        /// Roles left without a record
        missing: Vec<RoleKind>,
    },

    /// No signing key registered under a role name
    #[error("no signing key registered for role {role}")]
    MissingKey {
        /// Role name looked up
        role: String,
    },

    /// A file holds metadata of another role kind
    #[error("expected {expected} metadata, found {found}")]
    RoleTypeMismatch {
        /// Role kind being loaded
        expected: RoleKind,
        /// Role kind in the file
        found: RoleKind,
    },

    /// No root metadata file in a directory
    #[error("no root metadata found in {}", dir.display())]
    RootNotFound {
        /// Directory that was searched
        dir: PathBuf,
    },

    /// A metadata file pinned by another role is absent
    #[error("{role}: {file} is pinned but missing")]
    MissingRoleFile {
        /// Role whose file is missing
        role: RoleKind,
        /// Expected file name
        file: String,
    },

    /// Target path that is empty, absolute or escapes the content area
    #[error("invalid target path {path:?}")]
    InvalidTargetPath {
        /// Offending path
        path: String,
    },

    /// User file without a targets entry, content can't be named yet
    #[error("target {path:?} is not bound into targets metadata")]
    UnboundTarget {
        /// User file path
        path: String,
    },
}

impl Error {
    /// Adapter for `map_err` that attaches `path` to an I/O error
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

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, Error>;
