//! Seam to the trust-verification collaborator
//!
//! The client never verifies metadata itself. A [`TrustUpdater`] refreshes
//! the trusted metadata of one repository, resolves target paths against
//! it and manages the local copies of target content.

use std::path::PathBuf;

use tuft_repo::{RepoLayout, RolesStrategy};
use tuft_types::TargetFile;
use url::Url;

use crate::error::Result;

/// A target path together with its trusted description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    /// Path relative to the content area
    pub path: String,
    /// Length and digests from targets metadata
    pub file: TargetFile,
}

/// Trusted view of one repository
pub trait TrustUpdater: Send {
    /// Fetch and verify the latest metadata
    fn refresh(&mut self) -> Result<()>;

    /// Trusted description of `path`, if the repository lists it
    fn resolve_target(&self, path: &str) -> Result<Option<TargetInfo>>;

    /// Local copy of `target` if one is present and intact
    fn find_cached(&self, target: &TargetInfo) -> Result<Option<PathBuf>>;

    /// Fetch `target` into the local cache
    fn download(&mut self, target: &TargetInfo) -> Result<()>;

    /// Every path listed in the trusted targets metadata
    fn target_names(&self) -> Result<Vec<String>>;
}

/// Creates the updater for one repository
pub trait UpdaterFactory: Send + Sync {
    /// Updater for the repository at `layout`, fetching from `base_uri`
    fn create(
        &self,
        strategy: &RolesStrategy,
        layout: &RepoLayout,
        base_uri: &Url,
    ) -> Result<Box<dyn TrustUpdater>>;
}
