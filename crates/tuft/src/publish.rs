//! One-call publishing into a repository directory

use std::sync::Arc;

use tracing::info;
use tuft_repo::naming::find_root_file;
use tuft_repo::{RepoBuilder, RepoLayout, RepoSeed, RolesStrategy, RootSource, Signer};

use crate::error::Result;

/// Versions of the roles after a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Root version
    pub root: u64,
    /// Targets version
    pub targets: u64,
    /// Snapshot version
    pub snapshot: u64,
    /// Timestamp version
    pub timestamp: u64,
}

/// Add `files` to the repository at `layout`, signing every role with `key`
///
/// A repository without root metadata is created first, with versioned file
/// names when `consistent` is set. An existing repository keeps the naming
/// mode recorded in its root.
pub fn publish<I, P, D>(
    layout: &RepoLayout,
    key: Arc<dyn Signer>,
    consistent: bool,
    files: I,
) -> Result<PublishReport>
where
    I: IntoIterator<Item = (P, D)>,
    P: Into<String>,
    D: Into<Vec<u8>>,
{
    let strategy = RolesStrategy::standard();
    let keys = Arc::new(strategy.registry().key_manager_from_single_key(key));
    let metadata_dir = layout.metadata_dir();

    let mut builder = match find_root_file(&metadata_dir, strategy.extension(), consistent)? {
        Some(root_file) => {
            info!("continuing repository at {}", layout.root().display());
            let seed = RepoSeed::load(&strategy, RootSource::Path(root_file), keys, consistent)?;
            RepoBuilder::load(&strategy, seed, &metadata_dir)?
        }
        None => {
            info!("creating repository at {}", layout.root().display());
            let seed = RepoSeed::make(&strategy, keys, consistent, false)?;
            RepoBuilder::new(&strategy, seed)?
        }
    };

    builder.add_files(files)?;
    builder.publish()?;
    builder.save(layout)?;

    Ok(PublishReport {
        root: builder.root().version(),
        targets: builder.targets().version(),
        snapshot: builder.snapshot().version(),
        timestamp: builder.timestamp().version(),
    })
}
