//! Client-side access to tuft repositories
//!
//! Repositories are registered locally under a pet name. Each one keeps its
//! trusted root, refreshed metadata and cached target content in its own
//! directory below the repos root:
//!
//! - [`RepoManager`]: lists, adds and removes registered repositories
//! - [`Repo`]: reads targets of one repository through a [`TrustUpdater`]
//! - [`LocalMirrorUpdater`]: updater for mirrors on the local file system
//!
//! # Example
//!
//! ```no_run
//! use tuft_client::{ClientConfig, RepoManager};
//!
//! # fn example(root_json: &[u8]) -> Result<(), tuft_client::Error> {
//! let mut manager = RepoManager::new(ClientConfig::default_location()?)?;
//! manager.add("main", root_json, vec!["file:///srv/mirror".to_string()])?;
//!
//! let mut repo = manager.get("main")?;
//! repo.update()?;
//! let path = repo.get_target_path("hello.txt")?;
//! println!("hello.txt is at {}", path.display());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod local;
mod manager;
mod repo;
mod settings;
mod updater;

pub use config::{default_repos_root, ClientConfig};
pub use error::{Error, Result};
pub use local::{LocalMirrorFactory, LocalMirrorUpdater};
pub use manager::RepoManager;
pub use repo::Repo;
pub use settings::Settings;
pub use updater::{TargetInfo, TrustUpdater, UpdaterFactory};
