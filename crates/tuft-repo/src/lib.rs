//! Construction and versioning of signed content-update repositories
//!
//! This crate builds and maintains a directory of hierarchically signed
//! metadata. Four roles form the trust chain:
//!
//! - **root** authorizes the signing keys of every role
//! - **targets** lists the published files and their digests
//! - **snapshot** pins the versions of the other metadata files
//! - **timestamp** references the current snapshot version
//!
//! # Building a repository
//!
//! ```no_run
//! use std::sync::Arc;
//! use tuft_crypto::SigningScheme;
//! use tuft_repo::{RepoBuilder, RepoLayout, RepoSeed, RolesStrategy, SigningKey};
//!
//! # fn main() -> Result<(), tuft_repo::Error> {
//! let strategy = RolesStrategy::standard();
//! let key = Arc::new(SigningKey::generate(SigningScheme::Ed25519)?);
//! let keys = Arc::new(strategy.registry().key_manager_from_single_key(key));
//!
//! let seed = RepoSeed::make(&strategy, keys, true, false)?;
//! let mut builder = RepoBuilder::new(&strategy, seed)?;
//! builder.add_file("hello.txt", b"hello".to_vec())?;
//! builder.publish()?;
//! builder.save(&RepoLayout::new("/srv/repo", "json"))?;
//! # Ok(())
//! # }
//! ```
//!
//! An existing repository is continued with [`RepoBuilder::load`], which
//! reconciles the role files on disk first (see [`RolesStrategy`]).

pub mod builder;
pub mod error;
pub mod keys;
pub mod layout;
pub mod naming;
pub mod persister;
pub mod record;
pub mod registry;
pub mod seed;
pub mod serializer;
pub mod signer;
pub mod strategy;

pub use builder::RepoBuilder;
pub use error::{Error, Result};
pub use keys::KeyManager;
pub use layout::RepoLayout;
pub use naming::DiscoveredFile;
pub use persister::RolePersister;
pub use record::RoleRecord;
pub use registry::{RoleRegistry, RoleSpec};
pub use seed::RepoSeed;
pub use serializer::{JsonSerializer, Serializer};
pub use signer::{Signer, SigningKey};
pub use strategy::{RoleSet, RolesStrategy, RootSource};

// Re-export the metadata model for convenience
pub use tuft_types::{Metadata, RoleKind, Signed};
