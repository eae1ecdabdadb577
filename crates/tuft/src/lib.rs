//! Signed content-update repositories
//!
//! This is the main entry point for tuft. It re-exports the building blocks
//! and offers [`publish`] for the common "add these files and re-sign"
//! workflow.
//!
//! - [`repo`]: building and reconciling repositories
//! - [`client`]: reading targets from registered repositories
//! - [`types`]: the signed metadata model
//! - [`crypto`]: keys, signatures and digests

pub mod error;
pub mod publish;

// Re-export core crates
pub use tuft_client as client;
pub use tuft_crypto as crypto;
pub use tuft_repo as repo;
pub use tuft_types as types;

pub use error::{Error, Result};
pub use publish::{publish, PublishReport};
