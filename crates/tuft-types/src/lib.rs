//! Core types for tuft repository metadata
//!
//! This crate holds the serde data model shared by the repository builder and
//! the client: the four role kinds, the signed metadata envelope, and the
//! role-specific payloads carried inside it.

pub mod encoding;
pub mod error;
pub mod keys;
pub mod metadata;
pub mod role;

pub use encoding::{Hex, KeyId};
pub use error::{Error, Result};
pub use keys::{KeyVal, PublicKey};
pub use metadata::{
    MetaFile, Metadata, MetadataSignature, RoleKeys, RootMeta, Signed, SnapshotMeta, TargetFile,
    TargetsMeta, TimestampMeta, SPEC_VERSION, TIMESTAMP_SNAPSHOT_KEY,
};
pub use role::RoleKind;
