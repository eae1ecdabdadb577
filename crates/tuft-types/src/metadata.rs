//! Signed metadata envelope and role payloads
//!
//! Every role file has the same outer shape:
//!
//! ```text
//! {
//!   "signatures": [{"keyid": "...", "sig": "..."}],
//!   "signed": {"_type": "<role>", "spec_version": "...", "version": N, "expires": "...", ...}
//! }
//! ```
//!
//! The `signed` object is a tagged variant ([`Signed`]) whose remaining fields
//! depend on the role kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoding::{Hex, KeyId};
use crate::error::{Error, Result};
use crate::keys::PublicKey;
use crate::role::RoleKind;

/// Metadata format version written into every payload
pub const SPEC_VERSION: &str = "1.0.31";

/// Key under which timestamp metadata references the snapshot
pub const TIMESTAMP_SNAPSHOT_KEY: &str = "snapshot.json";

/// One signature over the canonical bytes of [`Metadata::signed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSignature {
    /// Id of the signing key
    pub keyid: KeyId,
    /// Hex encoded signature
    pub sig: Hex,
}

/// A role file: a signed payload plus the signatures over it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Signatures over the canonical form of `signed`
    pub signatures: Vec<MetadataSignature>,
    /// The role payload
    pub signed: Signed,
}

impl Metadata {
    /// Wrap an unsigned payload
    pub fn new(signed: Signed) -> Self {
        Self {
            signatures: Vec::new(),
            signed,
        }
    }

    /// Parse from an already decoded structure
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convert into a structure for the serializer
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Check the signature made by `key` over the current payload
    pub fn verify_signature(&self, key: &PublicKey) -> Result<()> {
        let key_id = key.key_id()?;
        let signature = self
            .signatures
            .iter()
            .find(|s| s.keyid == key_id)
            .ok_or(Error::MissingSignature(key_id))?;
        let payload = self.signed.canonical_bytes()?;
        key.verification_key()?
            .verify(&payload, &signature.sig.decode()?)?;
        Ok(())
    }
}

/// Role-specific payload, tagged by `_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum Signed {
    /// Root payload
    Root(RootMeta),
    /// Targets payload
    Targets(TargetsMeta),
    /// Snapshot payload
    Snapshot(SnapshotMeta),
    /// Timestamp payload
    Timestamp(TimestampMeta),
}

impl Signed {
    /// Empty payload of the given kind at version 0
    pub fn empty(kind: RoleKind, expires: DateTime<Utc>) -> Self {
        match kind {
            RoleKind::Root => Signed::Root(RootMeta::new(expires, false)),
            RoleKind::Targets => Signed::Targets(TargetsMeta::new(expires)),
            RoleKind::Snapshot => Signed::Snapshot(SnapshotMeta::new(expires)),
            RoleKind::Timestamp => Signed::Timestamp(TimestampMeta::new(expires)),
        }
    }

    /// Role kind carried by this payload
    pub fn kind(&self) -> RoleKind {
        match self {
            Signed::Root(_) => RoleKind::Root,
            Signed::Targets(_) => RoleKind::Targets,
            Signed::Snapshot(_) => RoleKind::Snapshot,
            Signed::Timestamp(_) => RoleKind::Timestamp,
        }
    }

    /// Version recorded in the payload
    pub fn version(&self) -> u64 {
        match self {
            Signed::Root(m) => m.version,
            Signed::Targets(m) => m.version,
            Signed::Snapshot(m) => m.version,
            Signed::Timestamp(m) => m.version,
        }
    }

    /// Overwrite the payload version
    pub fn set_version(&mut self, version: u64) {
        match self {
            Signed::Root(m) => m.version = version,
            Signed::Targets(m) => m.version = version,
            Signed::Snapshot(m) => m.version = version,
            Signed::Timestamp(m) => m.version = version,
        }
    }

    /// Expiry of the payload
    pub fn expires(&self) -> DateTime<Utc> {
        match self {
            Signed::Root(m) => m.expires,
            Signed::Targets(m) => m.expires,
            Signed::Snapshot(m) => m.expires,
            Signed::Timestamp(m) => m.expires,
        }
    }

    /// Overwrite the payload expiry
    pub fn set_expires(&mut self, expires: DateTime<Utc>) {
        match self {
            Signed::Root(m) => m.expires = expires,
            Signed::Targets(m) => m.expires = expires,
            Signed::Snapshot(m) => m.expires = expires,
            Signed::Timestamp(m) => m.expires = expires,
        }
    }

    /// Bytes covered by signatures: compact JSON with sorted keys
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        // serde_json::Value keeps object keys in a BTreeMap
        Ok(serde_json::to_vec(&serde_json::to_value(self)?)?)
    }

    pub fn as_root(&self) -> Result<&RootMeta> {
        match self {
            Signed::Root(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Root)),
        }
    }

    pub fn as_root_mut(&mut self) -> Result<&mut RootMeta> {
        match self {
            Signed::Root(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Root)),
        }
    }

    pub fn as_targets(&self) -> Result<&TargetsMeta> {
        match self {
            Signed::Targets(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Targets)),
        }
    }

    pub fn as_targets_mut(&mut self) -> Result<&mut TargetsMeta> {
        match self {
            Signed::Targets(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Targets)),
        }
    }

    pub fn as_snapshot(&self) -> Result<&SnapshotMeta> {
        match self {
            Signed::Snapshot(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Snapshot)),
        }
    }

    pub fn as_snapshot_mut(&mut self) -> Result<&mut SnapshotMeta> {
        match self {
            Signed::Snapshot(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Snapshot)),
        }
    }

    pub fn as_timestamp(&self) -> Result<&TimestampMeta> {
        match self {
            Signed::Timestamp(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Timestamp)),
        }
    }

    pub fn as_timestamp_mut(&mut self) -> Result<&mut TimestampMeta> {
        match self {
            Signed::Timestamp(m) => Ok(m),
            other => Err(other.wrong_payload(RoleKind::Timestamp)),
        }
    }

    fn wrong_payload(&self, expected: RoleKind) -> Error {
        Error::WrongPayload {
            expected,
            found: self.kind(),
        }
    }
}

/// Keys authorized for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKeys {
    /// Ids of the authorized keys
    pub keyids: Vec<KeyId>,
    /// Number of signatures required
    pub threshold: u32,
}

impl Default for RoleKeys {
    fn default() -> Self {
        Self {
            keyids: Vec::new(),
            threshold: 1,
        }
    }
}

/// Root payload: the authorized key set per role name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootMeta {
    pub spec_version: String,
    pub version: u64,
    pub expires: DateTime<Utc>,
    /// Whether versioned role and target file names are in use
    pub consistent_snapshot: bool,
    /// Every authorized key, by id
    pub keys: BTreeMap<KeyId, PublicKey>,
    /// Authorized key ids per role name
    pub roles: BTreeMap<String, RoleKeys>,
}

impl RootMeta {
    /// Root payload with an empty key list for each of the four roles
    pub fn new(expires: DateTime<Utc>, consistent_snapshot: bool) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            version: 0,
            expires,
            consistent_snapshot,
            keys: BTreeMap::new(),
            roles: RoleKind::ALL
                .iter()
                .map(|kind| (kind.name().to_string(), RoleKeys::default()))
                .collect(),
        }
    }

    /// Authorize `key` for `role`, returning the key id
    ///
    /// Adding a key that is already authorized for the role is a no-op.
    pub fn add_key(&mut self, key: PublicKey, role: &str) -> Result<KeyId> {
        let key_id = key.key_id()?;
        let entry = self.roles.entry(role.to_string()).or_default();
        if !entry.keyids.contains(&key_id) {
            entry.keyids.push(key_id.clone());
        }
        self.keys.insert(key_id.clone(), key);
        Ok(key_id)
    }

    /// Keys authorized for `role`
    pub fn role_keys(&self, role: &str) -> Vec<&PublicKey> {
        self.roles
            .get(role)
            .map(|r| r.keyids.iter().filter_map(|id| self.keys.get(id)).collect())
            .unwrap_or_default()
    }
}

/// A published file as recorded in targets metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFile {
    /// Size in bytes
    pub length: u64,
    /// Hex digests keyed by algorithm name
    pub hashes: BTreeMap<String, Hex>,
    /// Free-form application data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl TargetFile {
    /// Describe `data`: its length and every supported digest
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = tuft_crypto::MultiHasher::new();
        hasher.update(data);
        let (length, digests) = hasher.finalize();
        Self {
            length,
            hashes: digests
                .into_iter()
                .map(|(alg, digest)| (alg.name().to_string(), Hex::encode(&digest)))
                .collect(),
            custom: None,
        }
    }

    /// The SHA-256 digest, used to name content in consistent mode
    pub fn sha256(&self) -> Option<&Hex> {
        self.hashes.get(tuft_crypto::DigestAlgorithm::Sha256.name())
    }
}

/// Targets payload: relative path to file description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetsMeta {
    pub spec_version: String,
    pub version: u64,
    pub expires: DateTime<Utc>,
    pub targets: BTreeMap<String, TargetFile>,
}

impl TargetsMeta {
    pub fn new(expires: DateTime<Utc>) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            version: 0,
            expires,
            targets: BTreeMap::new(),
        }
    }
}

/// Version pin for one metadata file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<BTreeMap<String, Hex>>,
}

impl MetaFile {
    pub fn new(version: u64) -> Self {
        Self {
            version,
            length: None,
            hashes: None,
        }
    }
}

/// Snapshot payload: metadata file name to pinned version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub spec_version: String,
    pub version: u64,
    pub expires: DateTime<Utc>,
    pub meta: BTreeMap<String, MetaFile>,
}

impl SnapshotMeta {
    /// Snapshot with an empty metadata listing
    pub fn new(expires: DateTime<Utc>) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            version: 0,
            expires,
            meta: BTreeMap::new(),
        }
    }
}

/// Timestamp payload: reference to the current snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampMeta {
    pub spec_version: String,
    pub version: u64,
    pub expires: DateTime<Utc>,
    #[serde(rename = "meta", with = "snapshot_meta_map")]
    pub snapshot_meta: MetaFile,
}

impl TimestampMeta {
    /// Timestamp referencing no snapshot yet (version 0)
    pub fn new(expires: DateTime<Utc>) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            version: 0,
            expires,
            snapshot_meta: MetaFile::new(0),
        }
    }
}

/// Serde helper writing the snapshot reference as `{"snapshot.json": {...}}`
mod snapshot_meta_map {
    use std::collections::BTreeMap;

    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{MetaFile, TIMESTAMP_SNAPSHOT_KEY};

    pub fn serialize<S>(meta: &MetaFile, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(TIMESTAMP_SNAPSHOT_KEY, meta)?;
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<MetaFile, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = BTreeMap::<String, MetaFile>::deserialize(deserializer)?;
        map.remove(TIMESTAMP_SNAPSHOT_KEY)
            .ok_or_else(|| serde::de::Error::missing_field(TIMESTAMP_SNAPSHOT_KEY))
    }
}
