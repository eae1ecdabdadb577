//! Static description of the four role kinds
//!
//! A [`RoleRegistry`] is built once (usually with [`RoleRegistry::standard`])
//! and handed by reference to everything that needs to know how roles are
//! named, how long they stay valid and which roles they delegate from.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tuft_types::RoleKind;

use crate::keys::KeyManager;
use crate::signer::Signer;

/// Number of days from now before root metadata expires.
pub const DEFAULT_ROOT_EXPIRATION_DAYS: i64 = 365;

/// Number of days from now before targets metadata expires.
pub const DEFAULT_TARGETS_EXPIRATION_DAYS: i64 = 7;

/// Number of days from now before snapshot metadata expires.
pub const DEFAULT_SNAPSHOT_EXPIRATION_DAYS: i64 = 7;

/// Number of days from now before timestamp metadata expires.
pub const DEFAULT_TIMESTAMP_EXPIRATION_DAYS: i64 = 7;

/// How one role kind is named, versioned and delegated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    /// The role kind
    pub kind: RoleKind,
    /// Validity period applied whenever the role is signed
    pub default_expiration: Duration,
    /// Roles this one depends on for key delegation, nearest first
    pub deps: Vec<RoleKind>,
    /// Whether the file name carries the version in consistent mode
    pub has_version: bool,
}

impl RoleSpec {
    /// Role name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether files of this role carry a version under the given repository mode
    pub fn is_versioned(&self, consistent: bool) -> bool {
        consistent && self.has_version
    }

    /// Expiry for metadata signed now
    pub fn expiry_from_now(&self) -> DateTime<Utc> {
        (Utc::now() + self.default_expiration).trunc_subsecs(0)
    }
}

/// The role kinds of a repository, in delegation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRegistry {
    // indexed by `slot(kind)`
    roles: [RoleSpec; 4],
}

impl RoleRegistry {
    /// Root, targets, snapshot and timestamp with their stock expirations
    ///
    /// Targets depends on root, snapshot on targets and timestamp on
    /// snapshot. Root and timestamp files are never versioned.
    pub fn standard() -> Self {
        Self {
            roles: [
                RoleSpec {
                    kind: RoleKind::Root,
                    default_expiration: Duration::days(DEFAULT_ROOT_EXPIRATION_DAYS),
                    deps: Vec::new(),
                    has_version: false,
                },
                RoleSpec {
                    kind: RoleKind::Targets,
                    default_expiration: Duration::days(DEFAULT_TARGETS_EXPIRATION_DAYS),
                    deps: vec![RoleKind::Root],
                    has_version: true,
                },
                RoleSpec {
                    kind: RoleKind::Snapshot,
                    default_expiration: Duration::days(DEFAULT_SNAPSHOT_EXPIRATION_DAYS),
                    deps: vec![RoleKind::Targets],
                    has_version: true,
                },
                RoleSpec {
                    kind: RoleKind::Timestamp,
                    default_expiration: Duration::days(DEFAULT_TIMESTAMP_EXPIRATION_DAYS),
                    deps: vec![RoleKind::Snapshot],
                    has_version: false,
                },
            ],
        }
    }

    /// Override the validity period of one role
    pub fn with_expiration(mut self, kind: RoleKind, expiration: Duration) -> Self {
        self.roles[slot(kind)].default_expiration = expiration;
        self
    }

    /// Description of `kind`
    pub fn get(&self, kind: RoleKind) -> &RoleSpec {
        &self.roles[slot(kind)]
    }

    /// Look a role up by name
    pub fn by_name(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|spec| spec.name() == name)
    }

    /// All roles, root first
    pub fn iter(&self) -> impl Iterator<Item = &RoleSpec> {
        self.roles.iter()
    }

    /// Every role except root
    pub fn non_root(&self) -> impl Iterator<Item = &RoleSpec> {
        self.roles.iter().filter(|spec| spec.kind != RoleKind::Root)
    }

    /// Role names, root first
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.roles.iter().map(RoleSpec::name)
    }

    /// Transitive dependency chain of `kind`, nearest ancestor first
    pub fn parents(&self, kind: RoleKind) -> Vec<RoleKind> {
        let mut chain = Vec::new();
        self.collect_parents(kind, &mut chain);
        chain
    }

    fn collect_parents(&self, kind: RoleKind, chain: &mut Vec<RoleKind>) {
        for dep in &self.get(kind).deps {
            if !chain.contains(dep) {
                chain.push(*dep);
                self.collect_parents(*dep, chain);
            }
        }
    }

    /// Key manager with the same key registered under every role name
    pub fn key_manager_from_single_key(&self, key: Arc<dyn Signer>) -> KeyManager {
        KeyManager::from_single_key(key, self.names())
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn slot(kind: RoleKind) -> usize {
    match kind {
        RoleKind::Root => 0,
        RoleKind::Targets => 1,
        RoleKind::Snapshot => 2,
        RoleKind::Timestamp => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_standard_order() {
        let registry = RoleRegistry::standard();
        let kinds: Vec<_> = registry.iter().map(|spec| spec.kind).collect();
        assert_eq!(kinds, RoleKind::ALL.to_vec());
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["root", "targets", "snapshot", "timestamp"]
        );
    }

    #[rstest]
    #[case(RoleKind::Root, vec![])]
    #[case(RoleKind::Targets, vec![RoleKind::Root])]
    #[case(RoleKind::Snapshot, vec![RoleKind::Targets, RoleKind::Root])]
    #[case(
        RoleKind::Timestamp,
        vec![RoleKind::Snapshot, RoleKind::Targets, RoleKind::Root]
    )]
    fn test_parent_chain(#[case] kind: RoleKind, #[case] expected: Vec<RoleKind>) {
        assert_eq!(RoleRegistry::standard().parents(kind), expected);
    }

    #[rstest]
    #[case(RoleKind::Root, false)]
    #[case(RoleKind::Targets, true)]
    #[case(RoleKind::Snapshot, true)]
    #[case(RoleKind::Timestamp, false)]
    fn test_versioned_names(#[case] kind: RoleKind, #[case] versioned: bool) {
        let registry = RoleRegistry::standard();
        assert_eq!(registry.get(kind).is_versioned(true), versioned);
        assert!(!registry.get(kind).is_versioned(false));
    }

    #[test]
    fn test_with_expiration() {
        let registry =
            RoleRegistry::standard().with_expiration(RoleKind::Timestamp, Duration::hours(1));
        assert_eq!(
            registry.get(RoleKind::Timestamp).default_expiration,
            Duration::hours(1)
        );
        assert_eq!(
            registry.get(RoleKind::Root).default_expiration,
            Duration::days(DEFAULT_ROOT_EXPIRATION_DAYS)
        );
    }

    #[test]
    fn test_by_name_and_non_root() {
        let registry = RoleRegistry::standard();
        assert_eq!(registry.by_name("snapshot").unwrap().kind, RoleKind::Snapshot);
        assert!(registry.by_name("mirrors").is_none());
        assert!(registry.non_root().all(|spec| spec.kind != RoleKind::Root));
        assert_eq!(registry.non_root().count(), 3);
    }

    #[test]
    fn test_expiry_is_whole_seconds() {
        let expiry = RoleRegistry::standard().get(RoleKind::Targets).expiry_from_now();
        assert_eq!(expiry.timestamp_subsec_nanos(), 0);
        assert!(expiry > Utc::now());
    }
}
