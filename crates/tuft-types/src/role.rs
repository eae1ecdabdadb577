//! The four role kinds of a repository

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identifies which role a metadata document belongs to
///
/// The ordering follows the delegation chain: root first, timestamp last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Authorizes the signing keys of every role, itself included
    Root,
    /// Lists the distributable files and their digests
    Targets,
    /// Pins the versions of all other metadata files
    Snapshot,
    /// Attests freshness by referencing the current snapshot
    Timestamp,
}

impl RoleKind {
    /// All role kinds in delegation order
    pub const ALL: [RoleKind; 4] = [
        RoleKind::Root,
        RoleKind::Targets,
        RoleKind::Snapshot,
        RoleKind::Timestamp,
    ];

    /// Role name as used in file names and in root's `roles` map
    pub fn name(&self) -> &'static str {
        match self {
            RoleKind::Root => "root",
            RoleKind::Targets => "targets",
            RoleKind::Snapshot => "snapshot",
            RoleKind::Timestamp => "timestamp",
        }
    }

    /// Parse a role name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "root" => Ok(RoleKind::Root),
            "targets" => Ok(RoleKind::Targets),
            "snapshot" => Ok(RoleKind::Snapshot),
            "timestamp" => Ok(RoleKind::Timestamp),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RoleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RoleKind::Root, "root")]
    #[case(RoleKind::Targets, "targets")]
    #[case(RoleKind::Snapshot, "snapshot")]
    #[case(RoleKind::Timestamp, "timestamp")]
    fn test_names_roundtrip(#[case] kind: RoleKind, #[case] name: &str) {
        assert_eq!(kind.name(), name);
        assert_eq!(name.parse::<RoleKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), name);
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            RoleKind::from_name("mirrors"),
            Err(Error::UnknownRole(name)) if name == "mirrors"
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&RoleKind::Snapshot).unwrap(), "\"snapshot\"");
    }
}
