//! Role file naming and version discovery
//!
//! Simple names are `<role>.<ext>`, consistent names are
//! `<version>.<role>.<ext>`. Discovery is the inverse: given the file names
//! of a directory (or of a snapshot's metadata listing) recover which
//! versions of a role are present.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use tuft_types::RoleKind;

use crate::error::{Error, Result};

/// `<role>.<ext>`
pub fn simple_file_name(role: &str, ext: &str) -> String {
    format!("{role}.{ext}")
}

/// `<version>.<role>.<ext>`
pub fn consistent_file_name(version: u64, role: &str, ext: &str) -> String {
    format!("{version}.{role}.{ext}")
}

/// File name of `role` at `version`, versioned or not
pub fn file_name(role: &str, version: u64, versioned: bool, ext: &str) -> String {
    if versioned {
        consistent_file_name(version, role, ext)
    } else {
        simple_file_name(role, ext)
    }
}

/// A file name that matched a role's discovery pattern
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    /// Version encoded in the name, `None` for simple names
    pub version: Option<u64>,
    /// The matching file name
    pub file_name: String,
}

/// Match `names` against the discovery pattern of `role`
///
/// With `versioned` every name of the form `<digits>.<role>.<ext>` is a
/// candidate; names whose digits do not fit a `u64` are dropped. Otherwise
/// only the literal simple name matches. The result is sorted by version,
/// ascending.
pub fn discover_versions<I, S>(
    names: I,
    role: &str,
    ext: &str,
    versioned: bool,
) -> Result<Vec<DiscoveredFile>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found = Vec::new();

    if !versioned {
        let simple = simple_file_name(role, ext);
        if names.into_iter().any(|name| name.as_ref() == simple) {
            found.push(DiscoveredFile {
                version: None,
                file_name: simple,
            });
        }
        return Ok(found);
    }

    let pattern = version_pattern(role, ext)?;
    for name in names {
        let name = name.as_ref();
        let Some(captures) = pattern.captures(name) else {
            continue;
        };
        match captures[1].parse::<u64>() {
            Ok(version) => found.push(DiscoveredFile {
                version: Some(version),
                file_name: name.to_string(),
            }),
            Err(e) => debug!(file = name, "ignoring malformed version: {e}"),
        }
    }

    found.sort();
    Ok(found)
}

/// File names in `dir`; a missing directory has none
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir)(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(Error::io(dir))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Latest file of `role` present in `dir`, if any
pub fn discover_in_dir(
    dir: &Path,
    role: &str,
    ext: &str,
    versioned: bool,
) -> Result<Option<DiscoveredFile>> {
    let names = list_file_names(dir)?;
    Ok(discover_versions(&names, role, ext, versioned)?.pop())
}

/// Locate the root metadata file in `dir`
///
/// In consistent mode a single `<version>.root.<ext>` file is used when
/// present and more than one is an error. Otherwise, and as a fallback,
/// `root.<ext>` is used.
pub fn find_root_file(dir: &Path, ext: &str, consistent: bool) -> Result<Option<PathBuf>> {
    let role = RoleKind::Root.name();
    let names = list_file_names(dir)?;

    if consistent {
        let mut candidates = discover_versions(&names, role, ext, true)?;
        if candidates.len() > 1 {
            let candidates: Vec<String> = candidates.into_iter().map(|c| c.file_name).collect();
            warn!(?candidates, "ambiguous root metadata in {}", dir.display());
            return Err(Error::AmbiguousRoleFiles {
                role: RoleKind::Root,
                candidates,
            });
        }
        if let Some(candidate) = candidates.pop() {
            return Ok(Some(dir.join(candidate.file_name)));
        }
    }

    Ok(discover_versions(&names, role, ext, false)?
        .pop()
        .map(|found| dir.join(found.file_name)))
}

fn version_pattern(role: &str, ext: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"^(\d+)\.{}\.{}$",
        regex::escape(role),
        regex::escape(ext)
    ))?)
}
