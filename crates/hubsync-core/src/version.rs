//! Collection version resolution and server version comparison

use crate::desired::DesiredState;
use crate::error::{HubError, Result};
use std::cmp::Ordering;
use std::path::Path;

const ARTIFACT_SUFFIX: &str = ".tar.gz";

/// Derive the version from an artifact file name
///
/// Assumes `<namespace>-<name>-<version>.tar.gz`: the last `-` segment with
/// the `.tar.gz` suffix removed. Names that deviate produce whatever that
/// segment happens to be.
///
/// # Examples
/// - `/tmp/awx-awx-15.0.0.tar.gz` -> `15.0.0`
/// - `community-general-1.2.3-beta.1.tar.gz` -> `beta.1`
pub fn version_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    let last = file_name.rsplit('-').next()?;
    let version = last.strip_suffix(ARTIFACT_SUFFIX).unwrap_or(last);
    Some(version.to_string())
}

/// Effective version of a reconciliation
///
/// # Priority
/// 1. Explicit, non-empty `version`
/// 2. Derived from the artifact `path` (present state only)
///
/// A present state without either fails with [`HubError::MissingVersion`];
/// an absent state without a version means "all versions" and yields `None`.
pub fn resolve_version(desired: &DesiredState) -> Result<Option<String>> {
    if let Some(version) = desired.explicit_version() {
        return Ok(Some(version.to_string()));
    }

    if !desired.is_present() {
        return Ok(None);
    }

    match desired.path.as_deref().and_then(version_from_path) {
        Some(version) => {
            tracing::debug!("Derived version {} from artifact file name", version);
            Ok(Some(version))
        }
        None => Err(HubError::MissingVersion),
    }
}

/// Version string reported by the server, compared numerically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    raw: String,
    parts: Vec<u64>,
}

impl ServerVersion {
    pub fn parse(raw: &str) -> Self {
        let parts = raw
            .trim()
            .trim_start_matches('v')
            .split('.')
            .map(leading_number)
            .collect();
        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    /// Component-wise numeric comparison, missing components count as 0
    pub fn compare(&self, other: &ServerVersion) -> Ordering {
        let len = std::cmp::max(self.parts.len(), other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    pub fn at_least(&self, other: &str) -> bool {
        self.compare(&ServerVersion::parse(other)) != Ordering::Less
    }
}

impl std::fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Leading digits of a component ("0dev" -> 0, "rc1" -> 0)
fn leading_number(component: &str) -> u64 {
    let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
