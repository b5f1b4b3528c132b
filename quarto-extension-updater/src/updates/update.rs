//! Update records.

use crate::version::{compare_versions, UpdateMagnitude, VersionComparison};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// An installed extension paired with a newer registry release.
///
/// Version strings are kept exactly as found (possibly `v`-prefixed); compare
/// them through [`crate::version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    /// Extension owner.
    pub owner: String,

    /// Extension name.
    pub name: String,

    /// Registry repository the release comes from, `owner/repo`.
    pub name_with_owner: String,

    /// Argument handed to the installer, `<owner/repo>@<tag>`.
    pub install_source_ref: String,

    /// Installed version.
    pub current_version: String,

    /// Latest released version.
    pub latest_version: String,

    /// Manifest path relative to the workspace root.
    pub manifest_path: PathBuf,

    /// Repository or documentation URL.
    pub homepage_url: Option<String>,

    /// Release notes URL.
    pub release_url: Option<String>,

    /// Short description.
    pub description: Option<String>,
}

impl Update {
    /// Returns the extension's `owner/name` identifier.
    #[must_use]
    pub fn extension_id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns the extension directory relative to the workspace root.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.manifest_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Returns the size of the update, or `None` if either version can't be
    /// parsed.
    #[must_use]
    pub fn magnitude(&self) -> Option<UpdateMagnitude> {
        match compare_versions(&self.current_version, &self.latest_version) {
            VersionComparison::Outdated(diff) => Some(diff.magnitude()),
            VersionComparison::UpToDate => Some(UpdateMagnitude::Patch),
            VersionComparison::Invalid => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_update(owner: &str, name: &str, current: &str, latest: &str) -> Update {
    Update {
        owner: owner.to_string(),
        name: name.to_string(),
        name_with_owner: format!("{owner}/{name}"),
        install_source_ref: format!("{owner}/{name}@{latest}"),
        current_version: current.to_string(),
        latest_version: latest.to_string(),
        manifest_path: PathBuf::from(format!("_extensions/{owner}/{name}/_extension.yml")),
        homepage_url: None,
        release_url: None,
        description: None,
    }
}
