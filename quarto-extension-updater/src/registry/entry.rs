//! Registry entries.

use serde::{Deserialize, Serialize};

/// Latest-release information for one extension repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Repository identifier, `owner/repo`.
    pub owner_repo: String,

    /// Latest version, possibly `v`-prefixed.
    pub latest_version: String,

    /// Release tag the latest version is installed from.
    pub latest_version_tag: String,

    /// Release notes URL.
    pub release_notes_url: Option<String>,

    /// Short description.
    pub description: Option<String>,

    /// Repository or documentation URL.
    pub homepage_url: Option<String>,
}

/// Entry as published in the registry document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntry {
    pub(crate) name_with_owner: Option<String>,
    pub(crate) latest_release: Option<String>,
    pub(crate) latest_version: Option<String>,
    pub(crate) latest_release_url: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) url: Option<String>,
}

impl RawEntry {
    /// Converts into a [`RegistryEntry`], using `key` when the document omits
    /// `nameWithOwner`. Returns `None` for repositories without a release.
    pub(crate) fn into_entry(self, key: Option<&str>) -> Option<RegistryEntry> {
        let owner_repo = self
            .name_with_owner
            .filter(|name| !name.trim().is_empty())
            .or_else(|| key.map(str::to_string))?;

        let tag = non_empty(self.latest_release).or_else(|| self.latest_version.clone())?;
        let tag = non_empty(Some(tag))?;
        let latest_version = non_empty(self.latest_version).unwrap_or_else(|| tag.clone());

        Some(RegistryEntry {
            owner_repo,
            latest_version,
            latest_version_tag: tag,
            release_notes_url: non_empty(self.latest_release_url),
            description: non_empty(self.description),
            homepage_url: non_empty(self.url),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "none")
}
