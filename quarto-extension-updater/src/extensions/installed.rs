//! Installed extension records.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// An extension vendored in the workspace, as found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledExtension {
    /// Extension owner (the `_extensions/<owner>` directory).
    pub owner: String,

    /// Extension name (the `_extensions/<owner>/<name>` directory).
    pub name: String,

    /// Manifest path relative to the workspace root.
    pub manifest_path: PathBuf,

    /// Version recorded in the manifest.
    pub version: Option<String>,

    /// Install source recorded in the manifest, e.g. `owner/repo@v1.2.0`.
    pub source: Option<String>,
}

impl InstalledExtension {
    /// Returns the `owner/name` identifier.
    #[must_use]
    pub fn name_with_owner(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns the extension directory relative to the workspace root.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.manifest_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Returns the `owner/repo` the extension was installed from, if the
    /// recorded source points at a repository.
    #[must_use]
    pub fn declared_repository(&self) -> Option<String> {
        self.source.as_deref().and_then(repository_from_source)
    }
}

/// Extracts `owner/repo` from an install source.
///
/// Accepts `owner/repo`, `owner/repo@ref`, `github.com/owner/repo` and full
/// `https://github.com/owner/repo(.git)(/...)` URLs. Local paths and archive
/// files yield `None`.
#[must_use]
pub fn repository_from_source(source: &str) -> Option<String> {
    let source = source.trim();
    let (has_scheme, rest) = match source
        .strip_prefix("https://")
        .or_else(|| source.strip_prefix("http://"))
    {
        Some(rest) => (true, rest),
        None => (false, source),
    };
    let rest = match rest
        .strip_prefix("www.github.com/")
        .or_else(|| rest.strip_prefix("github.com/"))
    {
        Some(path) => path,
        // URLs on any other host are archives or mirrors, not registry repositories.
        None if has_scheme => return None,
        None => rest,
    };

    let path = rest.split('@').next().unwrap_or(rest);
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if owner.starts_with('.')
        || repo.is_empty()
        || repo.ends_with(".zip")
        || repo.ends_with(".tar.gz")
        || owner.contains(':')
    {
        return None;
    }

    Some(format!("{owner}/{repo}"))
}
