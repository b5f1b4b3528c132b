//! Extension manifest discovery.

use crate::extensions::{ExtensionError, MANIFEST_FILE_NAMES};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Directory Quarto installs extensions into.
pub const EXTENSIONS_DIR: &str = "_extensions";

/// Finds every extension manifest under `<root>/_extensions`.
///
/// Both `_extensions/<owner>/<name>/_extension.yml` and the owner-less
/// `_extensions/<name>/_extension.yml` layouts are returned; the latter can't
/// be matched against the registry and is filtered out by
/// [`extract_owner_name`]. Paths are returned in file-name order.
///
/// # Errors
///
/// Returns [`ExtensionError`] if the directory exists but can't be walked.
pub fn find_manifests(root: &Path) -> Result<Vec<PathBuf>, ExtensionError> {
    let extensions_dir = root.join(EXTENSIONS_DIR);
    if !extensions_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut manifests = Vec::new();
    for entry in WalkDir::new(&extensions_dir)
        .min_depth(2)
        .max_depth(3)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ExtensionError::Walk {
            path: extensions_dir.display().to_string(),
            source: e,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_manifest = entry
            .file_name()
            .to_str()
            .is_some_and(|name| MANIFEST_FILE_NAMES.contains(&name));
        if is_manifest {
            manifests.push(entry.into_path());
        }
    }

    Ok(manifests)
}

/// Extracts `(owner, name)` from a manifest path of the form
/// `.../_extensions/<owner>/<name>/_extension.yml`.
#[must_use]
pub fn extract_owner_name(manifest_path: &Path) -> Option<(String, String)> {
    let components: Vec<&str> = manifest_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    let position = components.iter().rposition(|part| *part == EXTENSIONS_DIR)?;
    match &components[position + 1..] {
        [owner, name, _manifest] => Some(((*owner).to_string(), (*name).to_string())),
        _ => None,
    }
}
