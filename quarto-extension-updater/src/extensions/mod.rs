//! Installed extension discovery.
//!
//! Scans a workspace's `_extensions` directory and reads each manifest into
//! an [`InstalledExtension`] snapshot.

mod error;
mod installed;
mod manifest;
mod scan;

pub use error::ExtensionError;
pub use installed::{repository_from_source, InstalledExtension};
pub use manifest::{read_extension_manifest, read_manifest, ExtensionManifest, MANIFEST_FILE_NAMES};
pub use scan::{extract_owner_name, find_manifests, EXTENSIONS_DIR};

use std::path::Path;
use tracing::{debug, info, warn};

/// Scans a workspace for installed extensions.
///
/// Manifests that can't be parsed, or that live outside the
/// `_extensions/<owner>/<name>` layout, are logged and skipped. The returned
/// order is the scan order and is preserved by every later stage.
///
/// # Errors
///
/// Returns [`ExtensionError`] if the extensions directory can't be walked.
pub fn scan_installed_extensions(root: &Path) -> Result<Vec<InstalledExtension>, ExtensionError> {
    info!(root = %root.display(), "Scanning for installed extensions");

    let mut installed = Vec::new();
    for manifest_path in find_manifests(root)? {
        let Some((owner, name)) = extract_owner_name(&manifest_path) else {
            debug!(path = %manifest_path.display(), "Extension has no owner, skipping");
            continue;
        };

        let manifest = match read_manifest(&manifest_path) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => continue,
            Err(e) => {
                warn!(path = %manifest_path.display(), error = %e, "Failed to read manifest");
                continue;
            }
        };

        let relative = manifest_path
            .strip_prefix(root)
            .unwrap_or(&manifest_path)
            .to_path_buf();

        debug!(extension = %format!("{owner}/{name}"), version = ?manifest.version, "Found extension");
        installed.push(InstalledExtension {
            owner,
            name,
            manifest_path: relative,
            version: manifest.version,
            source: manifest.source,
        });
    }

    info!(count = installed.len(), "Found installed extensions");
    Ok(installed)
}
