//! `_extension.yml` manifest reading.

use crate::extensions::ExtensionError;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// File names Quarto accepts for an extension manifest, in lookup order.
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["_extension.yml", "_extension.yaml"];

/// The subset of `_extension.yml` the updater cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionManifest {
    /// Human-readable title.
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    /// Installed version.
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,

    /// Where the extension was installed from, e.g. `owner/repo@v1.2.0`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub source: Option<String>,

    /// Minimum Quarto version, e.g. `>=1.4.0`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub quarto_required: Option<String>,
}

/// Accepts strings, numbers and booleans; `version: 1.0` is common in the wild.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Reads a manifest file.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns [`ExtensionError`] if the file exists but can't be read or parsed.
pub fn read_manifest(path: &Path) -> Result<Option<ExtensionManifest>, ExtensionError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ExtensionError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(Some(ExtensionManifest::default()));
    }

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|e| ExtensionError::Yaml {
            path: path.display().to_string(),
            source: e,
        })
}

/// Reads the manifest inside an extension directory, trying each accepted
/// file name.
///
/// # Errors
///
/// Returns [`ExtensionError`] if a manifest exists but can't be read or parsed.
pub fn read_extension_manifest(directory: &Path) -> Result<Option<ExtensionManifest>, ExtensionError> {
    for file_name in MANIFEST_FILE_NAMES {
        if let Some(manifest) = read_manifest(&directory.join(file_name))? {
            return Ok(Some(manifest));
        }
    }
    Ok(None)
}
