//! Configuration loading.
//!
//! This module handles parsing the updater's TOML configuration file and the
//! policy types derived from it.

mod error;
mod policy;
mod settings;

pub use error::ConfigError;
pub use policy::{AutoMergePolicy, GroupingMode, MergeMethod, UpdatePolicy, UpdateStrategy};
pub(crate) use settings::check_ref_name;
pub use settings::{
    default_branch_name_format, default_commit_title_format, default_group_branch_name_format,
    default_group_commit_title_format, default_group_pr_title_format, default_pr_title_format,
    UpdaterConfig, DEFAULT_REGISTRY_URL,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration file looked up in the workspace when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".github/quarto-extension-updater.toml";

/// Loads and validates a configuration file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read, can't be parsed, or
/// fails validation.
pub fn load_config(path: &Path) -> Result<UpdaterConfig, ConfigError> {
    info!(path = %path.display(), "Loading configuration");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: UpdaterConfig = toml::from_str(&contents).map_err(|e| ConfigError::TomlError {
        path: path.display().to_string(),
        source: e,
    })?;

    config.validate()?;
    Ok(config)
}

/// Resolves the configuration for a workspace.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] inside
/// the workspace is used when present, and built-in defaults otherwise.
///
/// # Errors
///
/// Returns [`ConfigError`] if the selected file is unreadable or invalid.
pub fn resolve_config(
    explicit: Option<&Path>,
    workspace: &Path,
) -> Result<UpdaterConfig, ConfigError> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = workspace.join(DEFAULT_CONFIG_PATH);
            if !candidate.is_file() {
                debug!(path = %candidate.display(), "No configuration file, using defaults");
                return Ok(UpdaterConfig::default());
            }
            candidate
        }
    };

    load_config(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn falls_back_to_defaults_without_file() {
        let temp = TempDir::new().unwrap();

        let config = resolve_config(None, temp.path()).unwrap();
        assert_eq!(config, UpdaterConfig::default());
    }

    #[test]
    fn picks_up_default_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".github")).unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_PATH),
            "update-strategy = \"patch\"\n",
        )
        .unwrap();

        let config = resolve_config(None, temp.path()).unwrap();
        assert_eq!(config.update_strategy, UpdateStrategy::Patch);
    }

    #[test]
    fn explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");

        let result = resolve_config(Some(&missing), temp.path());
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn reports_toml_errors_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("updater.toml");
        fs::write(&path, "update-strategy = [").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn validates_after_parsing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("updater.toml");
        fs::write(&path, "registry-url = \"nope\"\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
