//! Updater settings deserialization and validation.

use crate::config::{AutoMergePolicy, ConfigError, GroupingMode, UpdatePolicy, UpdateStrategy};
use bstr::ByteSlice;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default location of the community extensions registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://m.canouil.dev/quarto-extensions/extensions.json";

/// Settings for one updater run, read from the TOML configuration file.
///
/// Every key is optional; omitted keys fall back to the defaults below. The
/// value is immutable for the duration of a run and passed explicitly to
/// every component that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Largest update magnitude to apply.
    pub update_strategy: UpdateStrategy,

    /// If non-empty, only these `owner/name` extensions are updated.
    pub include: Vec<String>,

    /// These `owner/name` extensions are never updated.
    pub exclude: Vec<String>,

    /// Whether all updates go into a single pull request.
    pub group_updates: bool,

    /// Branch the pull requests target. Defaults to the repository default branch.
    pub base_branch: Option<String>,

    /// Prefix for update branches.
    pub branch_prefix: String,

    /// Labels applied to every update pull request.
    pub labels: Vec<String>,

    /// Users asked to review.
    pub reviewers: Vec<String>,

    /// Teams asked to review.
    pub team_reviewers: Vec<String>,

    /// Users assigned to the pull request.
    pub assignees: Vec<String>,

    /// Handlebars format for single-extension branch names.
    pub branch_name_format: String,

    /// Handlebars format for the grouped branch name.
    pub group_branch_name_format: String,

    /// Handlebars format for single-extension PR titles.
    pub pr_title_format: String,

    /// Handlebars format for the grouped PR title.
    pub group_pr_title_format: String,

    /// Handlebars format for single-extension commit titles.
    pub commit_title_format: String,

    /// Handlebars format for the grouped commit title.
    pub group_commit_title_format: String,

    /// URL of the extensions registry document.
    pub registry_url: String,

    /// Timeout for the registry request, in seconds.
    pub registry_timeout_secs: u64,

    /// Program used to install extensions.
    pub installer_command: String,

    /// Auto-merge settings.
    pub auto_merge: AutoMergePolicy,
}

/// Default handlebars format for single-extension branch names.
pub fn default_branch_name_format() -> String {
    "{{prefix}}/{{owner}}-{{name}}-{{version}}".to_string()
}

/// Default handlebars format for the grouped branch name.
pub fn default_group_branch_name_format() -> String {
    "{{prefix}}/all-extensions".to_string()
}

/// Default handlebars format for single-extension PR titles.
pub fn default_pr_title_format() -> String {
    "chore(deps): update {{owner}}/{{name}} extension to {{version}}".to_string()
}

/// Default handlebars format for the grouped PR title.
pub fn default_group_pr_title_format() -> String {
    "chore(deps): update Quarto extensions ({{date}})".to_string()
}

/// Default handlebars format for single-extension commit titles.
pub fn default_commit_title_format() -> String {
    "chore(deps): update {{owner}}/{{name}} extension to {{version}}".to_string()
}

/// Default handlebars format for the grouped commit title.
pub fn default_group_commit_title_format() -> String {
    "chore(deps): update {{count}} Quarto extensions".to_string()
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            update_strategy: UpdateStrategy::All,
            include: Vec::new(),
            exclude: Vec::new(),
            group_updates: false,
            base_branch: None,
            branch_prefix: "chore/quarto-extensions".to_string(),
            labels: vec!["dependencies".to_string(), "quarto-extensions".to_string()],
            reviewers: Vec::new(),
            team_reviewers: Vec::new(),
            assignees: Vec::new(),
            branch_name_format: default_branch_name_format(),
            group_branch_name_format: default_group_branch_name_format(),
            pr_title_format: default_pr_title_format(),
            group_pr_title_format: default_group_pr_title_format(),
            commit_title_format: default_commit_title_format(),
            group_commit_title_format: default_group_commit_title_format(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_timeout_secs: 30,
            installer_command: "quarto".to_string(),
            auto_merge: AutoMergePolicy::default(),
        }
    }
}

impl UpdaterConfig {
    /// Returns the include/exclude/strategy policy for the resolver.
    #[must_use]
    pub fn update_policy(&self) -> UpdatePolicy {
        UpdatePolicy {
            update_strategy: self.update_strategy,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }

    /// Returns how updates are split into pull requests.
    #[must_use]
    pub fn grouping_mode(&self) -> GroupingMode {
        if self.group_updates {
            GroupingMode::Single
        } else {
            GroupingMode::PerExtension
        }
    }

    /// Returns the registry request timeout.
    #[must_use]
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.registry_url).map_err(|_| ConfigError::InvalidValue {
            field: "registry-url",
            value: self.registry_url.clone(),
            expected: "an absolute http(s) URL",
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "registry-url",
                value: self.registry_url.clone(),
                expected: "an absolute http(s) URL",
            });
        }

        if self.registry_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "registry-timeout-secs",
                message: "must be greater than zero".to_string(),
            });
        }

        check_ref_name(&self.branch_prefix).map_err(|message| ConfigError::ValidationError {
            field: "branch-prefix",
            message,
        })?;

        if let Some(base) = &self.base_branch {
            check_ref_name(base).map_err(|message| ConfigError::ValidationError {
                field: "base-branch",
                message,
            })?;
        }

        for (field, entries) in [("include", &self.include), ("exclude", &self.exclude)] {
            if let Some(entry) = entries.iter().find(|entry| !is_owner_name(entry)) {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: entry.clone(),
                    expected: "an 'owner/name' extension identifier",
                });
            }
        }

        if self.installer_command.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "installer-command",
                message: "must not be empty".to_string(),
            });
        }

        for (field, format) in [
            ("branch-name-format", &self.branch_name_format),
            ("group-branch-name-format", &self.group_branch_name_format),
            ("pr-title-format", &self.pr_title_format),
            ("group-pr-title-format", &self.group_pr_title_format),
            ("commit-title-format", &self.commit_title_format),
            ("group-commit-title-format", &self.group_commit_title_format),
        ] {
            if format.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    field,
                    message: "must not be empty".to_string(),
                });
            }
            handlebars::Template::compile(format).map_err(|e| ConfigError::ValidationError {
                field,
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Checks that `name` is usable as a (partial) git reference name.
pub(crate) fn check_ref_name(name: &str) -> Result<(), String> {
    gix_validate::reference::name_partial(name.as_bytes().as_bstr())
        .map(|_| ())
        .map_err(|e| format!("'{name}' is not a valid git reference name: {e}"))
}

fn is_owner_name(entry: &str) -> bool {
    let mut parts = entry.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeMethod;

    #[test]
    fn defaults_are_valid() {
        let config = UpdaterConfig::default();
        config.validate().unwrap();
        assert_eq!(config.grouping_mode(), GroupingMode::PerExtension);
        assert!(!config.auto_merge.enabled);
    }

    #[test]
    fn parses_kebab_case_keys() {
        let config: UpdaterConfig = toml::from_str(
            r#"
update-strategy = "minor"
exclude = ["mcanouil/iconify"]
group-updates = true
labels = ["deps"]

[auto-merge]
enabled = true
strategy = "patch"
merge-method = "rebase"
initial-delay-secs = 1
"#,
        )
        .unwrap();

        assert_eq!(config.update_strategy, UpdateStrategy::Minor);
        assert_eq!(config.exclude, vec!["mcanouil/iconify".to_string()]);
        assert_eq!(config.grouping_mode(), GroupingMode::Single);
        assert_eq!(config.labels, vec!["deps".to_string()]);
        assert!(config.auto_merge.enabled);
        assert_eq!(config.auto_merge.merge_method, MergeMethod::Rebase);
        assert_eq!(config.auto_merge.initial_delay_secs, 1);
        assert_eq!(config.auto_merge.retry_delay_secs, 10);
        assert_eq!(config.branch_name_format, default_branch_name_format());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result = toml::from_str::<UpdaterConfig>(r#"update-strategy = "major""#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_registry_url() {
        let config = UpdaterConfig {
            registry_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "registry-url",
                ..
            })
        ));

        let config = UpdaterConfig {
            registry_url: "ftp://example.com/extensions.json".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_invalid_branch_prefix() {
        let config = UpdaterConfig {
            branch_prefix: "bad prefix..".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError {
                field: "branch-prefix",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_filter_entries() {
        let config = UpdaterConfig {
            include: vec!["iconify".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "include",
                ..
            })
        ));
    }

    #[test]
    fn rejects_broken_format() {
        let config = UpdaterConfig {
            pr_title_format: "update {{#if name}}".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn checks_ref_names() {
        assert!(check_ref_name("chore/quarto-extensions/mcanouil-iconify-1.2.0").is_ok());
        assert!(check_ref_name("a..b").is_err());
        assert!(check_ref_name("").is_err());
    }
}
