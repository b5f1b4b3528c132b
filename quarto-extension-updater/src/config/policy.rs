//! Update and auto-merge policies.

use crate::config::ConfigError;
use crate::version::UpdateMagnitude;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Largest update magnitude a policy accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStrategy {
    /// Any update.
    #[default]
    All,
    /// Patch and minor updates.
    Minor,
    /// Patch updates only.
    Patch,
}

impl UpdateStrategy {
    /// Returns true if an update of the given magnitude is within this strategy.
    #[must_use]
    pub fn permits(self, magnitude: UpdateMagnitude) -> bool {
        match self {
            Self::All => true,
            Self::Minor => magnitude <= UpdateMagnitude::Minor,
            Self::Patch => magnitude == UpdateMagnitude::Patch,
        }
    }

    /// Returns the strategy as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(ConfigError::InvalidValue {
                field: "update strategy",
                value: s.to_string(),
                expected: "one of 'all', 'minor', 'patch'",
            }),
        }
    }
}

/// Merge method used when auto-merge completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Merge commit.
    Merge,
    /// Squash and merge.
    #[default]
    Squash,
    /// Rebase and merge.
    Rebase,
}

impl MergeMethod {
    /// Returns the `PullRequestMergeMethod` GraphQL enum value.
    #[must_use]
    pub fn graphql_value(self) -> &'static str {
        match self {
            Self::Merge => "MERGE",
            Self::Squash => "SQUASH",
            Self::Rebase => "REBASE",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        })
    }
}

impl FromStr for MergeMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            _ => Err(ConfigError::InvalidValue {
                field: "merge method",
                value: s.to_string(),
                expected: "one of 'merge', 'squash', 'rebase'",
            }),
        }
    }
}

/// How qualifying updates are split into pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// One pull request per extension.
    PerExtension,
    /// A single pull request containing every update.
    Single,
}

/// Which installed extensions are considered for updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Largest accepted update magnitude.
    pub update_strategy: UpdateStrategy,

    /// If non-empty, only these `owner/name` extensions are considered.
    pub include: Vec<String>,

    /// These `owner/name` extensions are never considered. Wins over `include`.
    pub exclude: Vec<String>,
}

impl UpdatePolicy {
    /// Returns true if the `owner/name` extension passes the include and
    /// exclude filters.
    #[must_use]
    pub fn allows(&self, name_with_owner: &str) -> bool {
        if self.exclude.iter().any(|entry| entry == name_with_owner) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|entry| entry == name_with_owner)
    }
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_retry_delay_secs() -> u64 {
    10
}

/// Auto-merge settings, read from the `[auto-merge]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AutoMergePolicy {
    /// Whether auto-merge is requested at all.
    pub enabled: bool,

    /// Largest update magnitude that may be merged automatically.
    pub strategy: UpdateStrategy,

    /// Merge method passed to the host.
    pub merge_method: MergeMethod,

    /// Wait before the first enable attempt, in seconds.
    pub initial_delay_secs: u64,

    /// Wait before the single retry, in seconds.
    pub retry_delay_secs: u64,
}

impl Default for AutoMergePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            strategy: UpdateStrategy::Patch,
            merge_method: MergeMethod::default(),
            initial_delay_secs: default_initial_delay_secs(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl AutoMergePolicy {
    /// Delay before the first enable attempt.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// Delay before retrying after a transient failure.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
