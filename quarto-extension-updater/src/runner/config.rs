//! Runner configuration.

use crate::config::UpdaterConfig;
use std::path::{Path, PathBuf};

/// Configuration for one updater run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Workspace containing the `_extensions` directory.
    workspace: PathBuf,
    /// GitHub token used for API calls.
    token: Option<String>,
    /// Target repository, `owner/name`.
    repository: Option<String>,
    /// Whether to preview changes without installing or touching the host.
    dry_run: bool,
    /// Updater settings.
    updater: UpdaterConfig,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(workspace: PathBuf, updater: UpdaterConfig, dry_run: bool) -> Self {
        Self {
            workspace,
            token: None,
            repository: None,
            dry_run,
            updater,
        }
    }

    /// Sets the GitHub token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the target repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Returns the workspace path.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the target repository.
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the updater settings.
    pub fn updater(&self) -> &UpdaterConfig {
        &self.updater
    }
}
