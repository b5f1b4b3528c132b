//! Orchestrates a complete update run.
//!
//! scan → registry → resolve → classify → preview or pull requests → summary.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::config::ConfigError;
use crate::extensions::scan_installed_extensions;
use crate::host::{GitHubHost, HostService, RepositoryRef};
use crate::installer::{ExtensionInstaller, QuartoInstaller};
use crate::pull_requests::Orchestrator;
use crate::registry::{fetch_registry, RegistryEntry};
use crate::summary::RunSummary;
use crate::templates::TemplateRenderer;
use crate::updates::{classify_updates, group_updates, resolve_updates, Update};
use crate::workspace::{GitWorkspace, Workspace};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

/// Runs the updater against one workspace.
pub struct Runner {
    config: RunnerConfig,
    renderer: TemplateRenderer,
    run_date: NaiveDate,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the updater settings are invalid.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.updater().validate()?;
        Ok(Self {
            config,
            renderer: TemplateRenderer::new(),
            run_date: Utc::now().date_naive(),
        })
    }

    /// Overrides the date used in titles and bodies.
    #[must_use]
    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    /// Executes the full flow: fetches the registry, then previews or applies
    /// the updates.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first fatal failure.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let updater = self.config.updater();
        let registry = fetch_registry(&updater.registry_url, updater.registry_timeout()).await?;

        if self.config.dry_run() {
            return self.preview(&registry);
        }

        let token = self.config.token().ok_or(ConfigError::ValidationError {
            field: "token",
            message: "a GitHub token is required unless running with --dry-run".to_string(),
        })?;
        let repository: RepositoryRef = self
            .config
            .repository()
            .ok_or(ConfigError::ValidationError {
                field: "repository",
                message: "a target repository is required unless running with --dry-run"
                    .to_string(),
            })?
            .parse()?;

        let host = GitHubHost::new(token, repository)?;
        let installer = QuartoInstaller::new(updater.installer_command.clone());
        let workspace = GitWorkspace::open(self.config.workspace()).await?;

        self.apply(&registry, &host, &installer, &workspace).await
    }

    /// Prints the branches and titles that would be produced, without
    /// installing anything or calling the host.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the workspace can't be scanned or a name
    /// can't be rendered.
    pub fn preview(&self, registry: &[RegistryEntry]) -> Result<RunSummary, RunnerError> {
        let (updates, mut summary) = self.plan(registry, true)?;
        summary.dry_run = true;

        let updater = self.config.updater();
        let groups = group_updates(updates, updater.grouping_mode());

        println!("\n[DRY RUN] {} update(s) found", summary.updates_found);
        for (i, group) in groups.iter().enumerate() {
            let branch = self.renderer.branch_name(updater, group, self.run_date)?;
            let title = self.renderer.pr_title(updater, group, self.run_date)?;

            println!("\n  [{}/{}] {title}", i + 1, groups.len());
            println!("    Branch: {branch}");
            for update in group.updates() {
                println!(
                    "    {}: {} -> {} ({})",
                    update.extension_id(),
                    update.current_version,
                    update.latest_version,
                    update.magnitude().map_or("unknown", |m| m.as_str())
                );
            }
        }
        println!();

        Ok(summary)
    }

    /// Resolves updates and opens or refreshes their pull requests.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first fatal failure.
    pub async fn apply(
        &self,
        registry: &[RegistryEntry],
        host: &dyn HostService,
        installer: &dyn ExtensionInstaller,
        workspace: &dyn Workspace,
    ) -> Result<RunSummary, RunnerError> {
        let (updates, mut summary) = self.plan(registry, false)?;
        if updates.is_empty() {
            info!("All extensions are up to date");
            return Ok(summary);
        }

        let host_version = installer.host_version().await;
        match &host_version {
            Some(version) => info!(%version, "Detected Quarto version"),
            None => warn!("Could not determine Quarto version"),
        }

        let updater = self.config.updater();
        let orchestrator = Orchestrator::new(
            host,
            installer,
            workspace,
            &self.renderer,
            updater,
            self.run_date,
        )
        .with_host_version(host_version);

        let results = orchestrator
            .process_all(updates, updater.grouping_mode())
            .await?;
        for result in &results {
            summary.record_result(result);
        }

        info!(
            applied = summary.updates_applied,
            skipped = summary.updates_skipped,
            created = summary.prs_created,
            updated = summary.prs_updated,
            unchanged = summary.prs_unchanged,
            "Run complete"
        );
        Ok(summary)
    }

    fn plan(
        &self,
        registry: &[RegistryEntry],
        dry_run: bool,
    ) -> Result<(Vec<Update>, RunSummary), RunnerError> {
        let mut summary = RunSummary::new(dry_run);

        let installed = scan_installed_extensions(self.config.workspace())?;
        summary.extensions_scanned = installed.len();

        let updates = resolve_updates(&installed, registry, &self.config.updater().update_policy());
        summary.updates_found = updates.len();

        let classification = classify_updates(&updates);
        summary.record_classification(&classification);
        info!(
            found = updates.len(),
            major = classification.major.len(),
            minor = classification.minor.len(),
            patch = classification.patch.len(),
            "Resolved updates"
        );

        Ok((updates, summary))
    }
}
