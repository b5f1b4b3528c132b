//! Turns update groups into pull requests.

use crate::auto_merge::enable_auto_merge;
use crate::config::{check_ref_name, GroupingMode, UpdaterConfig};
use crate::host::{HostError, HostService, PullRequest};
use crate::installer::ExtensionInstaller;
use crate::pull_requests::commit::commit_changes;
use crate::pull_requests::{PrAction, PrError, PrResult, SkippedUpdate};
use crate::templates::TemplateRenderer;
use crate::updates::{group_updates, Update, UpdateGroup};
use crate::version::normalise_version;
use crate::workspace::{FileChange, Workspace};
use chrono::NaiveDate;
use semver::{Version, VersionReq};
use tracing::{debug, info, info_span, warn, Instrument};

/// Reason recorded when an install leaves the tree untouched.
const NO_CHANGES_REASON: &str = "no file changes after installation";

/// Processes update groups one at a time against a host.
pub struct Orchestrator<'a> {
    host: &'a dyn HostService,
    installer: &'a dyn ExtensionInstaller,
    workspace: &'a dyn Workspace,
    renderer: &'a TemplateRenderer,
    config: &'a UpdaterConfig,
    run_date: NaiveDate,
    host_version: Option<Version>,
}

/// Updates that made it to disk, with their combined file changes.
struct Materialised {
    applied: Vec<Update>,
    skipped: Vec<SkippedUpdate>,
    changes: Vec<FileChange>,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(
        host: &'a dyn HostService,
        installer: &'a dyn ExtensionInstaller,
        workspace: &'a dyn Workspace,
        renderer: &'a TemplateRenderer,
        config: &'a UpdaterConfig,
        run_date: NaiveDate,
    ) -> Self {
        Self {
            host,
            installer,
            workspace,
            renderer,
            config,
            run_date,
            host_version: None,
        }
    }

    /// Sets the host tool version used to check `quarto-required`.
    #[must_use]
    pub fn with_host_version(mut self, version: Option<Version>) -> Self {
        self.host_version = version;
        self
    }

    /// Groups `updates` and processes every group in order.
    ///
    /// Stops at the first group that fails.
    ///
    /// # Errors
    ///
    /// Returns [`PrError`] from the first failing group.
    pub async fn process_all(
        &self,
        updates: Vec<Update>,
        mode: GroupingMode,
    ) -> Result<Vec<PrResult>, PrError> {
        let groups = group_updates(updates, mode);
        info!(groups = groups.len(), "Processing update groups");

        let mut results = Vec::with_capacity(groups.len());
        for group in &groups {
            results.push(self.process_group(group).await?);
        }
        Ok(results)
    }

    /// Opens or refreshes the pull request for one group.
    ///
    /// An open pull request on the group's branch with exactly the computed
    /// title is reused without touching the working tree or the host. Updates
    /// that fail to install or need a newer host tool are reverted and
    /// reported in [`PrResult::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`PrError`] on host, template or workspace failures.
    pub async fn process_group(&self, group: &UpdateGroup) -> Result<PrResult, PrError> {
        let branch = self
            .renderer
            .branch_name(self.config, group, self.run_date)?;
        check_ref_name(&branch).map_err(|message| PrError::InvalidBranchName {
            branch: branch.clone(),
            message,
        })?;
        let title = self.renderer.pr_title(self.config, group, self.run_date)?;

        let span = info_span!("process_group", branch = %branch, updates = group.len());

        async {
            let open = self.host.find_open_pull_requests(&branch).await?;
            if let Some(pr) = open.iter().find(|pr| pr.title == title) {
                info!(pr_number = pr.number, "Pull request already up to date");
                return Ok(PrResult {
                    number: pr.number,
                    url: pr.url.clone(),
                    branch: branch.clone(),
                    title: title.clone(),
                    action: PrAction::Unchanged,
                    extensions: group.extension_ids(),
                    applied: Vec::new(),
                    skipped: Vec::new(),
                    auto_merge: None,
                });
            }
            let existing = open.into_iter().next();

            let Materialised {
                applied,
                skipped,
                changes,
            } = self.materialise(group).await?;

            let applied_group = match UpdateGroup::new(applied) {
                Some(applied_group) if !changes.is_empty() => applied_group,
                _ => {
                    info!(skipped = skipped.len(), "No changes to commit");
                    return Ok(PrResult {
                        number: 0,
                        url: String::new(),
                        branch: branch.clone(),
                        title: title.clone(),
                        action: PrAction::NotCreated,
                        extensions: group.extension_ids(),
                        applied: Vec::new(),
                        skipped,
                        auto_merge: None,
                    });
                }
            };

            let base_branch = match &self.config.base_branch {
                Some(base) => base.clone(),
                None => self.host.default_branch().await?,
            };
            let base_sha = self
                .host
                .branch_head(&base_branch)
                .await?
                .ok_or_else(|| PrError::MissingBaseBranch {
                    branch: base_branch.clone(),
                })?;

            self.reset_branch(&branch, &base_sha).await?;

            let message = self
                .renderer
                .commit_message(self.config, &applied_group, self.run_date)?;
            let commit = commit_changes(self.host, &base_sha, &message, &changes).await?;
            self.host.update_branch(&branch, &commit, true).await?;

            let body = self
                .renderer
                .pr_body(self.config, &applied_group, &skipped, self.run_date)?;
            let (pr, action) = match existing {
                Some(existing) => {
                    let pr = self
                        .host
                        .update_pull_request(existing.number, &title, &body)
                        .await?;
                    info!(pr_number = pr.number, "Updated pull request");
                    (pr, PrAction::Updated)
                }
                None => {
                    let pr = self
                        .host
                        .create_pull_request(&branch, &base_branch, &title, &body)
                        .await?;
                    info!(pr_number = pr.number, url = %pr.url, "Created pull request");
                    (pr, PrAction::Created)
                }
            };

            if !self.config.labels.is_empty() {
                self.host.set_labels(pr.number, &self.config.labels).await?;
            }
            self.assign(&pr).await;

            let auto_merge = enable_auto_merge(
                self.host,
                pr.number,
                &applied_group,
                &self.config.auto_merge,
            )
            .await;

            Ok(PrResult {
                number: pr.number,
                url: pr.url,
                branch: branch.clone(),
                title: title.clone(),
                action,
                extensions: group.extension_ids(),
                applied: applied_group.updates().to_vec(),
                skipped,
                auto_merge: Some(auto_merge),
            })
        }
        .instrument(span)
        .await
    }

    /// Installs every update of the group, keeping the ones that produce
    /// changes and satisfy the host tool requirement.
    async fn materialise(&self, group: &UpdateGroup) -> Result<Materialised, PrError> {
        let mut materialised = Materialised {
            applied: Vec::new(),
            skipped: Vec::new(),
            changes: Vec::new(),
        };

        for update in group.updates() {
            let directory = update.directory();
            let id = update.extension_id();

            if let Err(e) = self
                .installer
                .install(&update.install_source_ref, self.workspace.root())
                .await
            {
                let reason = e.reason();
                warn!(extension = %id, source = %update.install_source_ref, %reason, "Install failed");
                self.discard(directory).await?;
                materialised.skipped.push(SkippedUpdate {
                    update: update.clone(),
                    reason,
                });
                continue;
            }

            if let Some(reason) = self.unmet_requirement(update).await? {
                warn!(extension = %id, %reason, "Reverting extension");
                self.discard(directory).await?;
                materialised.skipped.push(SkippedUpdate {
                    update: update.clone(),
                    reason,
                });
                continue;
            }

            let changes = self.workspace.changed_files(directory).await?;
            if changes.is_empty() {
                debug!(extension = %id, "Install produced no changes");
                materialised.skipped.push(SkippedUpdate {
                    update: update.clone(),
                    reason: NO_CHANGES_REASON.to_string(),
                });
                continue;
            }

            info!(
                extension = %id,
                from = %update.current_version,
                to = %update.latest_version,
                files = changes.len(),
                "Installed update"
            );
            materialised.changes.extend(changes);
            materialised.applied.push(update.clone());
        }

        Ok(materialised)
    }

    /// Returns why the installed manifest can't be kept, if it can't.
    async fn unmet_requirement(&self, update: &Update) -> Result<Option<String>, PrError> {
        let manifest = self.workspace.read_manifest(update.directory()).await?;
        let Some(required) = manifest.and_then(|m| m.quarto_required) else {
            return Ok(None);
        };

        let Some(available) = &self.host_version else {
            warn!(
                extension = %update.extension_id(),
                %required,
                "Quarto version unknown, not checking requirement"
            );
            return Ok(None);
        };

        match requirement_satisfied(&required, available) {
            Some(true) => Ok(None),
            Some(false) => Ok(Some(format!(
                "requires Quarto {required}, but {available} is installed"
            ))),
            None => {
                warn!(
                    extension = %update.extension_id(),
                    %required,
                    "Unrecognised Quarto version requirement, not checking"
                );
                Ok(None)
            }
        }
    }

    /// Reverts any changes left under `directory`.
    async fn discard(&self, directory: &std::path::Path) -> Result<(), PrError> {
        if !self.workspace.changed_files(directory).await?.is_empty() {
            self.workspace.revert(directory).await?;
        }
        Ok(())
    }

    /// Points `branch` at `base_sha`, creating it if needed.
    async fn reset_branch(&self, branch: &str, base_sha: &str) -> Result<(), PrError> {
        match self.host.create_branch(branch, base_sha).await {
            Ok(()) => Ok(()),
            Err(HostError::ReferenceExists { .. }) => {
                debug!(branch, "Branch exists, force-updating");
                self.host.update_branch(branch, base_sha, true).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Requests reviewers and assignees. Failures are only logged.
    async fn assign(&self, pr: &PullRequest) {
        let config = self.config;
        if !config.reviewers.is_empty() || !config.team_reviewers.is_empty() {
            if let Err(e) = self
                .host
                .request_reviewers(pr.number, &config.reviewers, &config.team_reviewers)
                .await
            {
                warn!(pr_number = pr.number, error = %e, "Failed to request reviewers");
            }
        }

        if !config.assignees.is_empty() {
            if let Err(e) = self.host.add_assignees(pr.number, &config.assignees).await {
                warn!(pr_number = pr.number, error = %e, "Failed to add assignees");
            }
        }
    }
}

/// Checks a `quarto-required` value against the available version.
///
/// A bare version means "at least this version". Returns `None` if the
/// requirement can't be parsed.
#[must_use]
pub fn requirement_satisfied(required: &str, available: &Version) -> Option<bool> {
    let required = required.trim();
    let requirement = if required.starts_with(|c: char| c.is_ascii_digit() || c == 'v') {
        format!(">={}", normalise_version(required))
    } else {
        required.to_string()
    };

    let requirement = VersionReq::parse(&requirement).ok()?;
    let available = Version::new(available.major, available.minor, available.patch);
    Some(requirement.matches(&available))
}
