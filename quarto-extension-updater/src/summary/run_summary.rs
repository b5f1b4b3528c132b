//! Run summary types.

use crate::pull_requests::{PrAction, PrResult};
use crate::updates::UpdateClassification;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of installed extensions found.
    pub extensions_scanned: usize,

    /// Number of updates selected by the resolver.
    pub updates_found: usize,

    /// Number of updates committed to a pull request.
    pub updates_applied: usize,

    /// Number of updates that could not be applied.
    pub updates_skipped: usize,

    pub major_updates: usize,
    pub minor_updates: usize,
    pub patch_updates: usize,

    /// Number of PRs opened.
    pub prs_created: usize,

    /// Number of PRs refreshed.
    pub prs_updated: usize,

    /// Number of PRs that were already up to date.
    pub prs_unchanged: usize,

    /// Number and URL of the first created or updated PR.
    pub first_pr: Option<(u64, String)>,

    /// `owner/name` and reason of every skipped update.
    pub skipped: Vec<(String, String)>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Records the magnitude breakdown of the selected updates.
    pub fn record_classification(&mut self, classification: &UpdateClassification) {
        self.major_updates = classification.major.len();
        self.minor_updates = classification.minor.len();
        self.patch_updates = classification.patch.len();
    }

    /// Updates the summary with the outcome of one group.
    pub fn record_result(&mut self, result: &PrResult) {
        match result.action {
            PrAction::Created => self.prs_created += 1,
            PrAction::Updated => self.prs_updated += 1,
            PrAction::Unchanged => self.prs_unchanged += 1,
            PrAction::NotCreated => {}
        }

        if matches!(result.action, PrAction::Created | PrAction::Updated)
            && result.is_present()
            && self.first_pr.is_none()
        {
            self.first_pr = Some((result.number, result.url.clone()));
        }

        self.updates_applied += result.applied.len();
        self.updates_skipped += result.skipped.len();
        self.skipped.extend(
            result
                .skipped
                .iter()
                .map(|skip| (skip.update.extension_id(), skip.reason.clone())),
        );
    }

    /// Returns true if any update was skipped.
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        self.updates_skipped > 0
    }

    /// Returns the GitHub Actions step outputs for this run.
    #[must_use]
    pub fn github_outputs(&self) -> Vec<(&'static str, String)> {
        let (pr_number, pr_url) = match &self.first_pr {
            Some((number, url)) => (number.to_string(), url.clone()),
            None => (String::new(), String::new()),
        };

        vec![
            ("updates-found", self.updates_found.to_string()),
            ("updates-applied", self.updates_applied.to_string()),
            ("updates-skipped", self.updates_skipped.to_string()),
            ("pr-number", pr_number),
            ("pr-url", pr_url),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pull_requests::SkippedUpdate;
    use crate::updates::Update;
    use std::path::PathBuf;

    fn update(name: &str) -> Update {
        Update {
            owner: "o".to_string(),
            name: name.to_string(),
            name_with_owner: format!("o/{name}"),
            install_source_ref: format!("o/{name}@1.0.1"),
            current_version: "1.0.0".to_string(),
            latest_version: "1.0.1".to_string(),
            manifest_path: PathBuf::from(format!("_extensions/o/{name}/_extension.yml")),
            homepage_url: None,
            release_url: None,
            description: None,
        }
    }

    fn result(number: u64, action: PrAction) -> PrResult {
        PrResult {
            number,
            url: if number == 0 {
                String::new()
            } else {
                format!("https://github.com/o/r/pull/{number}")
            },
            branch: "chore/quarto-extensions/o-a-1.0.1".to_string(),
            title: "title".to_string(),
            action,
            extensions: vec!["o/a".to_string(), "o/b".to_string()],
            applied: vec![update("a")],
            skipped: vec![SkippedUpdate {
                update: update("b"),
                reason: "incompatible".to_string(),
            }],
            auto_merge: None,
        }
    }

    #[test]
    fn records_results() {
        let mut summary = RunSummary::new(false);
        summary.updates_found = 4;

        summary.record_result(&result(0, PrAction::NotCreated));
        summary.record_result(&result(7, PrAction::Unchanged));
        summary.record_result(&result(12, PrAction::Created));
        summary.record_result(&result(13, PrAction::Updated));

        assert_eq!(summary.prs_created, 1);
        assert_eq!(summary.prs_updated, 1);
        assert_eq!(summary.prs_unchanged, 1);
        assert_eq!(summary.first_pr, Some((12, "https://github.com/o/r/pull/12".to_string())));
        assert_eq!(summary.updates_skipped, 4);
        assert_eq!(summary.skipped[0], ("o/b".to_string(), "incompatible".to_string()));
        assert!(summary.has_skipped());
    }

    #[test]
    fn outputs_without_pull_request() {
        let mut summary = RunSummary::new(true);
        summary.updates_found = 2;

        let outputs = summary.github_outputs();
        assert!(outputs.contains(&("updates-found", "2".to_string())));
        assert!(outputs.contains(&("pr-number", String::new())));
    }
}
