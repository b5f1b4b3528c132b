//! Pull request results.

use crate::auto_merge::AutoMergeOutcome;
use crate::pull_requests::PrAction;
use crate::updates::Update;

/// An update that was selected but couldn't be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUpdate {
    pub update: Update,
    pub reason: String,
}

/// Outcome of processing one update group.
#[derive(Debug, Clone)]
pub struct PrResult {
    /// Pull request number; `0` when no pull request exists.
    pub number: u64,

    /// Pull request URL; empty when no pull request exists.
    pub url: String,

    /// Branch the group was committed to.
    pub branch: String,

    /// Pull request title.
    pub title: String,

    pub action: PrAction,

    /// `owner/name` of every extension in the group.
    pub extensions: Vec<String>,

    /// Updates committed to the branch.
    pub applied: Vec<Update>,

    pub skipped: Vec<SkippedUpdate>,

    /// Auto-merge outcome, when auto-merge was considered.
    pub auto_merge: Option<AutoMergeOutcome>,
}

impl PrResult {
    /// Returns true if the group has an open pull request.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.number != 0
    }
}
