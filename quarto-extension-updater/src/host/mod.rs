//! Version-control host access.
//!
//! [`HostService`] is the seam between the pull request orchestration and the
//! remote host. [`GitHubHost`] implements it over octocrab; tests substitute a
//! recording double.

mod error;
mod github;
mod rate_limit;
mod types;

pub use error::HostError;
pub use github::GitHubHost;
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, CoreRateLimit};
pub use types::{AutoMergeStatus, PullRequest, RepositoryRef, TreeEntry};

use crate::config::MergeMethod;
use async_trait::async_trait;

/// Operations the updater performs on the remote repository.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Repository all operations apply to.
    fn repository(&self) -> &RepositoryRef;

    async fn default_branch(&self) -> Result<String, HostError>;

    /// Returns the commit a branch points at, or `None` if it doesn't exist.
    async fn branch_head(&self, branch: &str) -> Result<Option<String>, HostError>;

    /// Lists open pull requests whose head is `head_branch`.
    async fn find_open_pull_requests(&self, head_branch: &str)
        -> Result<Vec<PullRequest>, HostError>;

    async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, HostError>;

    async fn update_pull_request(
        &self,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, HostError>;

    /// Replaces the labels of a pull request.
    async fn set_labels(&self, number: u64, labels: &[String]) -> Result<(), HostError>;

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> Result<(), HostError>;

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), HostError>;

    /// Creates `refs/heads/<branch>` at `sha`.
    ///
    /// Fails with [`HostError::ReferenceExists`] if the branch already exists.
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), HostError>;

    /// Moves an existing branch to `sha`.
    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<(), HostError>;

    /// Returns the tree SHA of a commit.
    async fn commit_tree_sha(&self, commit_sha: &str) -> Result<String, HostError>;

    /// Uploads file content, returning the blob SHA.
    async fn create_blob(&self, content: &[u8]) -> Result<String, HostError>;

    /// Creates a tree layered on `base_tree`, returning its SHA.
    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry])
        -> Result<String, HostError>;

    /// Creates a commit with a single parent, returning its SHA.
    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, HostError>;

    /// Returns the GraphQL node id of a pull request.
    async fn pull_request_node_id(&self, number: u64) -> Result<String, HostError>;

    /// Returns the pending auto-merge request, if any.
    async fn auto_merge_status(&self, number: u64) -> Result<Option<AutoMergeStatus>, HostError>;

    async fn enable_auto_merge(
        &self,
        pull_request_id: &str,
        method: MergeMethod,
    ) -> Result<(), HostError>;
}
