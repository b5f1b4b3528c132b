//! Commit construction through the git data API.

use crate::host::{HostError, HostService, TreeEntry};
use crate::workspace::FileChange;
use tracing::debug;

/// Creates a commit on top of `parent_sha` containing `changes`.
///
/// Each changed file is uploaded as a blob, the blobs are layered on the
/// parent's tree, and the resulting tree is committed with `parent_sha` as its
/// only parent. Deleted files are removed from the tree. The branch ref is not
/// moved; callers do that.
///
/// # Errors
///
/// Returns [`HostError`] if any host call fails.
pub async fn commit_changes(
    host: &dyn HostService,
    parent_sha: &str,
    message: &str,
    changes: &[FileChange],
) -> Result<String, HostError> {
    let base_tree = host.commit_tree_sha(parent_sha).await?;

    let mut entries = Vec::with_capacity(changes.len());
    for change in changes {
        let sha = match &change.content {
            Some(content) => Some(host.create_blob(content).await?),
            None => None,
        };
        entries.push(TreeEntry {
            path: change.path.clone(),
            sha,
        });
    }

    let tree = host.create_tree(&base_tree, &entries).await?;
    let commit = host.create_commit(message, &tree, parent_sha).await?;
    debug!(commit = %commit, files = entries.len(), "Created commit");
    Ok(commit)
}
