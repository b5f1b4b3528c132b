//! Git-backed workspace.

use crate::workspace::{FileChange, Workspace, WorkspaceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A workspace that is a git checkout.
///
/// Changes are detected with `git status` and reverted with `git checkout` and
/// `git clean`. Reported paths are relative to the repository top level, which
/// is what tree entries on the host expect.
#[derive(Debug, Clone)]
pub struct GitWorkspace {
    root: PathBuf,
    toplevel: PathBuf,
}

impl GitWorkspace {
    /// Opens the checkout containing `root`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] if `root` is not inside a git repository.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        let toplevel = run_git(&root, &["rev-parse", "--show-toplevel"]).await?;
        let toplevel = PathBuf::from(String::from_utf8_lossy(&toplevel).trim());
        debug!(root = %root.display(), toplevel = %toplevel.display(), "Opened git workspace");
        Ok(Self { root, toplevel })
    }
}

#[async_trait]
impl Workspace for GitWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn changed_files(&self, directory: &Path) -> Result<Vec<FileChange>, WorkspaceError> {
        let pathspec = directory.to_string_lossy();
        let status = run_git(
            &self.root,
            &[
                "status",
                "--porcelain=v1",
                "-z",
                "--untracked-files=all",
                "--",
                &pathspec,
            ],
        )
        .await?;

        let mut changes = Vec::new();
        for entry in parse_porcelain(&status) {
            let content = if entry.deleted {
                None
            } else {
                let absolute = self.toplevel.join(&entry.path);
                let bytes = tokio::fs::read(&absolute)
                    .await
                    .map_err(|e| WorkspaceError::Io {
                        path: absolute.display().to_string(),
                        source: e,
                    })?;
                Some(bytes)
            };
            changes.push(FileChange {
                path: entry.path,
                content,
            });
        }

        Ok(changes)
    }

    async fn revert(&self, directory: &Path) -> Result<(), WorkspaceError> {
        let pathspec = directory.to_string_lossy();
        debug!(directory = %pathspec, "Reverting working tree changes");

        run_git(&self.root, &["checkout", "HEAD", "--", &pathspec]).await?;
        run_git(&self.root, &["clean", "-fdq", "--", &pathspec]).await?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct StatusEntry {
    path: String,
    deleted: bool,
}

/// Parses `git status --porcelain=v1 -z` output.
///
/// Renames and copies carry the original path as an extra field; the original
/// is reported as deleted.
fn parse_porcelain(output: &[u8]) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut fields = output
        .split(|byte| *byte == 0)
        .filter(|field| !field.is_empty());

    while let Some(field) = fields.next() {
        if field.len() < 4 {
            continue;
        }
        let (index, worktree) = (field[0], field[1]);
        let path = String::from_utf8_lossy(&field[3..]).into_owned();

        if matches!(index, b'R' | b'C') {
            if let Some(original) = fields.next() {
                if index == b'R' {
                    entries.push(StatusEntry {
                        path: String::from_utf8_lossy(original).into_owned(),
                        deleted: true,
                    });
                }
            }
        }

        entries.push(StatusEntry {
            path,
            deleted: index == b'D' || worktree == b'D',
        });
    }

    entries
}

async fn run_git(cwd: &Path, args: &[&str]) -> Result<Vec<u8>, WorkspaceError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| WorkspaceError::Spawn {
            command: args.join(" "),
            source: e,
        })?;

    if !output.status.success() {
        return Err(WorkspaceError::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}
