//! Test doubles for the host, installer and workspace seams.

#![allow(dead_code)]

use async_trait::async_trait;
use quarto_extension_updater::config::MergeMethod;
use quarto_extension_updater::extensions::ExtensionManifest;
use quarto_extension_updater::host::{
    AutoMergeStatus, HostError, HostService, PullRequest, RepositoryRef, TreeEntry,
};
use quarto_extension_updater::installer::{ExtensionInstaller, InstallError};
use quarto_extension_updater::updates::Update;
use quarto_extension_updater::workspace::{FileChange, Workspace, WorkspaceError};
use semver::Version;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE_SHA: &str = "base-sha";
pub const BASE_TREE: &str = "base-tree";

/// Builds an update for `_extensions/<owner>/<name>`.
pub fn update(owner: &str, name: &str, current: &str, latest: &str) -> Update {
    Update {
        owner: owner.to_string(),
        name: name.to_string(),
        name_with_owner: format!("{owner}/{name}"),
        install_source_ref: format!("{owner}/{name}@{latest}"),
        current_version: current.to_string(),
        latest_version: latest.to_string(),
        manifest_path: PathBuf::from(format!("_extensions/{owner}/{name}/_extension.yml")),
        homepage_url: Some(format!("https://github.com/{owner}/{name}")),
        release_url: None,
        description: None,
    }
}

/// Call record for `create_pull_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Call record for `update_branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBranchCall {
    pub branch: String,
    pub sha: String,
    pub force: bool,
}

/// Recording host.
///
/// - Auto-incrementing PR numbers
/// - Every mutating call is appended to `mutations`
/// - Configurable open PRs, existing branches and auto-merge responses
/// - Error injection for failure paths
pub struct MockHost {
    repository: RepositoryRef,
    next_pr_number: AtomicU64,
    next_object: AtomicU64,
    open_prs: Mutex<HashMap<String, Vec<PullRequest>>>,
    branches: Mutex<HashSet<String>>,
    auto_merge_status: Mutex<Option<AutoMergeStatus>>,
    auto_merge_errors: Mutex<VecDeque<String>>,
    // Call tracking
    pub mutations: Mutex<Vec<String>>,
    pub create_pr_calls: Mutex<Vec<CreatePrCall>>,
    pub update_pr_calls: Mutex<Vec<u64>>,
    pub update_branch_calls: Mutex<Vec<UpdateBranchCall>>,
    pub blobs: Mutex<Vec<Vec<u8>>>,
    pub trees: Mutex<Vec<Vec<TreeEntry>>>,
    pub commits: Mutex<Vec<(String, String)>>,
    pub label_calls: Mutex<Vec<(u64, Vec<String>)>>,
    pub reviewer_calls: Mutex<Vec<u64>>,
    pub assignee_calls: Mutex<Vec<u64>>,
    pub enable_auto_merge_calls: Mutex<Vec<(String, MergeMethod)>>,
    pub status_queries: Mutex<Vec<u64>>,
    // Error injection
    error_on_create_pr: Mutex<Option<String>>,
    error_on_reviewers: Mutex<Option<String>>,
    error_on_status: Mutex<Option<String>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        let mut branches = HashSet::new();
        branches.insert("main".to_string());
        Self {
            repository: RepositoryRef::new("owner", "site"),
            next_pr_number: AtomicU64::new(100),
            next_object: AtomicU64::new(1),
            open_prs: Mutex::new(HashMap::new()),
            branches: Mutex::new(branches),
            auto_merge_status: Mutex::new(None),
            auto_merge_errors: Mutex::new(VecDeque::new()),
            mutations: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            update_branch_calls: Mutex::new(Vec::new()),
            blobs: Mutex::new(Vec::new()),
            trees: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            label_calls: Mutex::new(Vec::new()),
            reviewer_calls: Mutex::new(Vec::new()),
            assignee_calls: Mutex::new(Vec::new()),
            enable_auto_merge_calls: Mutex::new(Vec::new()),
            status_queries: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_reviewers: Mutex::new(None),
            error_on_status: Mutex::new(None),
        }
    }

    /// Registers an open pull request on `branch`.
    pub fn add_open_pr(&self, branch: &str, number: u64, title: &str) {
        self.open_prs
            .lock()
            .unwrap()
            .entry(branch.to_string())
            .or_default()
            .push(PullRequest {
                number,
                url: format!("https://github.com/owner/site/pull/{number}"),
                title: title.to_string(),
                head_ref: branch.to_string(),
            });
        self.add_branch(branch);
    }

    pub fn add_branch(&self, branch: &str) {
        self.branches.lock().unwrap().insert(branch.to_string());
    }

    pub fn set_auto_merge_status(&self, status: Option<AutoMergeStatus>) {
        *self.auto_merge_status.lock().unwrap() = status;
    }

    /// Queues errors returned by successive `enable_auto_merge` calls.
    pub fn queue_auto_merge_errors(&self, errors: &[&str]) {
        self.auto_merge_errors
            .lock()
            .unwrap()
            .extend(errors.iter().map(|e| (*e).to_string()));
    }

    pub fn fail_create_pr(&self, message: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_reviewers(&self, message: &str) {
        *self.error_on_reviewers.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_status_query(&self, message: &str) {
        *self.error_on_status.lock().unwrap() = Some(message.to_string());
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.lock().unwrap().len()
    }

    pub fn tree_paths(&self) -> Vec<String> {
        self.trees
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|entry| entry.path.clone())
            .collect()
    }

    fn record(&self, call: String) {
        self.mutations.lock().unwrap().push(call);
    }

    fn next_sha(&self, kind: &str) -> String {
        format!("{kind}-{}", self.next_object.fetch_add(1, Ordering::SeqCst))
    }
}

fn injected(message: &str) -> HostError {
    HostError::UnexpectedResponse {
        message: message.to_string(),
    }
}

#[async_trait]
impl HostService for MockHost {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn default_branch(&self) -> Result<String, HostError> {
        Ok("main".to_string())
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>, HostError> {
        Ok(self
            .branches
            .lock()
            .unwrap()
            .contains(branch)
            .then(|| BASE_SHA.to_string()))
    }

    async fn find_open_pull_requests(
        &self,
        head_branch: &str,
    ) -> Result<Vec<PullRequest>, HostError> {
        Ok(self
            .open_prs
            .lock()
            .unwrap()
            .get(head_branch)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, HostError> {
        if let Some(message) = self.error_on_create_pr.lock().unwrap().as_deref() {
            return Err(injected(message));
        }
        self.record(format!("create_pull_request {head}"));
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            url: format!("https://github.com/owner/site/pull/{number}"),
            title: title.to_string(),
            head_ref: head.to_string(),
        };
        self.open_prs
            .lock()
            .unwrap()
            .entry(head.to_string())
            .or_default()
            .push(pr.clone());
        Ok(pr)
    }

    async fn update_pull_request(
        &self,
        number: u64,
        title: &str,
        _body: &str,
    ) -> Result<PullRequest, HostError> {
        self.record(format!("update_pull_request {number}"));
        self.update_pr_calls.lock().unwrap().push(number);

        let mut open = self.open_prs.lock().unwrap();
        let pr = open
            .values_mut()
            .flatten()
            .find(|pr| pr.number == number)
            .ok_or_else(|| injected("unknown pull request"))?;
        pr.title = title.to_string();
        Ok(pr.clone())
    }

    async fn set_labels(&self, number: u64, labels: &[String]) -> Result<(), HostError> {
        self.record(format!("set_labels {number}"));
        self.label_calls
            .lock()
            .unwrap()
            .push((number, labels.to_vec()));
        Ok(())
    }

    async fn request_reviewers(
        &self,
        number: u64,
        _reviewers: &[String],
        _team_reviewers: &[String],
    ) -> Result<(), HostError> {
        self.reviewer_calls.lock().unwrap().push(number);
        if let Some(message) = self.error_on_reviewers.lock().unwrap().as_deref() {
            return Err(injected(message));
        }
        self.record(format!("request_reviewers {number}"));
        Ok(())
    }

    async fn add_assignees(&self, number: u64, _assignees: &[String]) -> Result<(), HostError> {
        self.record(format!("add_assignees {number}"));
        self.assignee_calls.lock().unwrap().push(number);
        Ok(())
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), HostError> {
        let mut branches = self.branches.lock().unwrap();
        if branches.contains(branch) {
            return Err(HostError::ReferenceExists {
                branch: branch.to_string(),
            });
        }
        branches.insert(branch.to_string());
        self.record(format!("create_branch {branch} {sha}"));
        Ok(())
    }

    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<(), HostError> {
        self.record(format!("update_branch {branch} {sha}"));
        self.update_branch_calls
            .lock()
            .unwrap()
            .push(UpdateBranchCall {
                branch: branch.to_string(),
                sha: sha.to_string(),
                force,
            });
        Ok(())
    }

    async fn commit_tree_sha(&self, _commit_sha: &str) -> Result<String, HostError> {
        Ok(BASE_TREE.to_string())
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, HostError> {
        self.record("create_blob".to_string());
        self.blobs.lock().unwrap().push(content.to_vec());
        Ok(self.next_sha("blob"))
    }

    async fn create_tree(
        &self,
        _base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, HostError> {
        self.record("create_tree".to_string());
        self.trees.lock().unwrap().push(entries.to_vec());
        Ok(self.next_sha("tree"))
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, HostError> {
        self.record(format!("create_commit {tree_sha} {parent_sha}"));
        self.commits
            .lock()
            .unwrap()
            .push((message.to_string(), parent_sha.to_string()));
        Ok(self.next_sha("commit"))
    }

    async fn pull_request_node_id(&self, number: u64) -> Result<String, HostError> {
        Ok(format!("PR_node_{number}"))
    }

    async fn auto_merge_status(&self, number: u64) -> Result<Option<AutoMergeStatus>, HostError> {
        self.status_queries.lock().unwrap().push(number);
        if let Some(message) = self.error_on_status.lock().unwrap().as_deref() {
            return Err(HostError::GraphQl {
                message: message.to_string(),
            });
        }
        Ok(self.auto_merge_status.lock().unwrap().clone())
    }

    async fn enable_auto_merge(
        &self,
        pull_request_id: &str,
        method: MergeMethod,
    ) -> Result<(), HostError> {
        self.enable_auto_merge_calls
            .lock()
            .unwrap()
            .push((pull_request_id.to_string(), method));
        if let Some(message) = self.auto_merge_errors.lock().unwrap().pop_front() {
            return Err(HostError::GraphQl { message });
        }
        self.record(format!("enable_auto_merge {pull_request_id}"));
        Ok(())
    }
}

/// In-memory working tree shared between [`MemoryWorkspace`] and
/// [`ScriptedInstaller`].
#[derive(Default)]
pub struct TreeState {
    changes: Mutex<HashMap<String, Vec<FileChange>>>,
    manifests: Mutex<HashMap<String, ExtensionManifest>>,
    pub reverted: Mutex<Vec<String>>,
}

pub struct MemoryWorkspace {
    root: PathBuf,
    state: Arc<TreeState>,
}

impl MemoryWorkspace {
    pub fn new(state: Arc<TreeState>) -> Self {
        Self {
            root: PathBuf::from("/workspace"),
            state,
        }
    }
}

fn key(directory: &Path) -> String {
    directory.to_string_lossy().replace('\\', "/")
}

#[async_trait]
impl Workspace for MemoryWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn changed_files(&self, directory: &Path) -> Result<Vec<FileChange>, WorkspaceError> {
        Ok(self
            .state
            .changes
            .lock()
            .unwrap()
            .get(&key(directory))
            .cloned()
            .unwrap_or_default())
    }

    async fn revert(&self, directory: &Path) -> Result<(), WorkspaceError> {
        let directory = key(directory);
        self.state.changes.lock().unwrap().remove(&directory);
        self.state.manifests.lock().unwrap().remove(&directory);
        self.state.reverted.lock().unwrap().push(directory);
        Ok(())
    }

    async fn read_manifest(
        &self,
        directory: &Path,
    ) -> Result<Option<ExtensionManifest>, WorkspaceError> {
        Ok(self
            .state
            .manifests
            .lock()
            .unwrap()
            .get(&key(directory))
            .cloned())
    }
}

/// What the installer does for one source.
#[derive(Debug, Clone)]
pub enum Script {
    /// Writes `files` (path, content; `None` deletes) under `directory`.
    Install {
        directory: String,
        files: Vec<(String, Option<String>)>,
        quarto_required: Option<String>,
    },
    /// Fails with the given diagnostic output.
    Fail { stderr: String },
}

impl Script {
    /// Installs `update`, rewriting its manifest.
    pub fn upgrade(update: &Update) -> Self {
        let directory = update.directory().to_string_lossy().into_owned();
        Self::Install {
            files: vec![(
                format!("{directory}/_extension.yml"),
                Some(format!("version: {}\n", update.latest_version)),
            )],
            directory,
            quarto_required: None,
        }
    }
}

pub struct ScriptedInstaller {
    state: Arc<TreeState>,
    scripts: HashMap<String, Script>,
    host_version: Option<Version>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedInstaller {
    pub fn new(state: Arc<TreeState>) -> Self {
        Self {
            state,
            scripts: HashMap::new(),
            host_version: Some(Version::new(1, 6, 40)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(mut self, source: &str, script: Script) -> Self {
        self.scripts.insert(source.to_string(), script);
        self
    }

    pub fn with_host_version(mut self, version: Option<Version>) -> Self {
        self.host_version = version;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExtensionInstaller for ScriptedInstaller {
    async fn install(&self, source: &str, _workdir: &Path) -> Result<String, InstallError> {
        self.calls.lock().unwrap().push(source.to_string());

        match self.scripts.get(source) {
            Some(Script::Install {
                directory,
                files,
                quarto_required,
            }) => {
                let changes = files
                    .iter()
                    .map(|(path, content)| FileChange {
                        path: path.clone(),
                        content: content.as_ref().map(|c| c.clone().into_bytes()),
                    })
                    .collect();
                self.state
                    .changes
                    .lock()
                    .unwrap()
                    .insert(directory.clone(), changes);
                self.state.manifests.lock().unwrap().insert(
                    directory.clone(),
                    ExtensionManifest {
                        quarto_required: quarto_required.clone(),
                        ..ExtensionManifest::default()
                    },
                );
                Ok(format!("Installed {source}"))
            }
            Some(Script::Fail { stderr }) => Err(InstallError::Failed {
                message: format!("quarto add {source} failed"),
                stderr: Some(stderr.clone()),
                stdout: None,
            }),
            None => Ok(String::new()),
        }
    }

    async fn host_version(&self) -> Option<Version> {
        self.host_version.clone()
    }
}
