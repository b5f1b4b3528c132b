//! GitHub implementation of [`HostService`].

use crate::config::MergeMethod;
use crate::host::rate_limit::ensure_core_rate_limit;
use crate::host::{AutoMergeStatus, HostError, HostService, PullRequest, RepositoryRef, TreeEntry};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const FILE_MODE: &str = "100644";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    fn into_result(self) -> Result<Option<T>, HostError> {
        match self.errors {
            Some(errors) if !errors.is_empty() => {
                let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
                Err(HostError::GraphQl {
                    message: messages.join(", "),
                })
            }
            _ => Ok(self.data),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeQueryData {
    repository: Option<AutoMergeRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeRepository {
    pull_request: Option<AutoMergePullRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergePullRequest {
    auto_merge_request: Option<AutoMergeRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeRequest {
    enabled_at: Option<String>,
    merge_method: Option<String>,
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct GitCommit {
    tree: GitObject,
}

/// GitHub host using octocrab.
pub struct GitHubHost {
    client: Octocrab,
    repository: RepositoryRef,
}

impl GitHubHost {
    /// Creates a host for `repository` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the client can't be built.
    pub fn new(token: &str, repository: RepositoryRef) -> Result<Self, HostError> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self::with_client(client, repository))
    }

    /// Creates a host from an existing client.
    #[must_use]
    pub fn with_client(client: Octocrab, repository: RepositoryRef) -> Self {
        Self { client, repository }
    }

    fn route(&self, path: &str) -> String {
        format!(
            "/repos/{}/{}/{path}",
            self.repository.owner, self.repository.name
        )
    }
}

fn status_code(error: &octocrab::Error) -> Option<u16> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn pull_request_from(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        title: pr.title.clone().unwrap_or_default(),
        head_ref: pr.head.ref_field.clone(),
    }
}

#[async_trait]
impl HostService for GitHubHost {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn default_branch(&self) -> Result<String, HostError> {
        let repository = self
            .client
            .repos(&self.repository.owner, &self.repository.name)
            .get()
            .await?;

        repository
            .default_branch
            .ok_or_else(|| HostError::UnexpectedResponse {
                message: format!("repository {} has no default branch", self.repository),
            })
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>, HostError> {
        let route = self.route(&format!("git/ref/heads/{branch}"));
        let result: Result<GitRef, octocrab::Error> = self.client.get(route, None::<&()>).await;
        match result {
            Ok(reference) => Ok(Some(reference.object.sha)),
            Err(e) if status_code(&e) == Some(404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_open_pull_requests(
        &self,
        head_branch: &str,
    ) -> Result<Vec<PullRequest>, HostError> {
        debug!(head_branch, "Finding open pull requests");
        let head = format!("{}:{head_branch}", self.repository.owner);

        let page = self
            .client
            .pulls(&self.repository.owner, &self.repository.name)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        Ok(page.items.iter().map(pull_request_from).collect())
    }

    async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, HostError> {
        ensure_core_rate_limit(&self.client).await?;
        debug!(head, base, "Creating pull request");

        let pr = self
            .client
            .pulls(&self.repository.owner, &self.repository.name)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        Ok(pull_request_from(&pr))
    }

    async fn update_pull_request(
        &self,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, HostError> {
        ensure_core_rate_limit(&self.client).await?;
        debug!(number, "Updating pull request");

        let pr = self
            .client
            .pulls(&self.repository.owner, &self.repository.name)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await?;

        Ok(pull_request_from(&pr))
    }

    async fn set_labels(&self, number: u64, labels: &[String]) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        self.client
            .issues(&self.repository.owner, &self.repository.name)
            .replace_all_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        self.client
            .pulls(&self.repository.owner, &self.repository.name)
            .request_reviews(number, reviewers.to_vec(), team_reviewers.to_vec())
            .await?;
        Ok(())
    }

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        let assignees: Vec<&str> = assignees.iter().map(String::as_str).collect();
        self.client
            .issues(&self.repository.owner, &self.repository.name)
            .add_assignees(number, &assignees)
            .await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        debug!(branch, sha, "Creating branch");

        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        let result: Result<serde_json::Value, octocrab::Error> =
            self.client.post(self.route("git/refs"), Some(&body)).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if status_code(&e) == Some(422) => Err(HostError::ReferenceExists {
                branch: branch.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        debug!(branch, sha, force, "Updating branch");

        let body = json!({ "sha": sha, "force": force });
        let _: serde_json::Value = self
            .client
            .patch(self.route(&format!("git/refs/heads/{branch}")), Some(&body))
            .await?;
        Ok(())
    }

    async fn commit_tree_sha(&self, commit_sha: &str) -> Result<String, HostError> {
        let commit: GitCommit = self
            .client
            .get(self.route(&format!("git/commits/{commit_sha}")), None::<&()>)
            .await?;
        Ok(commit.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, HostError> {
        ensure_core_rate_limit(&self.client).await?;
        let body = json!({ "content": STANDARD.encode(content), "encoding": "base64" });
        let blob: GitObject = self.client.post(self.route("git/blobs"), Some(&body)).await?;
        Ok(blob.sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String, HostError> {
        ensure_core_rate_limit(&self.client).await?;
        let tree: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "path": entry.path,
                    "mode": FILE_MODE,
                    "type": "blob",
                    "sha": entry.sha,
                })
            })
            .collect();

        let body = json!({ "base_tree": base_tree, "tree": tree });
        let created: GitObject = self.client.post(self.route("git/trees"), Some(&body)).await?;
        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, HostError> {
        ensure_core_rate_limit(&self.client).await?;
        let body = json!({ "message": message, "tree": tree_sha, "parents": [parent_sha] });
        let commit: GitObject = self
            .client
            .post(self.route("git/commits"), Some(&body))
            .await?;
        Ok(commit.sha)
    }

    async fn pull_request_node_id(&self, number: u64) -> Result<String, HostError> {
        let pr = self
            .client
            .pulls(&self.repository.owner, &self.repository.name)
            .get(number)
            .await?;

        pr.node_id.ok_or_else(|| HostError::UnexpectedResponse {
            message: format!("pull request #{number} has no node id"),
        })
    }

    async fn auto_merge_status(&self, number: u64) -> Result<Option<AutoMergeStatus>, HostError> {
        let response: GraphQlResponse<AutoMergeQueryData> = self
            .client
            .graphql(&json!({
                "query": r"
                    query AutoMergeStatus($owner: String!, $name: String!, $number: Int!) {
                        repository(owner: $owner, name: $name) {
                            pullRequest(number: $number) {
                                autoMergeRequest {
                                    enabledAt
                                    mergeMethod
                                }
                            }
                        }
                    }
                ",
                "variables": {
                    "owner": self.repository.owner,
                    "name": self.repository.name,
                    "number": number,
                }
            }))
            .await?;

        let request = response
            .into_result()?
            .and_then(|data| data.repository)
            .and_then(|repository| repository.pull_request)
            .and_then(|pr| pr.auto_merge_request);

        Ok(request.map(|request| AutoMergeStatus {
            enabled_at: request.enabled_at,
            merge_method: request
                .merge_method
                .and_then(|method| method.parse::<MergeMethod>().ok()),
        }))
    }

    async fn enable_auto_merge(
        &self,
        pull_request_id: &str,
        method: MergeMethod,
    ) -> Result<(), HostError> {
        ensure_core_rate_limit(&self.client).await?;
        let response: GraphQlResponse<serde_json::Value> = self
            .client
            .graphql(&json!({
                "query": r"
                    mutation EnableAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
                        enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
                            pullRequest {
                                number
                            }
                        }
                    }
                ",
                "variables": {
                    "pullRequestId": pull_request_id,
                    "mergeMethod": method.graphql_value(),
                }
            }))
            .await?;

        response.into_result()?;
        Ok(())
    }
}
