//! Data models for collected pull request artifacts.
//!
//! Public types are the records prism persists. Types prefixed with `Api`
//! are deserialisation targets for GitHub responses that convert into the
//! public records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::IntakeError;
use super::locator::{
    PullRequestId, PullRequestNumber, RepositoryName, RepositoryOwner, RepositorySlug,
};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Lifecycle state reported by GitHub for a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    /// Still open.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged into its base branch.
    Merged,
}

impl PullRequestState {
    /// Returns the lowercase label used in summaries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

/// One line of the pull request index.
///
/// The identity `(owner, repo, number)` is fixed at creation; entries are
/// never edited in place, only replaced by rewriting the whole index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestIndexEntry {
    /// Repository owner.
    pub owner: RepositoryOwner,
    /// Repository name.
    pub repo: RepositoryName,
    /// Pull request number.
    pub number: PullRequestNumber,
    /// Title at collection time.
    pub title: String,
    /// HTML URL.
    pub url: String,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp, absent for unmerged pull requests.
    pub merged_at: Option<DateTime<Utc>>,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Number of files touched.
    pub changed_files: u64,
    /// Target branch.
    pub base_ref_name: String,
    /// Source branch.
    pub head_ref_name: String,
    /// Label names.
    pub labels: Vec<String>,
}

impl PullRequestIndexEntry {
    /// Identity of the indexed pull request.
    #[must_use]
    pub fn id(&self) -> PullRequestId {
        PullRequestId::new(self.owner.clone(), self.repo.clone(), self.number)
    }

    /// Returns true when the entry belongs to the given repository.
    #[must_use]
    pub fn belongs_to(&self, owner: &RepositoryOwner, repo: &RepositoryName) -> bool {
        &self.owner == owner && &self.repo == repo
    }
}

/// Enriched pull request document collected over REST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDetail {
    /// Pull request number.
    pub number: PullRequestNumber,
    /// Title.
    pub title: String,
    /// Description body.
    pub body: Option<String>,
    /// REST state (`open` or `closed`).
    pub state: String,
    /// Author login.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
    /// Commits in the pull request.
    pub commits: Vec<CommitSummary>,
    /// Files changed by the pull request.
    pub files: Vec<ChangedFile>,
    /// Submitted reviews.
    pub reviews: Vec<ReviewSummary>,
}

/// Commit listed on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    /// Commit SHA.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Commit author name.
    pub author: Option<String>,
}

/// File touched by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Path of the file.
    pub filename: String,
    /// Change status (`added`, `modified`, ...).
    pub status: String,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
}

/// Review submitted on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    /// Reviewer login.
    pub author: Option<String>,
    /// Review verdict (`APPROVED`, `COMMENTED`, ...).
    pub state: String,
    /// Review body.
    pub body: Option<String>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Raw pull request node returned by the GraphQL search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSearchNode {
    /// Pull request number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// HTML URL.
    pub url: String,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Number of files touched.
    pub changed_files: u64,
    /// Target branch.
    pub base_ref_name: String,
    /// Source branch.
    pub head_ref_name: String,
    /// Nested label connection.
    #[serde(default)]
    pub labels: LabelConnection,
}

/// GraphQL label connection (`labels { nodes { name } }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabelConnection {
    /// Label nodes.
    #[serde(default)]
    pub nodes: Vec<LabelNode>,
}

/// One label node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelNode {
    /// Label name.
    pub name: String,
}

impl PullRequestSearchNode {
    /// Projects the raw node into an index entry tagged with its repository.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPullRequestNumber`] when GitHub reports
    /// a zero number.
    pub fn into_index_entry(
        self,
        slug: &RepositorySlug,
    ) -> Result<PullRequestIndexEntry, IntakeError> {
        Ok(PullRequestIndexEntry {
            owner: slug.owner().clone(),
            repo: slug.repository().clone(),
            number: PullRequestNumber::new(self.number)?,
            title: self.title,
            url: self.url,
            state: self.state,
            created_at: self.created_at,
            merged_at: self.merged_at,
            additions: self.additions,
            deletions: self.deletions,
            changed_files: self.changed_files,
            base_ref_name: self.base_ref_name,
            head_ref_name: self.head_ref_name,
            labels: self
                .labels
                .nodes
                .into_iter()
                .map(|label| label.name)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) user: Option<ApiUser>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommit {
    pub(crate) sha: String,
    pub(crate) commit: ApiCommitBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitBody {
    pub(crate) message: String,
    pub(crate) author: Option<ApiCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitAuthor {
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiChangedFile {
    pub(crate) filename: String,
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) additions: u64,
    #[serde(default)]
    pub(crate) deletions: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReview {
    pub(crate) user: Option<ApiUser>,
    pub(crate) state: String,
    pub(crate) body: Option<String>,
    pub(crate) submitted_at: Option<DateTime<Utc>>,
}

impl From<ApiCommit> for CommitSummary {
    fn from(value: ApiCommit) -> Self {
        Self {
            sha: value.sha,
            message: value.commit.message,
            author: value.commit.author.and_then(|author| author.name),
        }
    }
}

impl From<ApiChangedFile> for ChangedFile {
    fn from(value: ApiChangedFile) -> Self {
        Self {
            filename: value.filename,
            status: value.status,
            additions: value.additions,
            deletions: value.deletions,
        }
    }
}

impl From<ApiReview> for ReviewSummary {
    fn from(value: ApiReview) -> Self {
        Self {
            author: value.user.and_then(|user| user.login),
            state: value.state,
            body: value.body.filter(|body| !body.is_empty()),
            submitted_at: value.submitted_at,
        }
    }
}

impl ApiPullRequest {
    /// Combines the pull request with its listed sub-resources.
    pub(crate) fn into_detail(
        self,
        commits: Vec<ApiCommit>,
        files: Vec<ApiChangedFile>,
        reviews: Vec<ApiReview>,
    ) -> Result<PullRequestDetail, IntakeError> {
        Ok(PullRequestDetail {
            number: PullRequestNumber::new(self.number)?,
            title: self.title.unwrap_or_default(),
            body: self.body,
            state: self.state.unwrap_or_else(|| "unknown".to_owned()),
            author: self.user.and_then(|user| user.login),
            created_at: self.created_at,
            merged_at: self.merged_at,
            commits: commits.into_iter().map(CommitSummary::from).collect(),
            files: files.into_iter().map(ChangedFile::from).collect(),
            reviews: reviews.into_iter().map(ReviewSummary::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::{
        ApiCommit, ApiPullRequest, ApiReview, PullRequestIndexEntry, PullRequestSearchNode,
        PullRequestState,
    };
    use crate::github::locator::RepositorySlug;

    #[fixture]
    fn search_node() -> PullRequestSearchNode {
        serde_json::from_value(json!({
            "number": 12,
            "title": "Add retries",
            "url": "https://github.com/octo/widgets/pull/12",
            "state": "MERGED",
            "createdAt": "2025-01-01T00:00:00Z",
            "mergedAt": "2025-01-03T12:00:00Z",
            "additions": 40,
            "deletions": 3,
            "changedFiles": 2,
            "baseRefName": "main",
            "headRefName": "feature/retries",
            "labels": { "nodes": [{ "name": "bug" }, { "name": "backend" }] }
        }))
        .expect("search node should deserialise")
    }

    #[rstest]
    fn search_node_projects_into_index_entry(search_node: PullRequestSearchNode) {
        let slug: RepositorySlug = "octo/widgets".parse().expect("slug should parse");
        let entry = search_node
            .into_index_entry(&slug)
            .expect("projection should succeed");

        assert_eq!(entry.owner.as_str(), "octo");
        assert_eq!(entry.repo.as_str(), "widgets");
        assert_eq!(entry.number.get(), 12);
        assert_eq!(entry.state, PullRequestState::Merged);
        assert_eq!(entry.labels, vec!["bug".to_owned(), "backend".to_owned()]);
        assert_eq!(entry.base_ref_name, "main");
        assert!(entry.merged_at.is_some());
    }

    #[rstest]
    fn index_entry_serialises_with_camel_case_keys(search_node: PullRequestSearchNode) {
        let slug: RepositorySlug = "octo/widgets".parse().expect("slug should parse");
        let entry = search_node
            .into_index_entry(&slug)
            .expect("projection should succeed");
        let value = serde_json::to_value(&entry).expect("entry should serialise");

        assert_eq!(value.get("changedFiles"), Some(&json!(2)));
        assert_eq!(value.get("headRefName"), Some(&json!("feature/retries")));
        assert_eq!(value.get("state"), Some(&json!("MERGED")));
        assert_eq!(value.get("owner"), Some(&json!("octo")));
    }

    #[test]
    fn index_entry_rejects_path_escaping_owner() {
        let value = json!({
            "owner": "..",
            "repo": "widgets",
            "number": 1,
            "title": "t",
            "url": "u",
            "state": "OPEN",
            "createdAt": "2025-01-01T00:00:00Z",
            "mergedAt": null,
            "additions": 0,
            "deletions": 0,
            "changedFiles": 0,
            "baseRefName": "main",
            "headRefName": "topic",
            "labels": []
        });

        let result = serde_json::from_value::<PullRequestIndexEntry>(value);
        assert!(result.is_err(), "expected owner validation to fail");
    }

    #[test]
    fn search_node_without_labels_defaults_to_empty() {
        let node: PullRequestSearchNode = serde_json::from_value(json!({
            "number": 3,
            "title": "Docs",
            "url": "https://github.com/octo/widgets/pull/3",
            "state": "OPEN",
            "createdAt": "2025-02-01T00:00:00Z",
            "mergedAt": null,
            "additions": 1,
            "deletions": 1,
            "changedFiles": 1,
            "baseRefName": "main",
            "headRefName": "docs"
        }))
        .expect("node without labels should deserialise");

        assert!(node.labels.nodes.is_empty());
    }

    #[test]
    fn api_pull_request_combines_sub_resources() {
        let pull: ApiPullRequest = serde_json::from_value(json!({
            "number": 5,
            "title": "Refactor",
            "body": "Splits the module",
            "state": "closed",
            "user": { "login": "alice" },
            "created_at": "2025-01-01T00:00:00Z",
            "merged_at": "2025-01-02T00:00:00Z"
        }))
        .expect("pull request should deserialise");
        let commit: ApiCommit = serde_json::from_value(json!({
            "sha": "abc123",
            "commit": { "message": "Split module", "author": { "name": "Alice" } }
        }))
        .expect("commit should deserialise");
        let review: ApiReview = serde_json::from_value(json!({
            "user": { "login": "bob" },
            "state": "APPROVED",
            "body": "",
            "submitted_at": "2025-01-02T00:00:00Z"
        }))
        .expect("review should deserialise");

        let detail = pull
            .into_detail(vec![commit], vec![], vec![review])
            .expect("detail should build");

        assert_eq!(detail.author.as_deref(), Some("alice"));
        assert_eq!(detail.commits.len(), 1);
        assert_eq!(
            detail.commits.first().and_then(|c| c.author.as_deref()),
            Some("Alice")
        );
        assert_eq!(
            detail.reviews.first().and_then(|r| r.body.as_deref()),
            None,
            "empty review bodies should be dropped"
        );
    }
}
