//! Typed projections of GitHub REST API responses.
//!
//! Field names follow the API so most records decode straight from the
//! response body; everything is re-serialized as-is when handed to the LLM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// PR/issue label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Branch pointer on either side of a PR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

/// Summary of a PR for list and search views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Detailed PR information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub draft: bool,
    /// `None` while GitHub is still computing mergeability.
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub mergeable_state: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub requested_reviewers: Vec<User>,
    pub head: GitRef,
    pub base: GitRef,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub review_comments: u64,
}

/// PR review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Deleted accounts come back as `null`.
    #[serde(default)]
    pub user: Option<User>,
    /// APPROVED, CHANGES_REQUESTED, COMMENTED, DISMISSED or PENDING.
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// General conversation comment.
    #[default]
    Issue,
    /// Inline code review comment.
    Review,
}

/// PR comment, either from the conversation tab or inline on the diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub kind: CommentKind,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

/// CI check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    /// queued, in_progress or completed.
    pub status: String,
    /// success, failure, neutral, cancelled, skipped, timed_out or action_required.
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRun {
    pub fn is_pending(&self) -> bool {
        self.status != "completed"
    }

    pub fn is_passing(&self) -> bool {
        !self.is_pending() && self.conclusion.as_deref() == Some("success")
    }
}

/// Tally of all checks on a PR's head commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecksSummary {
    pub head_sha: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub checks: Vec<CheckRun>,
}

impl ChecksSummary {
    pub fn from_runs(head_sha: impl Into<String>, checks: Vec<CheckRun>) -> Self {
        let pending = checks.iter().filter(|c| c.is_pending()).count();
        let passed = checks.iter().filter(|c| c.is_passing()).count();
        Self {
            head_sha: head_sha.into(),
            total: checks.len(),
            passed,
            failed: checks.len() - pending - passed,
            pending,
            checks,
        }
    }
}

/// File changed in a PR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    /// added, removed, modified, renamed, copied, changed or unchanged.
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    /// Unified diff hunk; GitHub omits it for binary or very large files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckRunsPage {
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub items: Vec<PullRequestSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestHead {
    pub head: GitRef,
}
