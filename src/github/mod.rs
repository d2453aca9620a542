//! Read-only GitHub REST API access.
//!
//! [`GitHubApi`] is the seam the tools call through; [`GitHubClient`] is the
//! HTTP implementation. Every method is a single logical read that decodes
//! into the typed records in [`models`].

mod client;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use client::GitHubClient;
pub use models::{
    CheckRun, ChecksSummary, Comment, CommentKind, FileChange, GitRef, Label, PullRequestDetail,
    PullRequestSummary, Review, User,
};

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Invalid repo format: {0}. Expected 'owner/repo'")]
    InvalidRepo(String),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// A repository named as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(repo: &str) -> Result<Self> {
        let mut parts = repo.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GitHubError::InvalidRepo(repo.to_string())),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request state filter for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    All,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(format!(
                "invalid state '{}', expected one of: open, closed, all",
                other
            )),
        }
    }
}

/// Read operations the PR tools depend on.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_pull_requests(
        &self,
        repo: &str,
        state: PrState,
        per_page: u32,
        author: Option<&str>,
    ) -> Result<Vec<PullRequestSummary>>;

    async fn get_pull_request(&self, repo: &str, pr_number: u64) -> Result<PullRequestDetail>;

    async fn get_pr_reviews(&self, repo: &str, pr_number: u64) -> Result<Vec<Review>>;

    async fn get_pr_checks(&self, repo: &str, pr_number: u64) -> Result<ChecksSummary>;

    async fn get_pr_files(
        &self,
        repo: &str,
        pr_number: u64,
        include_patch: bool,
    ) -> Result<Vec<FileChange>>;

    async fn get_pr_comments(&self, repo: &str, pr_number: u64) -> Result<Vec<Comment>>;

    async fn search_pull_requests(
        &self,
        query: &str,
        repo: Option<&str>,
        org: Option<&str>,
        per_page: u32,
    ) -> Result<Vec<PullRequestSummary>>;
}
