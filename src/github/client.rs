//! HTTP implementation of [`GitHubApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use urlencoding::encode;

use super::models::{CheckRunsPage, PullRequestHead, SearchPage};
use super::{
    ChecksSummary, Comment, CommentKind, FileChange, GitHubApi, GitHubError, PrState,
    PullRequestDetail, PullRequestSummary, RepoRef, Result, Review,
};

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated GitHub REST client.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    /// Create a client for `base_url` (normally `https://api.github.com`).
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pr-agent/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {}", path);

        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_comments(&self, path: &str, kind: CommentKind) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self.get(path, &[]).await?;
        for c in &mut comments {
            c.kind = kind;
        }
        Ok(comments)
    }
}

/// `/repos/{owner}/{repo}` with both segments escaped.
fn repo_path(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", encode(&repo.owner), encode(&repo.name))
}

/// Pull GitHub's `message` field out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn search_query(query: &str, repo: Option<&str>, org: Option<&str>) -> String {
    let mut q = format!("is:pr {}", query.trim());
    if let Some(repo) = repo {
        q.push_str(&format!(" repo:{}", repo));
    } else if let Some(org) = org {
        q.push_str(&format!(" org:{}", org));
    }
    q
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_pull_requests(
        &self,
        repo: &str,
        state: PrState,
        per_page: u32,
        author: Option<&str>,
    ) -> Result<Vec<PullRequestSummary>> {
        let repo_ref = RepoRef::parse(repo)?;

        // The pulls endpoint cannot filter by author; search can.
        if let Some(author) = author {
            let query = match state {
                PrState::All => format!("author:{}", author),
                s => format!("is:{} author:{}", s.as_str(), author),
            };
            return self
                .search_pull_requests(&query, Some(&repo_ref.to_string()), None, per_page)
                .await;
        }

        self.get(
            &format!("{}/pulls", repo_path(&repo_ref)),
            &[
                ("state", state.as_str().to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn get_pull_request(&self, repo: &str, pr_number: u64) -> Result<PullRequestDetail> {
        let repo_ref = RepoRef::parse(repo)?;
        self.get(&format!("{}/pulls/{}", repo_path(&repo_ref), pr_number), &[])
            .await
    }

    async fn get_pr_reviews(&self, repo: &str, pr_number: u64) -> Result<Vec<Review>> {
        let repo_ref = RepoRef::parse(repo)?;
        self.get(
            &format!("{}/pulls/{}/reviews", repo_path(&repo_ref), pr_number),
            &[],
        )
        .await
    }

    async fn get_pr_checks(&self, repo: &str, pr_number: u64) -> Result<ChecksSummary> {
        let repo_ref = RepoRef::parse(repo)?;
        let base = repo_path(&repo_ref);

        // Check runs hang off the head commit, not the PR.
        let pr: PullRequestHead = self
            .get(&format!("{}/pulls/{}", base, pr_number), &[])
            .await?;
        let sha = pr.head.sha;

        let page: CheckRunsPage = self
            .get(
                &format!("{}/commits/{}/check-runs", base, encode(&sha)),
                &[("per_page", "100".to_string())],
            )
            .await?;

        Ok(ChecksSummary::from_runs(sha, page.check_runs))
    }

    async fn get_pr_files(
        &self,
        repo: &str,
        pr_number: u64,
        include_patch: bool,
    ) -> Result<Vec<FileChange>> {
        let repo_ref = RepoRef::parse(repo)?;
        let mut files: Vec<FileChange> = self
            .get(
                &format!("{}/pulls/{}/files", repo_path(&repo_ref), pr_number),
                &[],
            )
            .await?;

        if !include_patch {
            for f in &mut files {
                f.patch = None;
            }
        }
        Ok(files)
    }

    async fn get_pr_comments(&self, repo: &str, pr_number: u64) -> Result<Vec<Comment>> {
        let repo_ref = RepoRef::parse(repo)?;
        let base = repo_path(&repo_ref);

        let mut comments = self
            .fetch_comments(
                &format!("{}/issues/{}/comments", base, pr_number),
                CommentKind::Issue,
            )
            .await?;
        comments.extend(
            self.fetch_comments(
                &format!("{}/pulls/{}/comments", base, pr_number),
                CommentKind::Review,
            )
            .await?,
        );

        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn search_pull_requests(
        &self,
        query: &str,
        repo: Option<&str>,
        org: Option<&str>,
        per_page: u32,
    ) -> Result<Vec<PullRequestSummary>> {
        if let Some(repo) = repo {
            RepoRef::parse(repo)?;
        }

        let page: SearchPage = self
            .get(
                "/search/issues",
                &[
                    ("q", search_query(query, repo, org)),
                    ("per_page", per_page.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }
}
