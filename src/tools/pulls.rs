//! Pull request listing, lookup and search tools.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{limit, optional_str, pr_number, required_str, to_json, Tool, ToolContext};
use crate::github::PrState;

const REPO_DESCRIPTION: &str =
    "Repository in 'owner/repo' format. Defaults to the configured repository when omitted.";

/// List pull requests in a repository.
pub struct ListPullRequests;

#[async_trait]
impl Tool for ListPullRequests {
    fn name(&self) -> &str {
        "list_pull_requests"
    }

    fn description(&self) -> &str {
        "List pull requests in a repository, most recently updated first. Can filter by state and author."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": {
                    "type": "string",
                    "description": REPO_DESCRIPTION
                },
                "state": {
                    "type": "string",
                    "enum": ["open", "closed", "all"],
                    "description": "Filter by PR state (default: open)"
                },
                "author": {
                    "type": "string",
                    "description": "Filter by author username"
                },
                "limit": {
                    "type": "integer",
                    "description": "Max PRs to return, 1-30 (default: 10)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let state = match optional_str(&args, "state") {
            Some(s) => s.parse::<PrState>().map_err(anyhow::Error::msg)?,
            None => PrState::Open,
        };
        let per_page = limit(&args)?;
        let author = optional_str(&args, "author").map(|a| a.trim_start_matches('@'));
        // The login is spliced into a search query; whitespace would add qualifiers.
        if let Some(author) = author {
            if author.is_empty() || author.contains(char::is_whitespace) {
                anyhow::bail!("'author' must be a single GitHub username, got '{}'", author);
            }
        }

        let prs = ctx
            .github
            .list_pull_requests(&repo, state, per_page, author)
            .await?;
        to_json(&prs)
    }
}

/// Get full details of one pull request.
pub struct GetPullRequest;

#[async_trait]
impl Tool for GetPullRequest {
    fn name(&self) -> &str {
        "get_pull_request"
    }

    fn description(&self) -> &str {
        "Get detailed info about a specific PR: title, description, author, branches, merge status, requested reviewers and diff stats."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": {
                    "type": "string",
                    "description": REPO_DESCRIPTION
                },
                "pr_number": {
                    "type": "integer",
                    "description": "The PR number"
                }
            },
            "required": ["pr_number"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let number = pr_number(&args)?;

        let pr = ctx.github.get_pull_request(&repo, number).await?;
        to_json(&pr)
    }
}

/// Search pull requests with GitHub search syntax.
pub struct SearchPullRequests;

#[async_trait]
impl Tool for SearchPullRequests {
    fn name(&self) -> &str {
        "search_pull_requests"
    }

    fn description(&self) -> &str {
        "Search PRs using GitHub search syntax. Examples: 'author:alice', \
         'review-requested:bob', 'is:open' / 'is:merged' / 'is:closed', 'is:draft', \
         'created:>2024-01-01', 'label:bug', 'base:main'. Qualifiers combine, e.g. \
         'is:open author:alice'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "GitHub search query"
                },
                "repo": {
                    "type": "string",
                    "description": "Limit to a specific repository ('owner/repo')"
                },
                "limit": {
                    "type": "integer",
                    "description": "Max results, 1-30 (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let query = required_str(&args, "query")?;
        let repo = optional_str(&args, "repo");
        let per_page = limit(&args)?;

        let prs = ctx
            .github
            .search_pull_requests(query, repo, None, per_page)
            .await?;
        to_json(&prs)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::testing::FakeGitHub;
    use super::*;

    fn ctx(github: Arc<FakeGitHub>) -> ToolContext {
        ToolContext {
            github,
            default_repo: None,
        }
    }

    #[tokio::test]
    async fn list_passes_filters_through() {
        let github = Arc::new(FakeGitHub::default());
        ListPullRequests
            .execute(
                json!({"repo": "o/r", "state": "closed", "author": "@bob", "limit": 50}),
                &ctx(github.clone()),
            )
            .await
            .unwrap();

        assert_eq!(github.calls()[0].args, vec!["o/r", "closed", "30", "bob"]);
    }

    #[tokio::test]
    async fn list_defaults_to_open_and_ten() {
        let github = Arc::new(FakeGitHub::default());
        ListPullRequests
            .execute(json!({"repo": "o/r"}), &ctx(github.clone()))
            .await
            .unwrap();

        assert_eq!(github.calls()[0].args, vec!["o/r", "open", "10", "-"]);
    }

    #[tokio::test]
    async fn list_rejects_unknown_state() {
        let github = Arc::new(FakeGitHub::default());
        let err = ListPullRequests
            .execute(json!({"repo": "o/r", "state": "merged"}), &ctx(github.clone()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid state"));
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn list_rejects_author_with_whitespace() {
        let github = Arc::new(FakeGitHub::default());
        let err = ListPullRequests
            .execute(
                json!({"repo": "o/r", "author": "bob is:closed"}),
                &ctx(github.clone()),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("single GitHub username"));
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn search_does_not_apply_default_repo() {
        let github = Arc::new(FakeGitHub::default());
        let ctx = ToolContext {
            github: github.clone(),
            default_repo: Some("d/r".to_string()),
        };
        SearchPullRequests
            .execute(json!({"query": "review-requested:me"}), &ctx)
            .await
            .unwrap();

        assert_eq!(
            github.calls()[0].args,
            vec!["review-requested:me", "-", "-", "10"]
        );
    }

    #[tokio::test]
    async fn search_requires_query() {
        let github = Arc::new(FakeGitHub::default());
        let err = SearchPullRequests
            .execute(json!({"repo": "o/r"}), &ctx(github))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing 'query'"));
    }
}
