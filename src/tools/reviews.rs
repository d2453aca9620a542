//! Review and discussion tools.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{pr_number, to_json, Tool, ToolContext};

fn pr_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "repo": {
                "type": "string",
                "description": "Repository in 'owner/repo' format. Defaults to the configured repository when omitted."
            },
            "pr_number": {
                "type": "integer",
                "description": "The PR number"
            }
        },
        "required": ["pr_number"]
    })
}

/// Get submitted reviews on a PR.
pub struct GetPrReviews;

#[async_trait]
impl Tool for GetPrReviews {
    fn name(&self) -> &str {
        "get_pr_reviews"
    }

    fn description(&self) -> &str {
        "Get all reviews on a PR: who reviewed, their decision (approved / changes requested / commented) and review text."
    }

    fn parameters_schema(&self) -> Value {
        pr_schema()
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let number = pr_number(&args)?;

        let reviews = ctx.github.get_pr_reviews(&repo, number).await?;
        to_json(&reviews)
    }
}

/// Get conversation and inline review comments on a PR.
pub struct GetPrComments;

#[async_trait]
impl Tool for GetPrComments {
    fn name(&self) -> &str {
        "get_pr_comments"
    }

    fn description(&self) -> &str {
        "Get all comments on a PR, oldest first: general conversation comments and inline code review comments (with file path and line)."
    }

    fn parameters_schema(&self) -> Value {
        pr_schema()
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let number = pr_number(&args)?;

        let comments = ctx.github.get_pr_comments(&repo, number).await?;
        to_json(&comments)
    }
}
