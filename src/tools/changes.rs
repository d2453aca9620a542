//! CI status and changed-file tools.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{bool_arg, pr_number, to_json, Tool, ToolContext};

/// Get CI check runs for a PR's head commit.
pub struct GetPrChecks;

#[async_trait]
impl Tool for GetPrChecks {
    fn name(&self) -> &str {
        "get_pr_checks"
    }

    fn description(&self) -> &str {
        "Get CI/CD check status for a PR: counts of passed, failed and pending checks plus each check's name, status and conclusion."
    }

    fn parameters_schema(&self) -> Value {
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

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let number = pr_number(&args)?;

        let checks = ctx.github.get_pr_checks(&repo, number).await?;
        to_json(&checks)
    }
}

/// Get the files a PR touches.
pub struct GetPrFiles;

#[async_trait]
impl Tool for GetPrFiles {
    fn name(&self) -> &str {
        "get_pr_files"
    }

    fn description(&self) -> &str {
        "Get files changed in a PR with addition/deletion stats. Diff content is only included when asked for."
    }

    fn parameters_schema(&self) -> Value {
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
                },
                "include_patches": {
                    "type": "boolean",
                    "description": "Include the diff of each file (default: false)"
                }
            },
            "required": ["pr_number"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let repo = ctx.repo(&args)?;
        let number = pr_number(&args)?;
        let include_patches = bool_arg(&args, "include_patches");

        let files = ctx.github.get_pr_files(&repo, number, include_patches).await?;
        to_json(&files)
    }
}
