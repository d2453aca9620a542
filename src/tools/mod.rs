//! Tools the LLM can call.
//!
//! Every tool is a thin adapter from a JSON argument object to exactly one
//! [`GitHubApi`] call. Dispatch goes through [`ToolRegistry`], a name to
//! handler map; failures are turned into error text for the model rather
//! than surfaced to the caller.

mod changes;
mod pulls;
mod reviews;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::github::GitHubApi;
use crate::llm::ToolSchema;

pub use changes::{GetPrChecks, GetPrFiles};
pub use pulls::{GetPullRequest, ListPullRequests, SearchPullRequests};
pub use reviews::{GetPrComments, GetPrReviews};

/// Default and maximum result counts for list-style tools.
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 30;

/// A tool callable by the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the argument object.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String>;
}

/// What every tool invocation gets to work with.
pub struct ToolContext {
    pub github: Arc<dyn GitHubApi>,
    pub default_repo: Option<String>,
}

impl ToolContext {
    /// The `repo` argument, or the configured default when it is omitted.
    pub fn repo(&self, args: &Value) -> anyhow::Result<String> {
        match args["repo"].as_str().map(str::trim).filter(|r| !r.is_empty()) {
            Some(repo) => Ok(repo.to_string()),
            None => self.default_repo.clone().ok_or_else(|| {
                anyhow::anyhow!("Missing 'repo' argument and no default repository is configured")
            }),
        }
    }
}

/// Name and description, for prompt building.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Result text handed back to the LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Registry of available tools, keyed by name.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
    ctx: ToolContext,
}

impl ToolRegistry {
    /// Registry with the full pull request tool set.
    pub fn new(github: Arc<dyn GitHubApi>, default_repo: Option<String>) -> Self {
        let mut registry = Self::empty(github, default_repo);

        registry.register(ListPullRequests);
        registry.register(GetPullRequest);
        registry.register(GetPrReviews);
        registry.register(GetPrChecks);
        registry.register(GetPrFiles);
        registry.register(GetPrComments);
        registry.register(SearchPullRequests);

        registry
    }

    pub fn empty(github: Arc<dyn GitHubApi>, default_repo: Option<String>) -> Self {
        Self {
            tools: BTreeMap::new(),
            ctx: ToolContext {
                github,
                default_repo,
            },
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn default_repo(&self) -> Option<&str> {
        self.ctx.default_repo.as_deref()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.parameters_schema(),
            })
            .collect()
    }

    /// Run a tool by name. Never fails: problems come back as error output.
    pub async fn execute(&self, name: &str, args: Value) -> ToolOutput {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!("LLM requested unknown tool: {}", name);
            return ToolOutput::error(format!("Error: Unknown tool '{}'", name));
        };

        match tool.execute(args, &self.ctx).await {
            Ok(output) => ToolOutput::ok(output),
            Err(e) => {
                tracing::debug!("Tool {} failed: {}", name, e);
                ToolOutput::error(format!("Error executing {}: {}", name, e))
            }
        }
    }
}

/// Required string argument.
fn required_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args[key]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))
}

/// Optional string argument; empty strings count as absent.
fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args[key].as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// `pr_number`, accepting numeric strings since models sometimes quote it.
fn pr_number(args: &Value) -> anyhow::Result<u64> {
    match &args["pr_number"] {
        Value::Null => Err(anyhow::anyhow!("Missing 'pr_number' argument")),
        Value::Number(n) => n
            .as_u64()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("'pr_number' must be a positive integer, got {}", n)),
        Value::String(s) => s
            .trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("'pr_number' must be a positive integer, got '{}'", s)),
        other => Err(anyhow::anyhow!(
            "'pr_number' must be a positive integer, got {}",
            other
        )),
    }
}

/// `limit`, clamped to `1..=MAX_LIMIT`.
fn limit(args: &Value) -> anyhow::Result<u32> {
    match &args["limit"] {
        Value::Null => Ok(DEFAULT_LIMIT),
        v => v
            .as_i64()
            .map(|n| n.clamp(1, MAX_LIMIT as i64) as u32)
            .ok_or_else(|| anyhow::anyhow!("'limit' must be an integer, got {}", v)),
    }
}

fn bool_arg(args: &Value, key: &str) -> bool {
    args[key].as_bool().unwrap_or(false)
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeGitHub;
    use super::*;
    use serde_json::json;

    fn registry(github: Arc<FakeGitHub>, default_repo: Option<&str>) -> ToolRegistry {
        ToolRegistry::new(github, default_repo.map(str::to_string))
    }

    #[test]
    fn catalog_has_unique_complete_schemas() {
        let reg = registry(Arc::new(FakeGitHub::default()), None);
        let schemas = reg.get_tool_schemas();

        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "get_pr_checks",
                "get_pr_comments",
                "get_pr_files",
                "get_pr_reviews",
                "get_pull_request",
                "list_pull_requests",
                "search_pull_requests",
            ]
        );

        for schema in &schemas {
            assert!(!schema.description.is_empty(), "{} has no description", schema.name);
            assert_eq!(schema.input_schema["type"], "object", "{}", schema.name);
            assert!(schema.input_schema["required"].is_array(), "{}", schema.name);
        }
    }

    #[tokio::test]
    async fn each_tool_makes_exactly_one_matching_call() {
        let cases = [
            ("list_pull_requests", json!({"repo": "o/r"})),
            ("get_pull_request", json!({"repo": "o/r", "pr_number": 1})),
            ("get_pr_reviews", json!({"repo": "o/r", "pr_number": 1})),
            ("get_pr_checks", json!({"repo": "o/r", "pr_number": 1})),
            ("get_pr_files", json!({"repo": "o/r", "pr_number": 1})),
            ("get_pr_comments", json!({"repo": "o/r", "pr_number": 1})),
            ("search_pull_requests", json!({"query": "is:open"})),
        ];

        for (name, args) in cases {
            let github = Arc::new(FakeGitHub::default());
            let reg = registry(github.clone(), None);

            let output = reg.execute(name, args).await;
            assert!(!output.is_error, "{} failed: {}", name, output.content);

            let calls = github.calls();
            assert_eq!(calls.len(), 1, "{} made {:?}", name, calls);
            assert_eq!(calls[0].method, name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_turn() {
        let github = Arc::new(FakeGitHub::default());
        let reg = registry(github.clone(), None);

        let output = reg.execute("delete_repository", json!({})).await;
        assert!(output.is_error);
        assert_eq!(output.content, "Error: Unknown tool 'delete_repository'");
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_required_argument_is_reported() {
        let github = Arc::new(FakeGitHub::default());
        let reg = registry(github.clone(), Some("test/repo"));

        let output = reg.execute("get_pull_request", json!({"repo": "o/r"})).await;
        assert!(output.is_error);
        assert!(output.content.starts_with("Error executing get_pull_request"));
        assert!(output.content.contains("pr_number"));
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn non_object_arguments_do_not_panic() {
        let github = Arc::new(FakeGitHub::default());
        let reg = registry(github.clone(), None);

        let output = reg.execute("get_pr_files", json!("garbage")).await;
        assert!(output.is_error);
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn default_repo_used_when_omitted() {
        let github = Arc::new(FakeGitHub::default());
        let reg = registry(github.clone(), Some("test/repo"));

        reg.execute("list_pull_requests", json!({})).await;
        reg.execute("list_pull_requests", json!({"repo": "other/repo"})).await;

        let calls = github.calls();
        assert_eq!(calls[0].args[0], "test/repo");
        assert_eq!(calls[1].args[0], "other/repo");
    }

    #[tokio::test]
    async fn missing_repo_without_default_is_reported() {
        let reg = registry(Arc::new(FakeGitHub::default()), None);
        let output = reg.execute("get_pr_reviews", json!({"pr_number": 4})).await;
        assert!(output.is_error);
        assert!(output.content.contains("no default repository"));
    }

    #[tokio::test]
    async fn api_error_handled_gracefully() {
        let github = Arc::new(FakeGitHub::failing("API rate limit exceeded"));
        let reg = registry(github.clone(), None);

        let output = reg.execute("list_pull_requests", json!({"repo": "test/repo"})).await;
        assert!(output.is_error);
        assert!(output.content.contains("Error"));
        assert!(output.content.contains("rate limit"));
        assert_eq!(github.calls().len(), 1);
    }

    #[tokio::test]
    async fn success_output_is_json() {
        let reg = registry(Arc::new(FakeGitHub::default()), None);
        let output = reg
            .execute("search_pull_requests", json!({"query": "is:open"}))
            .await;

        let parsed: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["number"], 2);
    }

    #[test]
    fn pr_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(pr_number(&json!({"pr_number": 12})).unwrap(), 12);
        assert_eq!(pr_number(&json!({"pr_number": "#34"})).unwrap(), 34);
        assert!(pr_number(&json!({"pr_number": 0})).is_err());
        assert!(pr_number(&json!({"pr_number": -3})).is_err());
        assert!(pr_number(&json!({"pr_number": "abc"})).is_err());
        assert!(pr_number(&json!({"pr_number": [1]})).is_err());
        assert!(pr_number(&json!({})).is_err());
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(limit(&json!({})).unwrap(), 10);
        assert_eq!(limit(&json!({"limit": 100})).unwrap(), 30);
        assert_eq!(limit(&json!({"limit": 0})).unwrap(), 1);
        assert_eq!(limit(&json!({"limit": 5})).unwrap(), 5);
        assert!(limit(&json!({"limit": "many"})).is_err());
    }
}
