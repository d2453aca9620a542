//! Core agent loop implementation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::github::{GitHubApi, GitHubClient};
use crate::llm::{AnthropicClient, ContentBlock, LlmClient, Message, MessageRequest, StopReason};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;

/// Answer returned when the iteration cap is hit before a final reply.
pub const ITERATION_LIMIT_MESSAGE: &str =
    "I've done a lot of research but haven't reached a final answer. Try a narrower question or raise the iteration limit.";

/// Running message history. Kept across questions in interactive mode.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }
}

/// A tool invocation made while answering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub input: Value,
}

/// Outcome of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResult {
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// LLM calls made.
    pub iterations: usize,
    pub hit_iteration_limit: bool,
}

/// The pull request agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    max_tokens: u32,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create an agent backed by the Anthropic and GitHub HTTP clients.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let llm = Arc::new(
            AnthropicClient::new(config.anthropic_api_key.clone())
                .with_base_url(config.anthropic_api_url.clone()),
        );
        let github = Arc::new(GitHubClient::new(
            config.github_token.clone(),
            config.github_api_url.clone(),
        )?);

        Ok(Self::with_clients(config, llm, github))
    }

    /// Create an agent over arbitrary client implementations.
    pub fn with_clients(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        github: Arc<dyn GitHubApi>,
    ) -> Self {
        let tools = ToolRegistry::new(github, config.default_repo.clone());
        let system_prompt = build_system_prompt(&tools);

        Self {
            llm,
            tools,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_iterations: config.max_iterations,
            system_prompt,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Answer a standalone question with a fresh conversation.
    pub async fn run(&self, question: &str) -> anyhow::Result<AgentResult> {
        let mut conversation = Conversation::new();
        self.run_in(&mut conversation, question).await
    }

    /// Answer a question as the next turn of `conversation`.
    ///
    /// On error the conversation is restored to its state before the call.
    pub async fn run_in(
        &self,
        conversation: &mut Conversation,
        question: &str,
    ) -> anyhow::Result<AgentResult> {
        let checkpoint = conversation.len();
        let result = self.drive(conversation, question).await;
        if result.is_err() {
            conversation.truncate(checkpoint);
        }
        result
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        question: &str,
    ) -> anyhow::Result<AgentResult> {
        conversation.push(Message::user(question));

        // Get tool schemas for LLM
        let tool_schemas = self.tools.get_tool_schemas();
        let mut tool_calls = Vec::new();

        // Agent loop
        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let request = MessageRequest {
                model: &self.model,
                max_tokens: self.max_tokens,
                system: &self.system_prompt,
                tools: &tool_schemas,
                messages: conversation.messages(),
            };
            let response = self.llm.create_message(&request).await?;

            if response.stop_reason == Some(StopReason::MaxTokens) {
                tracing::warn!(
                    "LLM reply hit the max_tokens limit ({}); answer may be cut short",
                    self.max_tokens
                );
            }

            // Check for tool calls
            let tool_uses = response.tool_uses();
            if !tool_uses.is_empty() {
                let mut results = Vec::with_capacity(tool_uses.len());

                for tool_use in &tool_uses {
                    tracing::debug!(
                        "Calling tool: {} with args: {}",
                        tool_use.name,
                        tool_use.input
                    );
                    tool_calls.push(ToolCallRecord {
                        name: tool_use.name.clone(),
                        input: tool_use.input.clone(),
                    });

                    let output = self
                        .tools
                        .execute(&tool_use.name, tool_use.input.clone())
                        .await;

                    tracing::debug!(
                        "Tool result ({}): {}",
                        if output.is_error { "error" } else { "ok" },
                        truncate_for_log(&output.content, 1000)
                    );

                    results.push(ContentBlock::ToolResult {
                        tool_use_id: tool_use.id.clone(),
                        content: output.content,
                        is_error: output.is_error,
                    });
                }

                conversation.push(Message::assistant(known_blocks(response.content)));
                conversation.push(Message::tool_results(results));
                continue;
            }

            // No tool calls - this is the final response
            if let Some(text) = response.text() {
                tracing::debug!("Final response: {}", truncate_for_log(&text, 2000));
                conversation.push(Message::assistant(known_blocks(response.content)));
                return Ok(AgentResult {
                    response: text,
                    tool_calls,
                    iterations: iteration + 1,
                    hit_iteration_limit: false,
                });
            }

            return Err(anyhow::anyhow!("LLM returned empty response"));
        }

        tracing::warn!(
            "Max iterations ({}) reached without a final answer",
            self.max_iterations
        );

        // Close the turn so the next question starts from an assistant reply.
        conversation.push(Message::assistant(vec![ContentBlock::text(
            ITERATION_LIMIT_MESSAGE,
        )]));

        Ok(AgentResult {
            response: ITERATION_LIMIT_MESSAGE.to_string(),
            tool_calls,
            iterations: self.max_iterations,
            hit_iteration_limit: true,
        })
    }
}

/// Drop block types the API would not accept back.
fn known_blocks(content: Vec<ContentBlock>) -> Vec<ContentBlock> {
    content
        .into_iter()
        .filter(|b| !matches!(b, ContentBlock::Unknown))
        .collect()
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
