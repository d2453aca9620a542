//! Agent module - answers pull request questions with GitHub tools.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Append the user question to the conversation
//! 2. Call the LLM with the system prompt and tool schemas
//! 3. If the LLM requests tool calls, execute them and feed the results back
//! 4. Repeat until the LLM produces a text answer or the iteration cap is hit

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentResult, Conversation, ToolCallRecord, ITERATION_LIMIT_MESSAGE};
pub use prompt::build_system_prompt;
