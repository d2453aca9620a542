//! # PR Agent
//!
//! A conversational assistant for GitHub pull requests.
//!
//! This library provides:
//! - A read-only GitHub REST client for pull requests, reviews, checks and files
//! - A tool registry exposing those queries to an LLM
//! - An agent loop over the Anthropic Messages API
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a question from the CLI
//! 2. Build context with system prompt and available tools
//! 3. Call LLM, parse response, execute any tool calls
//! 4. Feed results back to LLM, repeat until it answers
//!
//! ## Example
//!
//! ```rust,ignore
//! use pr_agent::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(&config)?;
//! let result = agent.run("Is PR #42 ready to merge?").await?;
//! println!("{}", result.response);
//! ```

pub mod agent;
pub mod config;
pub mod github;
pub mod llm;
pub mod tools;

pub use config::Config;
