//! Configuration management for pr-agent.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first when present):
//! - `ANTHROPIC_API_KEY` - Required. Anthropic API key.
//! - `GITHUB_TOKEN` - Required. GitHub access token used for all API reads.
//! - `CLAUDE_MODEL` - Optional. Model identifier. Defaults to `claude-sonnet-4-20250514`.
//! - `MAX_TOOL_ITERATIONS` - Optional. Maximum LLM calls per question. Defaults to `10`.
//! - `MAX_TOKENS` - Optional. Token cap for each LLM reply. Defaults to `4096`.
//! - `DEFAULT_REPO` - Optional. Repository (`owner/name`) used when a tool call omits one.
//! - `GITHUB_API_URL` - Optional. Defaults to `https://api.github.com`.
//! - `ANTHROPIC_API_URL` - Optional. Defaults to `https://api.anthropic.com`.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key
    pub anthropic_api_key: String,

    /// GitHub access token (sent as a bearer token)
    pub github_token: String,

    /// LLM model identifier
    pub model: String,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Maximum tokens per LLM reply
    pub max_tokens: u32,

    /// Repository used when a tool call does not name one
    pub default_repo: Option<String>,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Anthropic API base URL
    pub anthropic_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `ANTHROPIC_API_KEY` or
    /// `GITHUB_TOKEN` is not set, and `ConfigError::InvalidValue` when an
    /// optional variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let anthropic_api_key = required("ANTHROPIC_API_KEY")?;
        let github_token = required("GITHUB_TOKEN")?;

        // Set but blank is an error, not the default.
        let non_blank = |key: &str, default: &str| match lookup(key) {
            None => Ok(default.to_string()),
            Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(
                key.to_string(),
                "must not be empty".to_string(),
            )),
            Some(v) => Ok(v.trim().to_string()),
        };

        let model = non_blank("CLAUDE_MODEL", DEFAULT_MODEL)?;

        let max_iterations = lookup("MAX_TOOL_ITERATIONS")
            .map(|v| parse_max_iterations(&v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        let max_tokens = lookup("MAX_TOKENS")
            .map(|v| parse_max_tokens(&v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let default_repo = lookup("DEFAULT_REPO")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| {
                validate_repo(&v)
                    .map(|_| v.clone())
                    .map_err(|e| ConfigError::InvalidValue("DEFAULT_REPO".to_string(), e))
            })
            .transpose()?;

        let github_api_url = non_blank("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)?;
        let anthropic_api_url = non_blank("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL)?;

        Ok(Self {
            anthropic_api_key,
            github_token,
            model,
            max_iterations,
            max_tokens,
            default_repo,
            github_api_url,
            anthropic_api_url,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(anthropic_api_key: String, github_token: String) -> Self {
        Self {
            anthropic_api_key,
            github_token,
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: DEFAULT_MAX_TOKENS,
            default_repo: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            anthropic_api_url: DEFAULT_ANTHROPIC_API_URL.to_string(),
        }
    }
}

/// Parse an iteration cap. Zero would never reach the LLM, so it is rejected.
pub fn parse_max_iterations(value: &str) -> Result<usize, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidValue("MAX_TOOL_ITERATIONS".to_string(), msg);
    let n = value
        .trim()
        .parse::<usize>()
        .map_err(|e| invalid(format!("{}", e)))?;
    if n == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(n)
}

fn parse_max_tokens(value: &str) -> Result<u32, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidValue("MAX_TOKENS".to_string(), msg);
    let n = value
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(format!("{}", e)))?;
    if n == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(n)
}

fn validate_repo(value: &str) -> Result<(), String> {
    match value.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(format!("expected 'owner/repo', got: {}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_applied_when_only_credentials_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
        ]))
        .unwrap();

        assert_eq!(config.anthropic_api_key, "sk-test");
        assert_eq!(config.github_token, "ghp_test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.default_repo, None);
        assert_eq!(config.github_api_url, "https://api.github.com");
    }

    #[test]
    fn missing_github_token_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GITHUB_TOKEN"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "  "),
            ("GITHUB_TOKEN", "ghp_test"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "ANTHROPIC_API_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("CLAUDE_MODEL", "claude-haiku"),
            ("MAX_TOOL_ITERATIONS", "3"),
            ("MAX_TOKENS", "1024"),
            ("DEFAULT_REPO", "rust-lang/rust"),
        ]))
        .unwrap();

        assert_eq!(config.model, "claude-haiku");
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.default_repo.as_deref(), Some("rust-lang/rust"));
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("MAX_TOOL_ITERATIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "MAX_TOOL_ITERATIONS"));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("MAX_TOKENS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "MAX_TOKENS"));
    }

    #[test]
    fn blank_model_and_urls_rejected() {
        for key in ["CLAUDE_MODEL", "GITHUB_API_URL", "ANTHROPIC_API_URL"] {
            let err = Config::from_lookup(lookup_from(&[
                ("ANTHROPIC_API_KEY", "sk-test"),
                ("GITHUB_TOKEN", "ghp_test"),
                (key, " "),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref v, _) if v == key),
                "{} accepted a blank value",
                key
            );
        }
    }

    #[test]
    fn malformed_default_repo_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("DEFAULT_REPO", "just-a-name"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "DEFAULT_REPO"));
    }
}
