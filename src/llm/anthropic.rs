//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use super::{LlmClient, LlmError, MessageRequest, MessageResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| LlmError::Auth(format!("Invalid API key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

/// Pull `error.message` out of an Anthropic error envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn create_message(
        &self,
        request: &MessageRequest<'_>,
    ) -> Result<MessageResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Auth(format!(
                "{}. Please check ANTHROPIC_API_KEY.",
                error_message(&body)
            )));
        }

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: MessageResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            "LLM response {}: stop_reason={:?}, tokens in/out={}/{}",
            parsed.id,
            parsed.stop_reason,
            parsed.usage.input_tokens,
            parsed.usage.output_tokens
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ContentBlock, Message, StopReason, ToolSchema};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tools() -> Vec<ToolSchema> {
        vec![ToolSchema {
            name: "get_pull_request".into(),
            description: "Get a PR".into(),
            input_schema: json!({"type": "object", "properties": {}}),
        }]
    }

    fn request<'a>(tools: &'a [ToolSchema], messages: &'a [Message]) -> MessageRequest<'a> {
        MessageRequest {
            model: "claude-test",
            max_tokens: 256,
            system: "be brief",
            tools,
            messages,
        }
    }

    #[tokio::test]
    async fn posts_messages_with_headers_and_decodes_tool_use() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-test",
                "max_tokens": 256,
                "system": "be brief"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "toolu_01", "name": "get_pull_request",
                     "input": {"repo": "o/r", "pr_number": 1}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 100, "output_tokens": 20}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (tools, messages) = (tools(), vec![Message::user("Is PR 1 ready?")]);
        let client = AnthropicClient::new("sk-test").with_base_url(server.uri());
        let response = client
            .create_message(&request(&tools, &messages))
            .await
            .unwrap();

        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert!(matches!(
            &response.content[0],
            ContentBlock::ToolUse { name, .. } if name == "get_pull_request"
        ));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let messages = vec![Message::user("hi")];
        let client = AnthropicClient::new("bad").with_base_url(server.uri());
        let err = client
            .create_message(&request(&[], &messages))
            .await
            .unwrap_err();
        match err {
            LlmError::Auth(msg) => assert!(msg.contains("invalid x-api-key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let messages = vec![Message::user("hi")];
        let client = AnthropicClient::new("sk-test").with_base_url(server.uri());
        let err = client
            .create_message(&request(&[], &messages))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, ref message } if message == "Overloaded"));
    }
}
