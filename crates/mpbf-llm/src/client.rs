//! LLM completion clients.
//!
//! `HttpCompletionClient` talks to an OpenAI-compatible chat-completions
//! endpoint over reqwest. `MockCompletionClient` returns canned responses
//! keyed by substring match and is what the pipeline tests inject.

use crate::error::LlmError;
use async_trait::async_trait;
use mpbf_core::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, error};

/// Seam to the LLM completion endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system + user prompt pair and return the raw completion
    /// text. When `json_mode` is set, the endpoint is asked to emit a
    /// single JSON object.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, LlmError>;
}

/// Chat-completions request body (OpenAI wire format).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

/// HTTP client for an OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    config: LlmConfig,
    client: Client,
}

impl HttpCompletionClient {
    /// Create a new client. Fails fast on a missing API key so the host
    /// application notices at startup, not on the first user command.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!(model = %self.config.model, json_mode, "sending completion request");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::Authentication);
        }
        if !status.is_success() {
            error!(%status, "completion endpoint returned error");
            return Err(LlmError::Api(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                "completion usage"
            );
        }

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

        Ok(content.to_string())
    }
}

/// Mock completion client for tests and offline demos.
///
/// Responses are matched by substring against the user prompt, first
/// match wins. Calls are recorded so tests can assert how many LLM round
/// trips a scenario took.
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    responses: Vec<(String, String)>,
    fallback: Option<String>,
    fail: bool,
    calls: RwLock<Vec<String>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for user prompts containing `needle`.
    pub fn respond_when(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.push((needle.into(), response.into()));
        self
    }

    /// Response for prompts no needle matches.
    pub fn fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Make every call fail, for degraded-path tests.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// User prompts seen so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _json_mode: bool,
    ) -> Result<String, LlmError> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(user_prompt.to_string());

        if self.fail {
            return Err(LlmError::Api("mock configured to fail".to_string()));
        }

        for (needle, response) in &self.responses {
            if user_prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }

        self.fallback
            .clone()
            .ok_or_else(|| LlmError::InvalidResponse("no mock response registered".to_string()))
    }
}

/// Extract the JSON object from a completion that may be wrapped in
/// markdown fences or surrounding prose.
pub(crate) fn clean_json_response(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_strips_fences_and_prose() {
        let variants = [
            "```json\n{\"intent\": \"create\"}\n```",
            "Here is the result:\n{\"intent\": \"create\"}\nThat's it.",
            "{\"intent\": \"create\"}",
        ];
        for raw in variants {
            assert_eq!(clean_json_response(raw), "{\"intent\": \"create\"}");
        }
    }

    #[tokio::test]
    async fn mock_matches_by_substring() {
        let mock = MockCompletionClient::new()
            .respond_when("عميل", r#"{"intent":"create"}"#)
            .fallback(r#"{"intent":"unknown"}"#);

        let hit = mock.complete("sys", "سجل عميل جديد", true).await.unwrap();
        assert!(hit.contains("create"));

        let miss = mock.complete("sys", "weather", true).await.unwrap();
        assert!(miss.contains("unknown"));
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let mock = MockCompletionClient::failing();
        assert!(mock.complete("sys", "anything", false).await.is_err());
    }

    #[test]
    fn http_client_requires_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            HttpCompletionClient::new(config),
            Err(LlmError::Authentication)
        ));
    }
}
