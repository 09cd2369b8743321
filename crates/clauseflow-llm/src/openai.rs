//! OpenAI-compatible Oracle Implementation
//!
//! Talks to any service exposing `POST /v1/chat/completions` with
//! `response_format: {"type": "json_schema"}` structured output.
//!
//! # Examples
//!
//! ```no_run
//! use clauseflow_llm::OpenAiOracle;
//!
//! let oracle = OpenAiOracle::from_env("https://api.openai.com", "gpt-4o", "OPENAI_API_KEY").unwrap();
//! ```

use crate::{backoff_delay, block_on, LlmError, DEFAULT_MAX_RETRIES};
use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default timeout for a single HTTP request
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// OpenAI-compatible chat-completions oracle
pub struct OpenAiOracle {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiOracle {
    /// Create a new oracle with an explicit API key
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new oracle reading the API key from `key_env`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Auth`] if the variable is unset or empty.
    pub fn from_env(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        key_env: &str,
    ) -> Result<Self, LlmError> {
        let api_key = std::env::var(key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::Auth(format!("{} is not set", key_env)))?;
        Self::new(endpoint, model, api_key)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Send a structured-output request
    ///
    /// # Errors
    ///
    /// - [`LlmError::Auth`] on 401/403
    /// - [`LlmError::ModelNotAvailable`] on 404
    /// - [`LlmError::RateLimitExceeded`] when 429 persists through all retries
    /// - [`LlmError::InvalidResponse`] when the reply carries no content or a refusal
    pub async fn complete_async(&self, request: &OracleRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let schema: serde_json::Value = serde_json::from_str(&request.schema)
            .map_err(|e| LlmError::Other(format!("Schema is not valid JSON: {}", e)))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.instructions,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema_name,
                    strict: true,
                    schema,
                },
            },
            temperature: 0.1,
            max_completion_tokens: request.max_output_tokens,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            debug!(schema = %request.schema_name, attempt = attempts + 1, "Calling chat completions");
            match self.send(&url, &body).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_transient() => last_error = Some(e),
                Err(e) => return Err(e),
            }

            attempts += 1;
            if attempts < self.max_retries {
                warn!(attempt = attempts, "Chat completion failed, retrying");
                tokio::time::sleep(backoff_delay(attempts)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    async fn send(&self, url: &str, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(LlmError::Auth(format!("HTTP {}", status)));
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(LlmError::ModelNotAvailable(self.model.clone()));
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimitExceeded),
            s if s.is_server_error() => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(LlmError::Communication(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(LlmError::InvalidResponse(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        content_of(parsed)
    }
}

fn content_of(response: ChatResponse) -> Result<String, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(LlmError::InvalidResponse(format!("Model refused: {}", refusal)));
    }

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(LlmError::InvalidResponse(format!(
            "Response has no content (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

impl CompletionOracle for OpenAiOracle {
    type Error = LlmError;

    fn complete(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        block_on(self.complete_async(request))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_oracle_creation() {
        let oracle = OpenAiOracle::new("https://example.test/", "gpt-4o", "key").unwrap();
        assert_eq!(oracle.endpoint, "https://example.test");
        assert_eq!(oracle.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_from_env_requires_key() {
        let result = OpenAiOracle::from_env(DEFAULT_ENDPOINT, "gpt-4o", "CLAUSEFLOW_TEST_UNSET_KEY");
        assert!(matches!(result, Err(LlmError::Auth(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "clause_boundaries",
                    strict: true,
                    schema: serde_json::json!({"type": "object"}),
                },
            },
            temperature: 0.1,
            max_completion_tokens: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "clause_boundaries");
        assert!(value.get("max_completion_tokens").is_none());
    }

    #[test]
    fn test_content_extraction() {
        let ok: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"{\"sections\":[]}"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(content_of(ok).unwrap(), r#"{"sections":[]}"#);

        let null: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null},"finish_reason":"length"}]}"#,
        )
        .unwrap();
        let err = content_of(null).unwrap_err();
        assert!(err.to_string().contains("length"));

        let refused: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null,"refusal":"no"}}]}"#,
        )
        .unwrap();
        assert!(matches!(content_of(refused), Err(LlmError::InvalidResponse(_))));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(content_of(empty).is_err());
    }
}
