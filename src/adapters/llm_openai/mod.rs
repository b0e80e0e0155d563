// OpenAI-compatible chat-completions adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::ports::*;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for the chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    /// Explicit key; falls back to `OPENAI_API_KEY` at call time
    pub api_key: Option<String>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            request_timeout: Duration::from_secs(120),
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Text completion over an OpenAI-compatible HTTP API
pub struct OpenAiCompletionAdapter {
    client: reqwest::Client,
    settings: ChatSettings,
}

impl OpenAiCompletionAdapter {
    /// Create new adapter; no key is required until the first request
    pub fn new(settings: ChatSettings) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| {
                DomainError::ModelUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn resolve_api_key(&self) -> Result<String, DomainError> {
        self.settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                DomainError::ModelUnavailable(format!(
                    "No API key configured; set {} or llm.api_key",
                    API_KEY_ENV
                ))
            })
    }

    fn transport_error(&self, err: reqwest::Error) -> DomainError {
        if err.is_timeout() {
            DomainError::Timeout(format!(
                "Model request exceeded {}s",
                self.settings.request_timeout.as_secs()
            ))
        } else {
            DomainError::ModelUnavailable(format!("Model request failed: {}", err))
        }
    }
}

#[async_trait]
impl TextCompletionPort for OpenAiCompletionAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let api_key = self.resolve_api_key()?;
        let request = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(DomainError::ModelUnavailable(format!(
                "Model API error ({}): {}",
                status, body
            )));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                DomainError::ModelUnavailable(format!("Malformed model API response: {}", e))
            }
        })?;

        // A reply without text is a format problem, not a transport one.
        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let adapter = OpenAiCompletionAdapter::new(ChatSettings {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ChatSettings::default()
        })
        .unwrap();
        assert_eq!(adapter.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_explicit_key_wins() {
        let adapter = OpenAiCompletionAdapter::new(ChatSettings {
            api_key: Some("sk-test".to_string()),
            ..ChatSettings::default()
        })
        .unwrap();
        assert_eq!(adapter.resolve_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            temperature: 0.0,
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_response_without_content_parses() {
        let reply: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(reply.choices[0].message.content.is_none());
    }
}
