//! OpenAI-compatible chat completion client
//!
//! Used by the fix generator (DeepSeek) and the slogan server (OpenAI).
//! Both vendors accept the same `/chat/completions` request shape.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::join_url;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("GlitchBeat/", env!("CARGO_PKG_VERSION"));

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ChatApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatApiError {
    message: String,
}

/// Sampling options for one completion
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Chat completion API client
#[derive(Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion request and return the first choice's text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "Calling chat completion API");

        let response = self
            .http_client
            .post(join_url(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        if let Some(err) = chat.error {
            return Err(Error::Parse(format!("API error: {}", err.message)));
        }

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Parse("no choices in completion response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::new(
            "https://api.deepseek.com",
            "test_key",
            "deepseek-coder",
            Duration::from_secs(30),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().model(), "deepseek-coder");
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("be funny"), ChatMessage::user("fix it")];
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.9,
            max_tokens: 200,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "fix it");
        assert_eq!(json["max_tokens"], 200);
    }

    #[test]
    fn test_response_with_error_object() {
        let body = r#"{"error": {"message": "quota exceeded", "type": "insufficient_quota"}}"#;
        let chat: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(chat.choices.is_empty());
        assert_eq!(chat.error.unwrap().message, "quota exceeded");
    }
}
