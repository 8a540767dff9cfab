//! Chat-completions wrapper shared by the refinement clients.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use zackly_core::BotError;

const STAGE: &str = "refinement";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// One completion call: fixed system instruction, user text as the payload.
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub user_text: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Thin client over an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send a completion request and return the response text.
    ///
    /// When the response carries no choice content the input text is
    /// returned unchanged.
    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BotError> {
        let body = ChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_text,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, "sending chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BotError::from_outbound(STAGE, e.is_timeout(), self.timeout.as_secs(), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BotError::Transport {
                stage: STAGE,
                message: format!("chat completion returned {status}: {error_body}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| BotError::Transport {
            stage: STAGE,
            message: format!("failed to parse chat completion response: {e}"),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty());

        Ok(content.unwrap_or_else(|| request.user_text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "instruction",
                },
                ChatMessage {
                    role: "user",
                    content: "payload",
                },
            ],
            temperature: 0.3,
            max_tokens: 2000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "payload");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn response_first_choice_content() {
        let parsed: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }))
        .unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("first"));
    }
}
