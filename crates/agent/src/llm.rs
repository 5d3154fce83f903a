//! Chat-completion client. The wire format is the OpenAI-compatible
//! `/chat/completions` shape; the gateway authenticates with an `api-key`
//! header rather than a bearer token.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use compass_core::config::LlmConfig;
use compass_core::dialogue::states::{ChatMessage, ChatRole};

#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// One completion round-trip: system prompt plus the ordered message
    /// history (current user message last).
    async fn complete(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

fn role_tag(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("failed to build chat-completion HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("api-key", api_key.expose_secret());
        }

        let response = builder.send().await.context("chat-completion request failed")?;
        let response =
            response.error_for_status().context("chat-completion endpoint returned an error")?;
        let payload: CompletionResponse =
            response.json().await.context("chat-completion response was not valid JSON")?;

        let reply = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("chat-completion response contained no usable choice"))?;

        Ok(reply)
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChatClient {
    async fn complete(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage { role: "system", content: system_prompt });
        for message in history {
            messages.push(WireMessage { role: role_tag(message.role), content: &message.content });
        }
        let request = CompletionRequest { model: &self.model, messages };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
            }
            match self.send(&request).await {
                Ok(reply) => return Ok(reply),
                Err(error) => {
                    tracing::warn!(
                        event_name = "chat_completion_attempt_failed",
                        attempt,
                        error = %error,
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("chat completion failed with no attempts made")))
    }
}
