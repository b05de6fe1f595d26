//! Client for `/chat/completions`-style language model APIs

use std::time::Instant;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stockast_config::CompletionConfig;
use stockast_core::http_client;
use stockast_telemetry::metrics;

use crate::error::{ChatError, Result};

const SERVICE: &str = "completion";

const SUMMARY_PROMPT: &str = "Summarize the following text concisely and accurately";

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    role: Option<String>,
    content: Option<String>,
}

/// Chat-completion client
pub struct CompletionClient {
    client: Client,
    completions_url: String,
    api_key: SecretString,
    summary_model: String,
    chat_model: String,
}

impl CompletionClient {
    /// Create from the `[completion]` section
    pub fn new(config: &CompletionConfig) -> Self {
        let base = config.base_url.as_str().trim_end_matches('/');

        Self {
            client: http_client(),
            completions_url: format!("{base}/chat/completions"),
            api_key: config.api_key.clone(),
            summary_model: config.summary_model.clone(),
            chat_model: config.chat_model.clone(),
        }
    }

    /// Model used for free-form chat
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Model used for summaries and podcast scripts
    pub fn summary_model(&self) -> &str {
        &self.summary_model
    }

    /// Summarize `text` with the summary model
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let messages = [ChatMessage::system(SUMMARY_PROMPT), ChatMessage::user(text)];
        let reply = self.complete(&self.summary_model, &messages).await?;
        Ok(reply.content)
    }

    /// Run one completion and return the first choice
    ///
    /// A response without a first choice or without text content is an
    /// invalid response, not an empty answer.
    pub async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatMessage> {
        let started = Instant::now();
        let result = self.send(model, messages).await;
        metrics::observe(SERVICE, started, &result);
        result
    }

    async fn send(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatMessage> {
        tracing::debug!(model, messages = messages.len(), "completion request");

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&CompletionRequest { model, messages })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                ChatError::upstream(SERVICE, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "completion provider returned error");
            return Err(ChatError::upstream(SERVICE, format!("status {status}")));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::invalid(SERVICE, e.to_string()))?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ChatError::invalid(SERVICE, "no choices in response"))?;

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChatError::invalid(SERVICE, "first choice has no content"))?;

        Ok(ChatMessage {
            role: message.role.unwrap_or_else(|| "assistant".to_owned()),
            content,
        })
    }
}
