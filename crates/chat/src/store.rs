use std::time::Instant;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use stockast_config::StoreConfig;
use stockast_core::http_client;
use stockast_telemetry::metrics;
use thiserror::Error;
use url::Url;

/// One question/answer turn, written once and never updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLogRecord {
    pub question: String,
    pub answer: String,
    pub created_at: Timestamp,
}

impl ChatLogRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// Chat log write failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Append-only chat log persistence
#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// Append a record, returning the rows echoed back by the store
    async fn append(&self, record: &ChatLogRecord) -> Result<serde_json::Value, StoreError>;
}

/// PostgREST-backed store (`POST {url}/rest/v1/{table}`)
pub struct RestChatLogStore {
    client: Client,
    table_url: Url,
    api_key: SecretString,
}

impl RestChatLogStore {
    /// Create from the `[store]` section
    ///
    /// # Errors
    ///
    /// Returns an error if the table name cannot form a valid URL
    pub fn new(config: &StoreConfig) -> Result<Self, url::ParseError> {
        let table_url = config.url.join(&format!("rest/v1/{}", config.table))?;

        Ok(Self {
            client: http_client(),
            table_url,
            api_key: config.api_key.clone(),
        })
    }

    async fn send(&self, record: &ChatLogRecord) -> Result<serde_json::Value, StoreError> {
        let key = self.api_key.expose_secret();

        let response = self
            .client
            .post(self.table_url.clone())
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // An empty body is valid when the store ignores `Prefer`
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl ChatLogStore for RestChatLogStore {
    async fn append(&self, record: &ChatLogRecord) -> Result<serde_json::Value, StoreError> {
        let started = Instant::now();
        let result = self.send(record).await;
        metrics::observe("store", started, &result);
        result
    }
}
