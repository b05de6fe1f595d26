use std::time::Instant;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stockast_config::AgentConfig;
use stockast_core::http_client;
use stockast_telemetry::metrics;
use url::Url;

use crate::error::{ChatError, Result};

const SERVICE: &str = "agent";

/// Client for the agent query service
pub struct AgentClient {
    client: Client,
    query_url: Url,
    api_key: SecretString,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: String,
}

impl AgentClient {
    /// Create from the `[agent]` section
    ///
    /// # Errors
    ///
    /// Returns an error if the agent id cannot form a valid URL
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let query_url = config
            .base_url
            .join(&format!("agents/{}/query", config.agent_id))
            .map_err(|e| ChatError::upstream(SERVICE, format!("invalid agent URL: {e}")))?;

        Ok(Self {
            client: http_client(),
            query_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Ask the agent a free-text question and return its raw answer
    pub async fn query(&self, query: &str) -> Result<String> {
        let started = Instant::now();
        let result = self.send(query).await;
        metrics::observe(SERVICE, started, &result);
        result
    }

    async fn send(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(self.query_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "agent request failed");
                ChatError::upstream(SERVICE, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "agent returned error");
            return Err(ChatError::upstream(SERVICE, format!("status {status}")));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| ChatError::invalid(SERVICE, e.to_string()))?;

        tracing::debug!(answer_len = body.result.len(), "agent answered");

        Ok(body.result)
    }
}
