use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use valet_core::types::{ChatReply, HealthStatus, TelemetrySnapshot};

use crate::error::AgentError;

/// Outbound body of `POST /api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Envelope of `GET /api/status`.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<TelemetrySnapshot>,
    #[serde(default)]
    message: Option<String>,
}

/// Typed HTTP client for the agent service.
pub struct AgentClient {
    client: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    /// Create a new client with the given base URL and per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one chat message and return the parsed reply body.
    ///
    /// Exactly one attempt. Non-2xx statuses and unparsable bodies are
    /// errors; interpreting the reply fields is the session engine's job.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, AgentError> {
        let resp = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Status(status.as_u16()));
        }

        let reply: ChatReply = resp
            .json()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))?;
        debug!(has_action = reply.action.is_some(), "Chat reply received");
        Ok(reply)
    }

    /// Fetch the current telemetry snapshot.
    ///
    /// Accepted only when the envelope reports `success: true` and carries
    /// the full RAM/CPU/GPU data object.
    pub async fn status(&self) -> Result<TelemetrySnapshot, AgentError> {
        let resp = self.client.get(self.url("/api/status")).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Status(status.as_u16()));
        }

        let envelope: StatusEnvelope = resp
            .json()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))?;

        if !envelope.success {
            return Err(AgentError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "status endpoint reported failure".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| AgentError::Malformed("status envelope missing data".to_string()))
    }

    /// Probe the service health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, AgentError> {
        let resp = self.client.get(self.url("/health")).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AgentError::Status(status.as_u16()));
        }

        resp.json()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
