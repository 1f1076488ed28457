//! Anthropic messages provider (`/v1/messages`).
//!
//! The system instruction travels in the top-level `system` field, never as
//! a message. Authentication is the raw key in `x-api-key` plus the
//! `anthropic-version` header.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use super::{check_status, transport_error};
use crate::llm::{Message, ProviderError};

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    version: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(
        client: Client,
        url: String,
        model: String,
        api_key: String,
        version: String,
        max_tokens: u32,
    ) -> Self {
        Self { client, url, model, api_key, version, max_tokens }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    fn build_request<'a>(&'a self, system: &'a str, history: &'a [Message]) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            system,
            messages: history
                .iter()
                .map(|m| WireMessage { role: m.role().as_str(), content: &m.text })
                .collect(),
            max_tokens: self.max_tokens,
        }
    }

    /// One round-trip; returns the first content block's text.
    pub async fn complete(&self, system: &str, history: &[Message]) -> Result<String, ProviderError> {
        let payload = self.build_request(system, history);

        debug!(url = %self.url, model = %self.model, messages = payload.messages.len(), "sending Anthropic messages request");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.version)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        let response = check_status(response).await?;

        let parsed = response.json::<MessagesResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize Anthropic response");
            ProviderError::Response(format!("failed to parse response body: {e}"))
        })?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::Response("no text content block in response".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
