//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Serves `openai`, `custom` and `google` (Gemini's OpenAI-compatible
//! endpoint). All wire types are private to this module: callers never see
//! them.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use super::{check_status, transport_error};
use crate::llm::{Message, ProviderError, Role};

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Cheap to clone because `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    /// `api_key` is sent as `Authorization: Bearer <key>` on every request.
    pub fn new(client: Client, url: String, model: String, api_key: String) -> Self {
        Self { client, url, model, api_key }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// System instruction first, then the history in order.
    fn build_request(&self, system: &str, history: &[Message]) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage { role: Role::System.as_str(), content: system.to_string() });
        messages.extend(history.iter().map(|m| WireMessage {
            role: m.role().as_str(),
            content: m.text.clone(),
        }));
        ChatCompletionRequest { model: self.model.clone(), messages }
    }

    /// One round-trip; returns the first choice's message text.
    pub async fn complete(&self, system: &str, history: &[Message]) -> Result<String, ProviderError> {
        let payload = self.build_request(system, history);

        debug!(url = %self.url, model = %payload.model, messages = payload.messages.len(), "sending chat completion request");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize chat completion response");
            ProviderError::Response(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received chat completion response");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Response("no completion content in response".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
