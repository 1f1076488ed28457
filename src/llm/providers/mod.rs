//! LLM provider implementations.
//!
//! `build(settings, config, client)` is the factory, called once per request
//! with the settings read from the store and the adapter's shared client. Adding a new backend = new module + new
//! match arm.

pub mod anthropic;
pub mod openai_compatible;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError, ProviderKind};
use crate::store::Settings;

/// Construct the provider for `settings`.
///
/// | provider            | endpoint                                  | dialect           |
/// |---------------------|-------------------------------------------|-------------------|
/// | `openai` / `custom` | `base_url`, else `config.openai_url`      | chat completions  |
/// | `anthropic`         | `config.anthropic_url`                    | messages          |
/// | `google`            | `config.google_url`                       | chat completions  |
pub fn build(settings: &Settings, config: &LlmConfig, client: Client) -> LlmProvider {
    match settings.provider {
        ProviderKind::OpenAi | ProviderKind::Custom => {
            let url = settings
                .base_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(&config.openai_url)
                .to_string();
            LlmProvider::OpenAiCompatible(openai_compatible::OpenAiCompatibleProvider::new(
                client,
                url,
                settings.model.clone(),
                settings.api_key.clone(),
            ))
        }
        ProviderKind::Google => {
            LlmProvider::OpenAiCompatible(openai_compatible::OpenAiCompatibleProvider::new(
                client,
                config.google_url.clone(),
                settings.model.clone(),
                settings.api_key.clone(),
            ))
        }
        ProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicProvider::new(
            client,
            config.anthropic_url.clone(),
            settings.model.clone(),
            settings.api_key.clone(),
            config.anthropic_version.clone(),
            config.max_tokens,
        )),
    }
}

/// The one HTTP client an [`LlmAdapter`](crate::llm::LlmAdapter) shares across requests.
pub(crate) fn http_client(timeout_seconds: Option<u64>) -> Result<Client, ProviderError> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(|e| ProviderError::Client(e.to_string()))
}

// Error envelope shared by OpenAI, Gemini's compatibility layer and Anthropic:
// `{"error": {"message": "..."}}` (Anthropic adds a top-level `type`).
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a transport failure to a [`ProviderError`], keeping reqwest's text.
fn transport_error(url: &str, e: reqwest::Error) -> ProviderError {
    error!(%url, error = %e, timeout = e.is_timeout(), "LLM HTTP request failed (transport)");
    ProviderError::Transport(e.to_string())
}

/// Consume the response and return it if successful, or a structured error.
///
/// The vendor's `error.message` is preferred; bodies without one fall back
/// to a generic status line.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) if !env.error.message.is_empty() => env.error.message,
        _ => format!("request failed with status {status}"),
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Api { status: status.as_u16(), message })
}
