//! LLM request adapter.
//!
//! One call contract, [`LlmAdapter::generate`], over three vendor dialects. The
//! provider selector in [`Settings`] picks the backend; `LlmProvider` is an
//! enum over the concrete implementations in [`providers`].
//!
//! Provider instances are stateless and cheap to clone. Nothing is retried:
//! a transport or vendor failure surfaces once as a [`ProviderError`].

pub mod providers;

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::store::Settings;

/// Sender tag identifying the local agent's own earlier messages.
pub const SELF_SENDER: &str = "me";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx response. `message` is the vendor's own error text when the
    /// body carried one, otherwise a generic status line.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Connection, TLS, timeout or body-read failure.
    #[error("{0}")]
    Transport(String),
    /// 2xx response that did not contain the expected text.
    #[error("unexpected provider response: {0}")]
    Response(String),
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

// ── Provider selector ─────────────────────────────────────────────────────────

/// Which vendor dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    /// Gemini through its OpenAI-compatible endpoint.
    Google,
    /// Any OpenAI-compatible endpoint named by `Settings::base_url`.
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Custom => "custom",
        }
    }
}

// ── Conversation input ────────────────────────────────────────────────────────

/// Chat role on the vendor wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the chronological conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self { sender: sender.into(), text: text.into() }
    }

    /// `assistant` iff the sender is [`SELF_SENDER`]; everyone else is `user`.
    ///
    /// Distinct human correspondents collapse into the single `user` role,
    /// and a correspondent literally named `"me"` would be misread as the
    /// agent itself.
    pub fn role(&self) -> Role {
        if self.sender == SELF_SENDER { Role::Assistant } else { Role::User }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Anthropic(providers::anthropic::AnthropicProvider),
}

impl LlmProvider {
    /// Send the system instruction plus history and return the drafted text.
    pub async fn complete(&self, system: &str, history: &[Message]) -> Result<String, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.complete(system, history).await,
            LlmProvider::Anthropic(p) => p.complete(system, history).await,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.endpoint(),
            LlmProvider::Anthropic(p) => p.endpoint(),
        }
    }
}

/// The request adapter: vendor endpoints plus one pooled HTTP client.
///
/// Build it once at startup and clone it freely; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct LlmAdapter {
    client: Client,
    config: Arc<LlmConfig>,
}

impl LlmAdapter {
    pub fn new(config: LlmConfig) -> Result<Self, ProviderError> {
        let client = providers::http_client(config.timeout_seconds)?;
        Ok(Self { client, config: Arc::new(config) })
    }

    /// Draft one reply for `history` using the provider named in `settings`.
    pub async fn generate(
        &self,
        settings: &Settings,
        system_instruction: &str,
        history: &[Message],
    ) -> Result<String, ProviderError> {
        let provider = providers::build(settings, &self.config, self.client.clone());
        debug!(
            provider = settings.provider.as_str(),
            model = %settings.model,
            endpoint = provider.endpoint(),
            history_len = history.len(),
            "generating reply"
        );
        provider.complete(system_instruction, history).await.inspect_err(|e| {
            warn!(provider = settings.provider.as_str(), error = %e, "LLM request failed");
        })
    }
}
