//! Reply drafting: ties a stored profile, the stored settings and a
//! conversation history together and asks the LLM adapter for a reply.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::llm::{LlmAdapter, Message, ProviderError};
use crate::social::{SocialClient, SocialError};
use crate::store::Repository;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("LLM settings are not configured")]
    NotConfigured,
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
    #[error(transparent)]
    Social(#[from] SocialError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Where the conversation history comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DraftSource {
    /// History supplied by the caller.
    History { history: Vec<Message> },
    /// Fetch the DM conversation from the social service with the profile's key.
    Conversation {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
}

pub async fn draft_reply(
    repo: &Repository,
    social: &SocialClient,
    llm: &LlmAdapter,
    profile_id: &str,
    source: DraftSource,
) -> Result<String, DraftError> {
    let settings = repo.read_settings().await.ok_or(DraftError::NotConfigured)?;
    let profile = repo
        .find_profile(profile_id)
        .await
        .ok_or_else(|| DraftError::UnknownProfile(profile_id.to_string()))?;

    let history = match source {
        DraftSource::History { history } => history,
        DraftSource::Conversation { conversation_id } => social
            .conversation(&profile.api_key, &conversation_id)
            .await?
            .iter()
            .map(Message::from)
            .collect(),
    };

    let reply = llm.generate(&settings, &profile.system_prompt, &history).await?;
    info!(profile_id = %profile.id, provider = settings.provider.as_str(), reply_len = reply.len(), "reply drafted");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::LlmConfig;
    use crate::llm::ProviderKind;
    use crate::store::{MemoryStore, NewProfile, Settings};

    fn adapter() -> LlmAdapter {
        LlmAdapter::new(LlmConfig::default()).unwrap()
    }

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn source_parses_history_or_conversation() {
        let h: DraftSource =
            serde_json::from_str(r#"{"history":[{"sender":"them","text":"Hi"}]}"#).unwrap();
        assert!(matches!(h, DraftSource::History { ref history } if history.len() == 1));

        let c: DraftSource = serde_json::from_str(r#"{"conversationId":"c-42"}"#).unwrap();
        assert!(matches!(c, DraftSource::Conversation { ref conversation_id } if conversation_id == "c-42"));
    }

    #[tokio::test]
    async fn missing_settings_is_not_configured() {
        let repo = repo();
        let p = repo
            .add_profile(NewProfile { name: "a".into(), api_key: "k".into(), system_prompt: String::new() })
            .await;
        let err = draft_reply(
            &repo,
            &SocialClient::new("http://127.0.0.1:9"),
            &adapter(),
            &p.id,
            DraftSource::History { history: vec![] },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DraftError::NotConfigured));
    }

    #[tokio::test]
    async fn unknown_profile_is_reported() {
        let repo = repo();
        repo.write_settings(Settings {
            provider: ProviderKind::OpenAi,
            api_key: "sk".into(),
            model: "gpt-4o".into(),
            base_url: None,
        })
        .await;
        let err = draft_reply(
            &repo,
            &SocialClient::new("http://127.0.0.1:9"),
            &adapter(),
            "ghost",
            DraftSource::History { history: vec![] },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DraftError::UnknownProfile(ref id) if id == "ghost"));
    }
}
