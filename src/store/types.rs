//! Document types persisted by the store and exchanged over `/api/*`.
//!
//! Field names are camelCase on the wire and on disk so the browser client
//! and hand-edited YAML see the same shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ProviderKind;

/// One managed agent identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Generated once at creation; never changes.
    pub id: String,
    pub name: String,
    /// Bearer credential for the social service. Stored and forwarded as-is.
    pub api_key: String,
    /// LLM system instruction used when drafting replies. May be empty.
    #[serde(default)]
    pub system_prompt: String,
    /// Milliseconds since the Unix epoch; set once at creation.
    pub created_at: i64,
}

/// Fields supplied by the client when adding a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    pub api_key: String,
    #[serde(default)]
    pub system_prompt: String,
}

impl NewProfile {
    /// Assign a fresh identifier and creation timestamp.
    pub fn into_profile(self) -> Profile {
        Profile {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            api_key: self.api_key,
            system_prompt: self.system_prompt,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Partial update of the user-editable profile fields.
///
/// `id` and `created_at` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(api_key) = self.api_key {
            profile.api_key = api_key;
        }
        if let Some(system_prompt) = self.system_prompt {
            profile.system_prompt = system_prompt;
        }
    }
}

/// The single active LLM provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    /// Endpoint override. Used by `custom` (and honoured by `openai`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_uses_camel_case_fields() {
        let p = Profile {
            id: "p1".into(),
            name: "Molty".into(),
            api_key: "moltbook_sk_1".into(),
            system_prompt: "Be kind".into(),
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["apiKey"], "moltbook_sk_1");
        assert_eq!(json["systemPrompt"], "Be kind");
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn new_profile_gets_unique_ids() {
        let draft = NewProfile { name: "a".into(), api_key: "k".into(), system_prompt: String::new() };
        let a = draft.clone().into_profile();
        let b = draft.into_profile();
        assert_ne!(a.id, b.id);
        assert!(a.created_at > 0);
    }

    #[test]
    fn update_only_touches_present_fields() {
        let mut p = NewProfile { name: "a".into(), api_key: "k".into(), system_prompt: "s".into() }
            .into_profile();
        let before = p.clone();
        ProfileUpdate { name: Some("b".into()), ..Default::default() }.apply(&mut p);
        assert_eq!(p.name, "b");
        assert_eq!(p.api_key, before.api_key);
        assert_eq!(p.system_prompt, before.system_prompt);
        assert_eq!(p.id, before.id);
        assert_eq!(p.created_at, before.created_at);
    }

    #[test]
    fn settings_omit_absent_base_url() {
        let s = Settings {
            provider: ProviderKind::OpenAi,
            api_key: "sk".into(),
            model: "gpt-4o".into(),
            base_url: None,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["provider"], "openai");
        assert!(json.get("baseUrl").is_none());
    }
}
