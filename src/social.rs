//! Client for the social service's agent API.
//!
//! Every call is authenticated with the calling profile's key as a bearer
//! token; the key is never inspected. Responses are typed where the drafting
//! flow needs them (DMs, conversations, posts) and passed through as raw
//! JSON otherwise.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::Message;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("social service request failed: {0}")]
    Transport(String),
    #[error("social service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected social service response: {0}")]
    Decode(String),
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submolt {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub submolt: Submolt,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmRequest {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub other_party: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub message: String,
    #[serde(default)]
    pub created_at: String,
}

impl From<&DirectMessage> for Message {
    fn from(dm: &DirectMessage) -> Self {
        Message::new(dm.from.clone(), dm.message.clone())
    }
}

#[derive(Deserialize)]
struct RequestsEnvelope {
    #[serde(default)]
    requests: Vec<DmRequest>,
}

#[derive(Deserialize)]
struct ConversationsEnvelope {
    #[serde(default)]
    conversations: Vec<Conversation>,
}

#[derive(Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    messages: Vec<DirectMessage>,
}

#[derive(Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    posts: Vec<Post>,
}

// ── Client ────────────────────────────────────────────────────────────────────

pub const DEFAULT_FEED_SORT: &str = "new";
pub const DEFAULT_FEED_LIMIT: u32 = 25;

#[derive(Debug, Clone)]
pub struct SocialClient {
    client: Client,
    base_url: String,
}

impl SocialClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, api_key: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(api_key)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, SocialError> {
        let response = req.send().await.map_err(|e| {
            warn!(%path, error = %e, "social service request failed (transport)");
            SocialError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%path, %status, "social service returned HTTP error");
            return Err(SocialError::Status { status: status.as_u16(), body });
        }
        debug!(%path, %status, "social service response");

        response
            .json::<T>()
            .await
            .map_err(|e| SocialError::Decode(format!("{path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, api_key: &str) -> Result<T, SocialError> {
        self.send(self.request(Method::GET, path, api_key), path).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        body: Option<Value>,
    ) -> Result<T, SocialError> {
        let mut req = self.request(Method::POST, path, api_key);
        if let Some(body) = body {
            req = req.json(&body);
        }
        self.send(req, path).await
    }

    /// `GET /agents/status`
    pub async fn status(&self, api_key: &str) -> Result<Value, SocialError> {
        self.get("/agents/status", api_key).await
    }

    /// `GET /agents/me`
    pub async fn me(&self, api_key: &str) -> Result<Value, SocialError> {
        self.get("/agents/me", api_key).await
    }

    /// `GET /agents/dm/check`
    pub async fn dm_check(&self, api_key: &str) -> Result<Value, SocialError> {
        self.get("/agents/dm/check", api_key).await
    }

    /// Pending DM requests; empty when the service omits the list.
    pub async fn dm_requests(&self, api_key: &str) -> Result<Vec<DmRequest>, SocialError> {
        let env: RequestsEnvelope = self.get("/agents/dm/requests", api_key).await?;
        Ok(env.requests)
    }

    pub async fn approve_dm_request(
        &self,
        api_key: &str,
        conversation_id: &str,
    ) -> Result<Value, SocialError> {
        let path = format!("/agents/dm/requests/{conversation_id}/approve");
        self.post(&path, api_key, None).await
    }

    pub async fn conversations(&self, api_key: &str) -> Result<Vec<Conversation>, SocialError> {
        let env: ConversationsEnvelope = self.get("/agents/dm/conversations", api_key).await?;
        Ok(env.conversations)
    }

    /// Messages of one conversation, oldest first as served.
    pub async fn conversation(
        &self,
        api_key: &str,
        conversation_id: &str,
    ) -> Result<Vec<DirectMessage>, SocialError> {
        let path = format!("/agents/dm/conversations/{conversation_id}");
        let env: MessagesEnvelope = self.get(&path, api_key).await?;
        Ok(env.messages)
    }

    pub async fn send_dm(
        &self,
        api_key: &str,
        conversation_id: &str,
        message: &str,
    ) -> Result<Value, SocialError> {
        let path = format!("/agents/dm/conversations/{conversation_id}/send");
        self.post(&path, api_key, Some(json!({ "message": message }))).await
    }

    /// `GET /feed?sort=..&limit=..`; see [`DEFAULT_FEED_SORT`] / [`DEFAULT_FEED_LIMIT`].
    pub async fn feed(&self, api_key: &str, sort: &str, limit: u32) -> Result<Vec<Post>, SocialError> {
        let req = self
            .request(Method::GET, "/feed", api_key)
            .query(&[("sort", sort.to_string()), ("limit", limit.to_string())]);
        let env: FeedEnvelope = self.send(req, "/feed").await?;
        Ok(env.posts)
    }

    pub async fn create_post(
        &self,
        api_key: &str,
        submolt: &str,
        title: &str,
        content: &str,
    ) -> Result<Value, SocialError> {
        let body = json!({ "submolt": submolt, "title": title, "content": content });
        self.post("/posts", api_key, Some(body)).await
    }
}
