//! Axum handlers for `/api/*` routes.
//!
//! Store handlers never fail: the repository has already turned storage
//! faults into empty results or logged no-op writes, so POSTs always
//! acknowledge with `{"success": true}`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use super::AppState;
use crate::draft::{self, DraftError, DraftSource};
use crate::store::{Profile, Settings};

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

fn ack() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    Json(json!({ "status": "ok", "store": state.repo.store_type() })).into_response()
}

/// GET /api/profiles
pub(super) async fn get_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.repo.read_profiles().await)
}

/// POST /api/profiles: replaces the stored collection wholesale.
pub(super) async fn post_profiles(
    State(state): State<AppState>,
    Json(profiles): Json<Vec<Profile>>,
) -> Response {
    state.repo.write_profiles(profiles).await;
    ack().into_response()
}

/// GET /api/settings: `null` when nothing is stored.
pub(super) async fn get_settings(State(state): State<AppState>) -> Json<Option<Settings>> {
    Json(state.repo.read_settings().await)
}

/// POST /api/settings: replaces the stored singleton.
pub(super) async fn post_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Response {
    state.repo.write_settings(settings).await;
    ack().into_response()
}

/// POST /api/profiles/{id}/draft
pub(super) async fn draft(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(source): Json<DraftSource>,
) -> Response {
    match draft::draft_reply(&state.repo, &state.social, &state.llm, &profile_id, source).await {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))).into_response(),
        Err(e @ DraftError::UnknownProfile(_)) => {
            (StatusCode::NOT_FOUND, json_error("not_found", e)).into_response()
        }
        Err(e @ DraftError::NotConfigured) => {
            (StatusCode::CONFLICT, json_error("not_configured", e)).into_response()
        }
        Err(e @ DraftError::Social(_)) => {
            warn!(%profile_id, "draft: social service failed: {e}");
            (StatusCode::BAD_GATEWAY, json_error("social", e)).into_response()
        }
        Err(e @ DraftError::Provider(_)) => {
            warn!(%profile_id, "draft: LLM provider failed: {e}");
            (StatusCode::BAD_GATEWAY, json_error("provider", e)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::super::{AppState, build_router};
    use crate::config::LlmConfig;
    use crate::llm::LlmAdapter;
    use crate::social::SocialClient;
    use crate::store::{MemoryStore, Repository, YamlFileStore};

    fn state_with(repo: Repository) -> AppState {
        let llm = LlmAdapter::new(LlmConfig::default()).unwrap();
        AppState::new(Arc::new(repo), SocialClient::new("http://127.0.0.1:9"), llm)
    }

    fn memory_state() -> AppState {
        state_with(Repository::new(Arc::new(MemoryStore::new())))
    }

    async fn call(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
        let resp = build_router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_store_type() {
        let (status, body) = call(memory_state(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn profiles_default_to_empty_list() {
        let (status, body) = call(memory_state(), get("/api/profiles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn settings_default_to_null() {
        let (status, body) = call(memory_state(), get("/api/settings")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn profiles_post_then_get_round_trips() {
        let state = memory_state();
        let profiles = serde_json::json!([
            { "id": "a", "name": "Alpha", "apiKey": "ka", "systemPrompt": "", "createdAt": 1 },
            { "id": "b", "name": "Beta", "apiKey": "kb", "systemPrompt": "Be brief", "createdAt": 2 }
        ]);
        let (status, body) = call(state.clone(), post_json("/api/profiles", &profiles)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = call(state, get("/api/profiles")).await;
        assert_eq!(body, profiles);
    }

    #[tokio::test]
    async fn settings_post_then_get_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Repository::new(Arc::new(YamlFileStore::new(dir.path()))));
        let settings = serde_json::json!({
            "provider": "custom",
            "apiKey": "sk-local",
            "model": "llama3",
            "baseUrl": "http://localhost:11434/v1/chat/completions"
        });
        let (status, _) = call(state.clone(), post_json("/api/settings", &settings)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(dir.path().join("settings.yaml").exists());

        let (_, body) = call(state, get("/api/settings")).await;
        assert_eq!(body, settings);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let req = Request::post("/api/profiles")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = build_router(memory_state()).oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn draft_without_settings_conflicts() {
        let state = memory_state();
        let body = serde_json::json!({ "history": [] });
        let (status, body) = call(state, post_json("/api/profiles/anyone/draft", &body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "not_configured");
    }

    #[tokio::test]
    async fn draft_for_unknown_profile_is_not_found() {
        let state = memory_state();
        let settings = serde_json::json!({ "provider": "openai", "apiKey": "sk", "model": "gpt-4o" });
        call(state.clone(), post_json("/api/settings", &settings)).await;

        let body = serde_json::json!({ "history": [] });
        let (status, body) = call(state, post_json("/api/profiles/ghost/draft", &body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
