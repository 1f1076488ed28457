//! Axum HTTP server exposing the store under `/api/`.
//!
//! `run()` drives the axum event loop; the [`CancellationToken`] is wired to
//! axum's graceful shutdown. No authentication: the listener is meant for
//! the local machine only. CORS is permissive so the browser client can
//! call it from its own origin.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! GET  /api/profiles             → [Profile]
//! POST /api/profiles             ← [Profile]   (replaces the collection)
//! GET  /api/settings             → Settings | null
//! POST /api/settings             ← Settings    (replaces the singleton)
//! POST /api/profiles/{id}/draft  ← {history} | {conversationId}
//! ```

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::AppError;
use crate::llm::LlmAdapter;
use crate::social::SocialClient;
use crate::store::Repository;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: the repository is reference-counted and both HTTP
/// clients share their pools.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub social: SocialClient,
    pub llm: LlmAdapter,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, social: SocialClient, llm: LlmAdapter) -> Self {
        Self { repo, social, llm }
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(
    bind_addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;
    serve(listener, state, shutdown).await
}

/// Serve on an already-bound listener (tests bind `127.0.0.1:0`).
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("listener address: {e}")))?;
    info!(%local_addr, store = %state.repo.store_type(), "store API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("store API shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health",              get(api::health))
        .route("/api/profiles",            get(api::get_profiles).post(api::post_profiles))
        .route("/api/settings",            get(api::get_settings).post(api::post_settings))
        .route("/api/profiles/{id}/draft", post(api::draft))
        .layer(cors)
        .with_state(state)
}
