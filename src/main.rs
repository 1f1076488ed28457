//! molty-way: local store service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Create the storage directory and build the YAML-backed repository
//!   5. Serve `/api/*` until Ctrl-C

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use molty_way::error::AppError;
use molty_way::llm::LlmAdapter;
use molty_way::server::{self, AppState};
use molty_way::social::SocialClient;
use molty_way::store::{Repository, YamlFileStore};
use molty_way::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Optional .env file.
    let _ = dotenvy::dotenv();

    let config = config::load()?;

    logger::init(&config.log_level, config.log_file.as_deref())?;

    info!(
        storage_dir = %config.storage.dir.display(),
        bind = %config.server.bind,
        log_level = %config.log_level,
        "config loaded"
    );

    let store = YamlFileStore::new(config.storage.dir.clone());
    store.ensure_dir()?;
    let repo = Arc::new(Repository::new(Arc::new(store)));
    let llm = LlmAdapter::new(config.llm.clone())
        .map_err(|e| AppError::Config(format!("LLM client: {e}")))?;
    let state = AppState::new(repo, SocialClient::new(config.social.base_url.clone()), llm);

    // Ctrl-C cancels the token; the server drains and returns.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received: shutting down");
            ctrlc_token.cancel();
        }
    });

    server::run(&config.server.bind, state, shutdown).await
}
