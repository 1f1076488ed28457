//! Service-level errors: startup, storage backends and the listener.
//!
//! Request-path failures carry their own types ([`ProviderError`],
//! [`SocialError`], [`DraftError`]) so handlers can map them to statuses.
//!
//! [`ProviderError`]: crate::llm::ProviderError
//! [`SocialError`]: crate::social::SocialError
//! [`DraftError`]: crate::draft::DraftError

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Unreadable or unparsable config file.
    #[error("config error: {0}")]
    Config(String),

    /// Bad log filter or unopenable log file.
    #[error("logger error: {0}")]
    Logger(String),

    /// A backend could not read, parse or replace a document. The
    /// repository logs and swallows these.
    #[error("store error: {0}")]
    Store(String),

    /// Bind or serve failure.
    #[error("server error: {0}")]
    Server(String),
}
