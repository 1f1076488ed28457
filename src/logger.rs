//! tracing-subscriber setup.
//!
//! [`init`] runs once in `main`, after the config is resolved. There is no
//! bootstrap subscriber; nothing is logged before the config is loaded.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Install the global subscriber.
///
/// `level` is a plain level (`"info"`) or a full directive such as
/// `"molty_way=debug,tower_http=info"`. `RUST_LOG` wins when set and valid.
/// Output goes to `log_file` (appended) or stderr.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = filter_for(level)?;
    let writer = match log_file {
        Some(path) => append_to(path)?,
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| AppError::Logger(format!("subscriber already installed: {e}")))
}

fn filter_for(level: &str) -> Result<EnvFilter, AppError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logger(format!("invalid log filter '{level}': {e}")))
}

fn append_to(path: &Path) -> Result<BoxMakeWriter, AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::Logger(format!("cannot open log file {}: {e}", path.display())))?;
    Ok(BoxMakeWriter::new(file))
}
