//! Service configuration.
//!
//! `config/default.toml` (relative to the working directory) is optional;
//! every field has a built-in default. `MOLTY_STORAGE_DIR`,
//! `MOLTY_LOG_LEVEL` and `MOLTY_BIND` override the file.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the store API binds to.
    pub bind: String,
}

/// Durable storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `profiles.yaml` and `settings.yaml` (already expanded, no `~`).
    pub dir: PathBuf,
}

/// Vendor endpoints and request limits used by the LLM adapter.
///
/// The endpoints are the vendors' fixed URLs in production; they are
/// configurable so tests and proxies can redirect them.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Default chat-completions URL for `openai` (and `custom` without a base URL).
    pub openai_url: String,
    /// Messages URL for `anthropic`.
    pub anthropic_url: String,
    /// OpenAI-compatible chat-completions URL for `google`.
    pub google_url: String,
    /// Value of the `anthropic-version` header.
    pub anthropic_version: String,
    /// Output token bound sent to `anthropic`.
    pub max_tokens: u32,
    /// Per-request HTTP timeout. `None` keeps the transport default.
    pub timeout_seconds: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        RawLlm::default().into()
    }
}

/// Social service client configuration.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    pub base_url: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self { base_url: default_social_base_url() }
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Append logs here instead of stderr.
    pub log_file: Option<PathBuf>,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub social: SocialConfig,
}

/// Values that take precedence over the TOML file.
///
/// [`load`] fills this from the environment; tests build it directly
/// instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    pub storage_dir: Option<&'a str>,
    pub log_level: Option<&'a str>,
    pub bind: Option<&'a str>,
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    social: RawSocial,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level(), log_file: None }
    }
}

#[derive(Deserialize)]
struct RawStorage {
    #[serde(default = "default_storage_dir")]
    dir: String,
}

impl Default for RawStorage {
    fn default() -> Self {
        Self { dir: default_storage_dir() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(default = "default_openai_url")]
    openai_url: String,
    #[serde(default = "default_anthropic_url")]
    anthropic_url: String,
    #[serde(default = "default_google_url")]
    google_url: String,
    #[serde(default = "default_anthropic_version")]
    anthropic_version: String,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            openai_url: default_openai_url(),
            anthropic_url: default_anthropic_url(),
            google_url: default_google_url(),
            anthropic_version: default_anthropic_version(),
            max_tokens: default_max_tokens(),
            timeout_seconds: None,
        }
    }
}

impl From<RawLlm> for LlmConfig {
    fn from(raw: RawLlm) -> Self {
        Self {
            openai_url: raw.openai_url,
            anthropic_url: raw.anthropic_url,
            google_url: raw.google_url,
            anthropic_version: raw.anthropic_version,
            max_tokens: raw.max_tokens,
            timeout_seconds: raw.timeout_seconds,
        }
    }
}

#[derive(Deserialize)]
struct RawSocial {
    #[serde(default = "default_social_base_url")]
    base_url: String,
}

impl Default for RawSocial {
    fn default() -> Self {
        Self { base_url: default_social_base_url() }
    }
}

fn default_bind() -> String { "127.0.0.1:3001".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_storage_dir() -> String { "~/.molty-way/storage".to_string() }
fn default_openai_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_anthropic_url() -> String { "https://api.anthropic.com/v1/messages".to_string() }
fn default_google_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions".to_string()
}
fn default_anthropic_version() -> String { "2023-06-01".to_string() }
fn default_max_tokens() -> u32 { 1024 }
fn default_social_base_url() -> String { "https://www.moltbook.com/api/v1".to_string() }

/// Load config from `config/default.toml` (if present), then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let storage_dir = env::var("MOLTY_STORAGE_DIR").ok();
    let log_level = env::var("MOLTY_LOG_LEVEL").ok();
    let bind = env::var("MOLTY_BIND").ok();
    let overrides = Overrides {
        storage_dir: storage_dir.as_deref(),
        log_level: log_level.as_deref(),
        bind: bind.as_deref(),
    };

    let path = Path::new("config/default.toml");
    if path.exists() {
        load_from(path, &overrides)
    } else {
        Ok(resolve(RawConfig::default(), &overrides))
    }
}

/// Internal loader: accepts an explicit path and overrides.
pub fn load_from(path: &Path, overrides: &Overrides<'_>) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(resolve(parsed, overrides))
}

fn resolve(parsed: RawConfig, overrides: &Overrides<'_>) -> Config {
    let storage_dir = overrides.storage_dir.unwrap_or(&parsed.storage.dir);
    let log_level = overrides.log_level.unwrap_or(&parsed.server.log_level).to_string();
    let bind = overrides.bind.unwrap_or(&parsed.server.bind).to_string();

    Config {
        log_level,
        log_file: parsed.server.log_file.as_deref().map(expand_home),
        server: ServerConfig { bind },
        storage: StorageConfig { dir: expand_home(storage_dir) },
        llm: parsed.llm.into(),
        social: SocialConfig { base_url: parsed.social.base_url },
    }
}

/// `~` and `~/rest` resolve against the home directory; anything else,
/// or a `~` with no known home, is taken literally.
pub fn expand_home(path: &str) -> PathBuf {
    let home_relative = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };
    match (home_relative, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[server]
bind = "127.0.0.1:4000"
log_level = "warn"

[storage]
dir = "/tmp/molty-storage"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:4000");
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.storage.dir, PathBuf::from("/tmp/molty-storage"));
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:3001");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.llm.anthropic_version, "2023-06-01");
        assert!(cfg.llm.timeout_seconds.is_none());
        assert_eq!(cfg.social.base_url, "https://www.moltbook.com/api/v1");
        assert!(cfg.storage.dir.ends_with(".molty-way/storage"));
    }

    #[test]
    fn llm_section_overrides_endpoints() {
        let f = write_toml(
            r#"
[llm]
openai_url = "http://localhost:9000/v1/chat/completions"
max_tokens = 256
timeout_seconds = 30
"#,
        );
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.openai_url, "http://localhost:9000/v1/chat/completions");
        assert_eq!(cfg.llm.max_tokens, 256);
        assert_eq!(cfg.llm.timeout_seconds, Some(30));
        assert_eq!(cfg.llm.anthropic_url, "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn overrides_take_precedence() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = Overrides {
            storage_dir: Some("/tmp/other"),
            log_level: Some("debug"),
            bind: Some("0.0.0.0:3001"),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.storage.dir, PathBuf::from("/tmp/other"));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.server.bind, "0.0.0.0:3001");
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[server\nbind = ");
        let msg = load_from(f.path(), &Overrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &Overrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(expand_home("~/.molty-way/storage"), home.join(".molty-way/storage"));
        assert_eq!(expand_home("~"), home);
    }

    #[test]
    fn non_home_paths_are_literal() {
        assert_eq!(expand_home("/var/lib/molty"), PathBuf::from("/var/lib/molty"));
        assert_eq!(expand_home("storage"), PathBuf::from("storage"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }
}
