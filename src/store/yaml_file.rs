//! `yaml_file` store: one human-readable YAML document per resource.
//!
//! Files managed in the storage directory:
//! - `profiles.yaml`: sequence of profiles
//! - `settings.yaml`: settings mapping
//!
//! Writes go to a `.tmp` sibling first and are renamed over the target, so
//! a crash mid-write leaves the previous document intact. The directory is
//! created by [`YamlFileStore::ensure_dir`] at startup and again before
//! every write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use super::Store;
use super::types::{Profile, Settings};
use crate::error::AppError;

const PROFILES_FILENAME: &str = "profiles.yaml";
const SETTINGS_FILENAME: &str = "settings.yaml";

pub struct YamlFileStore {
    dir: PathBuf,
}

impl YamlFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILENAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILENAME)
    }

    /// Create the storage directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Store(format!("cannot create {}: {e}", self.dir.display())))
    }

    /// Read a document, `None` when the file does not exist.
    fn read_document(path: &Path) -> Result<Option<String>, AppError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Store(format!("cannot read {}: {e}", path.display()))),
        }
    }

    fn write_document<T: Serialize + ?Sized>(&self, path: &Path, doc: &T) -> Result<(), AppError> {
        self.ensure_dir()?;

        let text = serde_yaml::to_string(doc)
            .map_err(|e| AppError::Store(format!("serialise {}: {e}", path.display())))?;

        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, text)
            .map_err(|e| AppError::Store(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::Store(format!("cannot replace {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "document replaced");
        Ok(())
    }
}

/// Parse the profile document.
///
/// Accepts a sequence (the normal shape), an empty document, or a single
/// mapping left behind by a legacy or hand-edited file, which is wrapped
/// into a one-element collection. Entries of a sequence are decoded one by
/// one; an entry that does not decode is skipped with a warning and the
/// rest are kept.
fn parse_profiles(text: &str, path: &Path) -> Result<Vec<Profile>, AppError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::Store(format!("malformed {}: {e}", path.display())))?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(entries) => Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_yaml::from_value::<Profile>(entry) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(path = %path.display(), index, error = %e, "skipping undecodable profile entry");
                    None
                }
            })
            .collect()),
        Value::Mapping(_) => {
            warn!(path = %path.display(), "profile document holds a single mapping; wrapping it");
            let profile: Profile = serde_yaml::from_value(value)
                .map_err(|e| AppError::Store(format!("malformed {}: {e}", path.display())))?;
            Ok(vec![profile])
        }
        _ => Err(AppError::Store(format!(
            "malformed {}: expected a sequence of profiles",
            path.display()
        ))),
    }
}

fn parse_settings(text: &str, path: &Path) -> Result<Option<Settings>, AppError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::Store(format!("malformed {}: {e}", path.display())))?;
    if value.is_null() {
        return Ok(None);
    }
    serde_yaml::from_value(value)
        .map(Some)
        .map_err(|e| AppError::Store(format!("malformed {}: {e}", path.display())))
}

impl Store for YamlFileStore {
    fn store_type(&self) -> &str {
        "yaml_file"
    }

    fn read_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let path = self.profiles_path();
        match Self::read_document(&path)? {
            Some(text) => parse_profiles(&text, &path),
            None => Ok(Vec::new()),
        }
    }

    fn write_profiles(&self, profiles: &[Profile]) -> Result<(), AppError> {
        self.write_document(&self.profiles_path(), profiles)
    }

    fn read_settings(&self) -> Result<Option<Settings>, AppError> {
        let path = self.settings_path();
        match Self::read_document(&path)? {
            Some(text) => parse_settings(&text, &path),
            None => Ok(None),
        }
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), AppError> {
        self.write_document(&self.settings_path(), settings)
    }
}
