//! Profile/settings store: whole-document persistence behind a small trait.
//!
//! Two independent documents are managed: the profile collection and the
//! settings singleton. Every read re-reads the backend and every write
//! replaces the whole document; there is no partial patching.
//!
//! ```text
//! {storage.dir}/
//! ├── profiles.yaml  : sequence of Profile
//! └── settings.yaml  : single Settings mapping
//! ```
//!
//! Backends implement the blocking [`Store`] trait. [`Repository`] is the
//! async facade callers use: it runs backend calls on the blocking pool and
//! turns storage faults into empty/absent results.

pub mod memory;
pub mod repository;
pub mod types;
pub mod yaml_file;

pub use memory::MemoryStore;
pub use repository::Repository;
pub use types::{NewProfile, Profile, ProfileUpdate, Settings};
pub use yaml_file::YamlFileStore;

use crate::error::AppError;

/// Pluggable document backend.
///
/// Implementations are `Send + Sync` and may block; [`Repository`] wraps
/// every call in `spawn_blocking`. Errors here are real errors: the
/// swallowing policy lives in the repository, not in backends.
pub trait Store: Send + Sync {
    /// Short backend name used in logs (e.g. `"yaml_file"`).
    fn store_type(&self) -> &str;

    /// Stored profile collection; empty when nothing has been written yet.
    fn read_profiles(&self) -> Result<Vec<Profile>, AppError>;

    /// Replace the whole profile collection.
    fn write_profiles(&self, profiles: &[Profile]) -> Result<(), AppError>;

    /// Stored settings, or `None` when nothing has been written yet.
    fn read_settings(&self) -> Result<Option<Settings>, AppError>;

    /// Replace the settings singleton.
    fn write_settings(&self, settings: &Settings) -> Result<(), AppError>;
}
