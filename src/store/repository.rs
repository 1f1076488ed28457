//! Async repository over a [`Store`] backend.
//!
//! This is the always-available boundary: storage faults never escape.
//! Failed reads degrade to an empty collection / absent settings, failed
//! writes are logged and dropped.
//!
//! Collection mutations (add, update, delete) are read-modify-write over the
//! whole document. When that read fails the mutation is dropped rather than
//! writing a collection that would replace records it could not see. Each resource has its own async mutex so overlapping
//! mutations issued through the same repository are applied one after the
//! other. Writers outside this process (or clients that POST a whole
//! collection they read earlier) are still last-write-wins at file
//! granularity.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::Store;
use super::types::{NewProfile, Profile, ProfileUpdate, Settings};
use crate::error::AppError;

pub struct Repository {
    store: Arc<dyn Store>,
    profiles_lock: Mutex<()>,
    settings_lock: Mutex<()>,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            profiles_lock: Mutex::new(()),
            settings_lock: Mutex::new(()),
        }
    }

    pub fn store_type(&self) -> &str {
        self.store.store_type()
    }

    /// Run a blocking backend call on the blocking pool.
    async fn blocking<T, F>(&self, op: &'static str, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| AppError::Store(format!("{op} join: {e}")))?
    }

    // ── Profiles ──────────────────────────────────────────────────────

    /// Stored profiles, or an empty collection if missing or unreadable.
    pub async fn read_profiles(&self) -> Vec<Profile> {
        match self.blocking("read_profiles", |s| s.read_profiles()).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(store = %self.store_type(), error = %e, "profile read failed; using empty collection");
                Vec::new()
            }
        }
    }

    /// Replace the whole profile collection. Faults are logged, not returned.
    pub async fn write_profiles(&self, profiles: Vec<Profile>) {
        let _guard = self.profiles_lock.lock().await;
        self.replace_profiles(profiles).await;
    }

    async fn replace_profiles(&self, profiles: Vec<Profile>) {
        let count = profiles.len();
        match self.blocking("write_profiles", move |s| s.write_profiles(&profiles)).await {
            Ok(()) => debug!(count, "profiles written"),
            Err(e) => error!(store = %self.store_type(), error = %e, "profile write failed"),
        }
    }

    /// Read for a mutation. `None` (already logged) means do not write back.
    async fn load_for_update(&self, op: &'static str) -> Option<Vec<Profile>> {
        match self.blocking("read_profiles", |s| s.read_profiles()).await {
            Ok(profiles) => Some(profiles),
            Err(e) => {
                error!(store = %self.store_type(), error = %e, %op, "profile read failed; mutation dropped");
                None
            }
        }
    }

    pub async fn find_profile(&self, id: &str) -> Option<Profile> {
        self.read_profiles().await.into_iter().find(|p| p.id == id)
    }

    /// Create a profile with a fresh id and timestamp and append it.
    pub async fn add_profile(&self, new: NewProfile) -> Profile {
        let _guard = self.profiles_lock.lock().await;
        let profile = new.into_profile();
        let Some(mut profiles) = self.load_for_update("add").await else {
            return profile;
        };
        profiles.push(profile.clone());
        self.replace_profiles(profiles).await;
        info!(profile_id = %profile.id, name = %profile.name, "profile added");
        profile
    }

    /// Apply `update` to the profile with `id`. Returns `false` if no profile
    /// matched or the collection could not be read.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> bool {
        let _guard = self.profiles_lock.lock().await;
        let Some(mut profiles) = self.load_for_update("update").await else {
            return false;
        };
        let Some(profile) = profiles.iter_mut().find(|p| p.id == id) else {
            debug!(profile_id = %id, "update: no such profile");
            return false;
        };
        update.apply(profile);
        self.replace_profiles(profiles).await;
        info!(profile_id = %id, "profile updated");
        true
    }

    /// Remove the profile with `id`, leaving every other profile untouched.
    /// Returns `false` if no profile matched or the collection could not be read.
    pub async fn delete_profile(&self, id: &str) -> bool {
        let _guard = self.profiles_lock.lock().await;
        let Some(mut profiles) = self.load_for_update("delete").await else {
            return false;
        };
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            debug!(profile_id = %id, "delete: no such profile");
            return false;
        }
        self.replace_profiles(profiles).await;
        info!(profile_id = %id, "profile deleted");
        true
    }

    // ── Settings ──────────────────────────────────────────────────────

    /// Stored settings, or `None` if missing or unreadable.
    pub async fn read_settings(&self) -> Option<Settings> {
        match self.blocking("read_settings", |s| s.read_settings()).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(store = %self.store_type(), error = %e, "settings read failed; treating as unset");
                None
            }
        }
    }

    /// Replace the settings singleton. Faults are logged, not returned.
    pub async fn write_settings(&self, settings: Settings) {
        let _guard = self.settings_lock.lock().await;
        let provider = settings.provider;
        match self.blocking("write_settings", move |s| s.write_settings(&settings)).await {
            Ok(()) => debug!(?provider, "settings written"),
            Err(e) => error!(store = %self.store_type(), error = %e, "settings write failed"),
        }
    }
}
