//! `memory` store: ephemeral in-process documents.
//!
//! All data lives in process memory and is discarded when the process
//! exits. Inject it into a [`Repository`](super::Repository) wherever
//! nothing should touch disk.

use std::sync::Mutex;

use super::Store;
use super::types::{Profile, Settings};
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Option<Vec<Profile>>>,
    settings: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn store_type(&self) -> &str {
        "memory"
    }

    fn read_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        Ok(profiles.clone().unwrap_or_default())
    }

    fn write_profiles(&self, profiles: &[Profile]) -> Result<(), AppError> {
        let mut slot = self
            .profiles
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        *slot = Some(profiles.to_vec());
        Ok(())
    }

    fn read_settings(&self) -> Result<Option<Settings>, AppError> {
        let settings = self
            .settings
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        Ok(settings.clone())
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), AppError> {
        let mut slot = self
            .settings
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        *slot = Some(settings.clone());
        Ok(())
    }
}
