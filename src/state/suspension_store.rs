//! The single persisted "last suspension" timestamp

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AppError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSuspension {
    suspended_at: Option<DateTime<Utc>>,
}

/// Remembers when the app last went to the background.
///
/// Backed by a small JSON file when a path is given, memory only otherwise.
#[derive(Debug)]
pub struct SuspensionStore {
    path: Option<PathBuf>,
    current: Mutex<Option<DateTime<Utc>>>,
}

impl SuspensionStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Mutex::new(None),
        }
    }

    /// Open the store at `path`, reading a timestamp left by a previous run
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let stored = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<StoredSuspension>(&content)?
        } else {
            StoredSuspension::default()
        };

        if let Some(at) = stored.suspended_at {
            info!("Found pending suspension from {} in {}", at, path.display());
        }

        Ok(Self {
            path: Some(path),
            current: Mutex::new(stored.suspended_at),
        })
    }

    /// Timestamp currently stored, if any
    pub fn peek(&self) -> Option<DateTime<Utc>> {
        self.current.lock().ok().and_then(|current| *current)
    }

    pub fn record(&self, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| AppError::Lock("suspension store"))?;
        *current = Some(at);
        self.persist(*current)?;
        debug!("Recorded suspension at {}", at);
        Ok(())
    }

    /// Read and clear the stored timestamp
    pub fn take(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| AppError::Lock("suspension store"))?;
        let taken = current.take();
        if taken.is_some() {
            self.persist(None)?;
        }
        Ok(taken)
    }

    fn persist(&self, suspended_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&StoredSuspension { suspended_at })?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
