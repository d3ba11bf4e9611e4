//! Persisted replay list.
//!
//! Replays are stored together as one JSON array in `{dir}/replays.json`,
//! most recent first and capped at `MAX_STORED_REPLAYS` entries.

use crate::models::replay::ReplayData;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the replay list inside the storage directory.
const REPLAY_FILE: &str = "replays.json";

/// Oldest entries beyond this count are dropped on save.
pub const MAX_STORED_REPLAYS: usize = 10;

const ID_SUFFIX_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("replay storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("replay storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One saved replay with its generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReplay {
    pub id: String,
    /// When the replay was saved (ISO 8601 on disk).
    pub timestamp: DateTime<Utc>,
    pub replay: ReplayData,
}

/// `"{unix_millis}-{6 alphanumerics}"`.
fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

pub struct ReplayStore {
    dir: PathBuf,
}

impl ReplayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the replay list file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(REPLAY_FILE)
    }

    /// Saves `replay` at the front of the list and returns its id.
    pub fn save(&self, replay: &ReplayData) -> Result<String, StorageError> {
        let now = Utc::now();
        let entry = StoredReplay {
            id: generate_id(now),
            timestamp: now,
            replay: replay.clone(),
        };
        let id = entry.id.clone();

        let mut replays = self.load_all();
        replays.insert(0, entry);
        replays.truncate(MAX_STORED_REPLAYS);
        self.write(&replays)?;

        log::info!(
            "STORAGE: Saved replay {} ({} stored)",
            id,
            replays.len()
        );
        Ok(id)
    }

    /// Every stored replay, most recent first.
    ///
    /// A missing or unreadable file yields an empty list.
    pub fn load_all(&self) -> Vec<StoredReplay> {
        let path = self.path();
        if !path.exists() {
            return Vec::new();
        }
        match Self::read(&path) {
            Ok(replays) => replays,
            Err(e) => {
                log::warn!("STORAGE: Ignoring unreadable replay list {:?}: {}", path, e);
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<StoredReplay> {
        self.load_all().into_iter().find(|r| r.id == id)
    }

    /// Removes the replay with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut replays = self.load_all();
        let before = replays.len();
        replays.retain(|r| r.id != id);
        if replays.len() == before {
            return Ok(false);
        }
        self.write(&replays)?;
        log::info!("STORAGE: Deleted replay {}", id);
        Ok(true)
    }

    fn read(path: &Path) -> Result<Vec<StoredReplay>, StorageError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, replays: &[StoredReplay]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(replays)?;
        fs::write(self.path(), json)?;
        Ok(())
    }
}
