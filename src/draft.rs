use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::app_dirs::AppDirs;
use crate::error::Result;

/// Autosaved copy of the essay in progress. Overwritten on every accepted
/// edit and removed when a session starts or locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub text: String,
    pub time_remaining_seconds: u64,
    pub saved_at_epoch_millis: i64,
}

impl DraftRecord {
    pub fn now(text: &str, time_remaining_seconds: u64) -> Self {
        Self {
            text: text.to_string(),
            time_remaining_seconds,
            saved_at_epoch_millis: Utc::now().timestamp_millis(),
        }
    }
}

pub trait DraftStore: std::fmt::Debug + Send {
    fn save(&self, draft: &DraftRecord) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn load(&self) -> Option<DraftRecord>;
}

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::draft_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, draft: &DraftRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(draft)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Option<DraftRecord> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Keeps the draft in memory; clones share the same slot, which lets a test
/// hand one clone to a session and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    slot: Arc<Mutex<Option<DraftRecord>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, draft: &DraftRecord) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(draft.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }

    fn load(&self) -> Option<DraftRecord> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}
