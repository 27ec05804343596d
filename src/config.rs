use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::limits::{LineThresholds, DEFAULT_HARD_LIMIT, DEFAULT_MAX_LINES, DEFAULT_MIN_LINES};
use crate::segment::{LineCapacity, DEFAULT_LINE_CAPACITY};
use crate::session::{clamp_extra_minutes, SessionConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_extra_minutes")]
    pub extra_minutes: u32,
    pub line_capacity: usize,
    pub min_lines: usize,
    pub max_lines: usize,
    pub hard_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extra_minutes: 0,
            line_capacity: DEFAULT_LINE_CAPACITY,
            min_lines: DEFAULT_MIN_LINES,
            max_lines: DEFAULT_MAX_LINES,
            hard_limit: DEFAULT_HARD_LIMIT,
        }
    }
}

/// Clamps a stored `extra_minutes` the same way as the command line value.
fn deserialize_extra_minutes<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_extra_minutes)
}

impl Config {
    /// Extra minutes as the session will use them.
    pub fn effective_extra_minutes(&self) -> u32 {
        clamp_extra_minutes(i64::from(self.extra_minutes))
    }

    pub fn capacity(&self) -> Result<LineCapacity> {
        LineCapacity::new(self.line_capacity)
    }

    pub fn thresholds(&self) -> Result<LineThresholds> {
        LineThresholds::new(self.min_lines, self.max_lines, self.hard_limit)
    }

    /// Validate and freeze into the settings of one session.
    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig::new(
            i64::from(self.effective_extra_minutes()),
            self.capacity()?,
            self.thresholds()?,
        ))
    }

    pub fn set_extra_minutes(&mut self, extra: i64) {
        self.extra_minutes = clamp_extra_minutes(extra);
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuillError;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            extra_minutes: 25,
            line_capacity: 80,
            min_lines: 10,
            max_lines: 20,
            hard_limit: 22,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"extra_minutes": 10}"#).unwrap();

        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.extra_minutes, 10);
        assert_eq!(loaded.line_capacity, DEFAULT_LINE_CAPACITY);
        assert_eq!(loaded.hard_limit, DEFAULT_HARD_LIMIT);
    }

    #[test]
    fn session_config_validates() {
        let cfg = Config {
            extra_minutes: 15,
            ..Config::default()
        };
        let session = cfg.session_config().unwrap();
        assert_eq!(session.duration_secs, 45 * 60);
        assert_eq!(session.capacity.get(), 100);

        let bad_capacity = Config {
            line_capacity: 0,
            ..Config::default()
        };
        assert_matches!(bad_capacity.session_config(), Err(QuillError::ZeroCapacity));

        let bad_thresholds = Config {
            min_lines: 60,
            ..Config::default()
        };
        assert_matches!(
            bad_thresholds.session_config(),
            Err(QuillError::InvalidThresholds { min: 60, .. })
        );
    }

    #[test]
    fn out_of_range_extra_minutes_in_file_are_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);

        fs::write(&path, br#"{"extra_minutes": -5, "line_capacity": 80}"#).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.extra_minutes, 0);
        assert_eq!(loaded.line_capacity, 80);

        fs::write(&path, br#"{"extra_minutes": 999, "min_lines": 10}"#).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.extra_minutes, 120);
        assert_eq!(loaded.min_lines, 10);
    }

    #[test]
    fn extra_minutes_are_clamped() {
        let mut cfg = Config::default();
        cfg.set_extra_minutes(-5);
        assert_eq!(cfg.extra_minutes, 0);
        cfg.set_extra_minutes(400);
        assert_eq!(cfg.extra_minutes, 120);
        // values written by hand are clamped when the session is built
        cfg.extra_minutes = 999;
        assert_eq!(cfg.effective_extra_minutes(), 120);
        assert_eq!(cfg.session_config().unwrap().duration_secs, 150 * 60);
    }
}
