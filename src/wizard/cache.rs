//! Durable storage for the last successful design

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use crate::config::Config;
use crate::types::DesignResult;

pub const LAST_RESULT_KEY: &str = "lastDesignResult";
pub const LAST_TIME_KEY: &str = "lastDesignTime";

const STORAGE_FILE: &str = "storage.json";

/// A design result as it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub result: DesignResult,
    /// Missing or unparseable timestamps read back as `None`
    pub saved_at: Option<DateTime<Utc>>,
}

/// Storage for the single most recent successful result
pub trait ResultCache: Send + Sync {
    /// The stored record, if any. A corrupt record reads as `None`.
    fn load(&self) -> Result<Option<PersistedRecord>>;

    /// Overwrite the stored record with `result` and the current time
    fn save(&self, result: &DesignResult) -> Result<PersistedRecord>;
}

/// String key/value document, the same shape on disk and in memory
type Entries = BTreeMap<String, String>;

fn decode(entries: &Entries) -> Option<PersistedRecord> {
    let raw = entries.get(LAST_RESULT_KEY)?;
    let result = match serde_json::from_str::<DesignResult>(raw) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Ignoring corrupt cached design result");
            return None;
        }
    };
    let saved_at = entries
        .get(LAST_TIME_KEY)
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));
    Some(PersistedRecord { result, saved_at })
}

fn encode(entries: &mut Entries, result: &DesignResult) -> Result<PersistedRecord> {
    let now = Utc::now();
    let raw = serde_json::to_string(result).context("Failed to serialize design result")?;
    entries.insert(LAST_RESULT_KEY.to_string(), raw);
    entries.insert(LAST_TIME_KEY.to_string(), now.to_rfc3339());
    Ok(PersistedRecord {
        result: result.clone(),
        saved_at: Some(now),
    })
}

/// JSON document at `<state>/storage.json`
#[derive(Debug, Clone)]
pub struct FileResultCache {
    path: PathBuf,
}

impl FileResultCache {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STORAGE_FILE),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let contents = fs::read_to_string(&self.path).context("Failed to read storage file")?;
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is not valid JSON, starting fresh");
                Ok(Entries::new())
            }
        }
    }
}

impl ResultCache for FileResultCache {
    fn load(&self) -> Result<Option<PersistedRecord>> {
        Ok(decode(&self.read_entries()?))
    }

    fn save(&self, result: &DesignResult) -> Result<PersistedRecord> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let mut entries = self.read_entries()?;
        let record = encode(&mut entries, result)?;
        let contents = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, contents).context("Failed to write storage file")?;
        Ok(record)
    }
}

/// In-process cache that also counts writes
#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: Mutex<Entries>,
    saves: AtomicUsize,
}

impl MemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw stored values, as if written by an earlier run
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ResultCache for MemoryResultCache {
    fn load(&self) -> Result<Option<PersistedRecord>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(decode(&entries))
    }

    fn save(&self, result: &DesignResult) -> Result<PersistedRecord> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let record = encode(&mut entries, result)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(style: &str) -> DesignResult {
        DesignResult {
            style: style.to_string(),
            description: "Open plan with warm oak".to_string(),
            ..DesignResult::default()
        }
    }

    #[test]
    fn test_file_cache_empty_dir_loads_none() {
        let dir = TempDir::new().unwrap();
        let cache = FileResultCache::new(dir.path());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_file_cache_round_trip_survives_new_instance() {
        let dir = TempDir::new().unwrap();
        let saved = FileResultCache::new(dir.path()).save(&result("Modern")).unwrap();

        let loaded = FileResultCache::new(dir.path()).load().unwrap().unwrap();
        assert_eq!(loaded.result, result("Modern"));
        assert_eq!(loaded.saved_at, saved.saved_at);
    }

    #[test]
    fn test_file_cache_overwrites_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let cache = FileResultCache::new(dir.path());
        cache.save(&result("First")).unwrap();
        cache.save(&result("Second")).unwrap();

        assert_eq!(cache.load().unwrap().unwrap().result.style, "Second");
        let raw: Entries = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_file_cache_creates_state_dir() {
        let dir = TempDir::new().unwrap();
        let cache = FileResultCache::new(dir.path().join("nested").join(".atelier"));
        cache.save(&result("Modern")).unwrap();
        assert!(cache.path().exists());
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let cache = MemoryResultCache::with_entries([(LAST_RESULT_KEY, "{not json")]);
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_storage_file_is_absent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORAGE_FILE), "garbage").unwrap();
        let cache = FileResultCache::new(dir.path());
        assert!(cache.load().unwrap().is_none());
        cache.save(&result("Recovered")).unwrap();
        assert_eq!(cache.load().unwrap().unwrap().result.style, "Recovered");
    }

    #[test]
    fn test_bad_timestamp_keeps_result() {
        let cache = MemoryResultCache::with_entries([
            (LAST_RESULT_KEY, r#"{"style": "Minimal", "description": "x"}"#),
            (LAST_TIME_KEY, "yesterday"),
        ]);
        let record = cache.load().unwrap().unwrap();
        assert_eq!(record.result.style, "Minimal");
        assert!(record.saved_at.is_none());
    }

    #[test]
    fn test_memory_cache_counts_saves() {
        let cache = MemoryResultCache::new();
        assert_eq!(cache.save_count(), 0);
        cache.save(&result("A")).unwrap();
        cache.save(&result("B")).unwrap();
        assert_eq!(cache.save_count(), 2);
        assert_eq!(cache.load().unwrap().unwrap().result.style, "B");
    }
}
