//! Namespaced key-value cache with TTL-based expiry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// Prefix carried by every cache key. Bulk clears enumerate only keys
/// under this namespace, so other persisted state (the auth session in
/// particular) is never disturbed.
pub const CACHE_PREFIX: &str = "carlot.cache:";

/// Consider cache entries stale after 5 minutes.
/// Listing data changes often enough that anything longer risks showing
/// sold cars as available.
const CACHE_TTL_MINUTES: i64 = 5;

/// Flat key-value persistence, shaped like the browser localStorage
/// contract this cache originally targeted. Implementations guard their
/// own interior mutability; operations are atomic per call.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory storage. The default for short-lived processes and the
/// substitute used by tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.keys().cloned().collect())
    }
}

/// File-backed storage: the whole key space lives in one JSON document,
/// rewritten on every mutation. Reads are served from memory.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`, loading any existing document.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse storage file: {}", path.display()))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.keys().cloned().collect())
    }
}

/// A cached payload with its creation instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() - self.cached_at >= Duration::minutes(CACHE_TTL_MINUTES)
    }
}

/// TTL cache over a [`Storage`], namespaced under [`CACHE_PREFIX`].
///
/// Logical keys ("all", "id:3", "search:camry") are prefixed before they
/// touch storage; all read/invalidation call sites build keys through
/// the catalog's key helpers so the convention cannot drift.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn Storage>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }

    /// Return the cached payload for `key`, or `None` if absent or expired.
    /// Expired and unparseable entries are purged on the way out.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = Self::namespaced(key);
        let Some(raw) = self.storage.get_item(&full_key)? else {
            return Ok(None);
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "Purging unparseable cache entry");
                self.storage.remove_item(&full_key)?;
                return Ok(None);
            }
        };

        if entry.is_expired() {
            debug!(key, "Purging expired cache entry");
            self.storage.remove_item(&full_key)?;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    /// Store `data` under `key` with a fresh timestamp, replacing any
    /// prior entry.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let entry = CacheEntry::new(data);
        let raw = serde_json::to_string(&entry)?;
        self.storage.set_item(&Self::namespaced(key), &raw)
    }

    /// Remove one entry unconditionally.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.storage.remove_item(&Self::namespaced(key))
    }

    /// Remove every entry whose logical key starts with `prefix`.
    pub fn clear_matching(&self, prefix: &str) -> Result<()> {
        let full_prefix = Self::namespaced(prefix);
        for key in self.storage.keys()? {
            if key.starts_with(&full_prefix) {
                self.storage.remove_item(&key)?;
            }
        }
        Ok(())
    }

    /// Remove every namespaced cache entry. Keys outside [`CACHE_PREFIX`]
    /// are left alone.
    pub fn clear_all(&self) -> Result<()> {
        for key in self.storage.keys()? {
            if key.starts_with(CACHE_PREFIX) {
                self.storage.remove_item(&key)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<MemoryStorage>, CacheStore) {
        let storage = Arc::new(MemoryStorage::default());
        let cache = CacheStore::new(storage.clone());
        (storage, cache)
    }

    #[test]
    fn test_set_then_get() {
        let (_, cache) = store();
        cache.set("all", &vec![1, 2, 3]).unwrap();
        let cached: Option<Vec<i32>> = cache.get("all").unwrap();
        assert_eq!(cached, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_get_missing_key() {
        let (_, cache) = store();
        let cached: Option<Vec<i32>> = cache.get("all").unwrap();
        assert_eq!(cached, None);
    }

    #[test]
    fn test_set_overwrites() {
        let (_, cache) = store();
        cache.set("id:1", &"old").unwrap();
        cache.set("id:1", &"new").unwrap();
        let cached: Option<String> = cache.get("id:1").unwrap();
        assert_eq!(cached.as_deref(), Some("new"));
    }

    #[test]
    fn test_expired_entry_is_purged() {
        let (storage, cache) = store();

        // Plant an entry just past the TTL boundary.
        let entry = CacheEntry {
            data: vec![1, 2, 3],
            cached_at: Utc::now() - Duration::minutes(CACHE_TTL_MINUTES) - Duration::seconds(1),
        };
        let raw = serde_json::to_string(&entry).unwrap();
        storage
            .set_item(&format!("{}all", CACHE_PREFIX), &raw)
            .unwrap();

        let cached: Option<Vec<i32>> = cache.get("all").unwrap();
        assert_eq!(cached, None);
        // Entry must be gone, not just skipped.
        assert!(storage
            .get_item(&format!("{}all", CACHE_PREFIX))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_corrupt_entry_is_purged() {
        let (storage, cache) = store();
        storage
            .set_item(&format!("{}all", CACHE_PREFIX), "not json")
            .unwrap();

        let cached: Option<Vec<i32>> = cache.get("all").unwrap();
        assert_eq!(cached, None);
        assert!(storage
            .get_item(&format!("{}all", CACHE_PREFIX))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_clear_matching_prefix() {
        let (_, cache) = store();
        cache.set("search:toyota", &1).unwrap();
        cache.set("search:honda", &2).unwrap();
        cache.set("all", &3).unwrap();

        cache.clear_matching("search:").unwrap();

        assert_eq!(cache.get::<i32>("search:toyota").unwrap(), None);
        assert_eq!(cache.get::<i32>("search:honda").unwrap(), None);
        assert_eq!(cache.get::<i32>("all").unwrap(), Some(3));
    }

    #[test]
    fn test_clear_all_leaves_foreign_keys() {
        let (storage, cache) = store();
        cache.set("all", &1).unwrap();
        cache.set("id:2", &2).unwrap();
        storage.set_item("carlot.auth_token", "secret").unwrap();

        cache.clear_all().unwrap();

        assert_eq!(cache.get::<i32>("all").unwrap(), None);
        assert_eq!(cache.get::<i32>("id:2").unwrap(), None);
        assert_eq!(
            storage.get_item("carlot.auth_token").unwrap().as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_, cache) = store();
        cache.set("all", &1).unwrap();
        cache.clear("all").unwrap();
        cache.clear("all").unwrap();
        assert_eq!(cache.get::<i32>("all").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        {
            let storage = FileStorage::open(path.clone()).unwrap();
            storage.set_item("carlot.cache:all", "[1,2]").unwrap();
            storage.set_item("carlot.auth_token", "secret").unwrap();
        }

        let reopened = FileStorage::open(path).unwrap();
        assert_eq!(
            reopened.get_item("carlot.cache:all").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(
            reopened.get_item("carlot.auth_token").unwrap().as_deref(),
            Some("secret")
        );
        let mut keys = reopened.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["carlot.auth_token", "carlot.cache:all"]);
    }

    #[test]
    fn test_file_storage_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(path.clone()).unwrap();
        storage.set_item("a", "1").unwrap();
        storage.remove_item("a").unwrap();
        storage.remove_item("never-existed").unwrap();

        let reopened = FileStorage::open(path).unwrap();
        assert!(reopened.get_item("a").unwrap().is_none());
    }
}
