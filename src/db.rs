use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::config::config_dir;

/// Key under which the last search term is kept.
pub const SEARCH_KEY: &str = "search";

/// A durable string-to-string store provided by the host.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens `storage.db` in the application data directory.
    pub fn new() -> Result<Self> {
        let app_data_dir = config_dir();
        if !app_data_dir.exists() {
            std::fs::create_dir_all(&app_data_dir)?;
        }

        Self::open(app_data_dir.join("storage.db"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS key_value (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        debug!(path = %path.as_ref().display(), "opened key-value store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        let value = conn
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO key_value (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Process-local store, used when the database can't be opened.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Failed to lock memory store"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Failed to lock memory store"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Value was just loaded; nothing has been written back yet.
    Uninitialized,
    Ready,
}

/// A string value mirrored into a [`KeyValueStore`].
///
/// The value read at startup is never written back: writes start only once
/// the owner has mounted and the value actually changes.
pub struct PersistedSearchTerm {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: String,
    mount: MountState,
}

impl PersistedSearchTerm {
    /// Reads `key`, falling back to `default` when it is absent or empty.
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str, default: &str) -> Self {
        let stored = match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted value");
                None
            }
        };
        let value = stored
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string());

        Self {
            store,
            key: key.to_string(),
            value,
            mount: MountState::Uninitialized,
        }
    }

    pub fn mount(&mut self) {
        self.mount = MountState::Ready;
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        if self.value == value {
            return;
        }
        self.value = value.to_string();

        if self.mount == MountState::Ready {
            if let Err(e) = self.store.set(&self.key, &self.value) {
                warn!(key = %self.key, error = %e, "failed to persist value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Remembers every write so tests can tell a skipped write from a no-op.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        writes: Mutex<Vec<(String, String)>>,
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.writes
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            self.inner.set(key, value)
        }
    }

    #[test]
    fn sqlite_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("storage.db")).unwrap();

        assert_eq!(store.get(SEARCH_KEY).unwrap(), None);

        store.set(SEARCH_KEY, "React").unwrap();
        store.set(SEARCH_KEY, "Rust").unwrap();
        assert_eq!(store.get(SEARCH_KEY).unwrap().as_deref(), Some("Rust"));
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.db");

        SqliteStore::open(&path).unwrap().set(SEARCH_KEY, "Redux").unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get(SEARCH_KEY).unwrap().as_deref(), Some("Redux"));
    }

    #[test]
    fn falls_back_to_default_when_absent_or_empty() {
        let store = Arc::new(MemoryStore::default());
        let term = PersistedSearchTerm::load(store.clone(), SEARCH_KEY, "React");
        assert_eq!(term.get(), "React");

        store.set(SEARCH_KEY, "").unwrap();
        let term = PersistedSearchTerm::load(store, SEARCH_KEY, "React");
        assert_eq!(term.get(), "React");
    }

    #[test]
    fn reads_stored_value() {
        let store = Arc::new(MemoryStore::default());
        store.set(SEARCH_KEY, "Rust").unwrap();

        let term = PersistedSearchTerm::load(store, SEARCH_KEY, "React");
        assert_eq!(term.get(), "Rust");
        assert_eq!(term.mount, MountState::Uninitialized);
    }

    #[test]
    fn mounting_does_not_write() {
        let store = Arc::new(RecordingStore::default());
        let mut term = PersistedSearchTerm::load(store.clone(), SEARCH_KEY, "React");
        term.mount();

        assert_eq!(term.mount, MountState::Ready);
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn writes_through_every_change_after_mount() {
        let store = Arc::new(RecordingStore::default());
        let mut term = PersistedSearchTerm::load(store.clone(), SEARCH_KEY, "React");
        term.mount();

        term.set("Reac");
        term.set("Reac");
        term.set("Rust");

        let writes = store.writes.lock().unwrap();
        assert_eq!(
            *writes,
            vec![
                (SEARCH_KEY.to_string(), "Reac".to_string()),
                (SEARCH_KEY.to_string(), "Rust".to_string()),
            ]
        );
        assert_eq!(store.get(SEARCH_KEY).unwrap().as_deref(), Some("Rust"));
    }

    #[test]
    fn changes_before_mount_stay_in_memory() {
        let store = Arc::new(RecordingStore::default());
        let mut term = PersistedSearchTerm::load(store.clone(), SEARCH_KEY, "React");

        term.set("Rust");

        assert_eq!(term.get(), "Rust");
        assert!(store.writes.lock().unwrap().is_empty());
    }
}
