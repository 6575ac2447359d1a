//! Persistent key-value storage
//!
//! The cache and the language settings only need string get/set, so the
//! store is a small async trait with a SQLite backend for real sessions
//! and an in-memory one for tests and `--ephemeral` runs.

use crate::error::BotResult;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// String key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written
    async fn get(&self, key: &str) -> BotResult<Option<String>>;

    /// Write (or overwrite) a value
    async fn set(&self, key: &str, value: &str) -> BotResult<()>;
}

/// SQLite-backed store
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> BotResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        debug!("💾 Opened key-value store at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            (key, value),
        )?;
        Ok(())
    }
}

/// Volatile store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        self.values
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("nested/store.db")).unwrap();

        tokio_test::block_on(async {
            assert_eq!(store.get("languageMode").await.unwrap(), None);
            store.set("languageMode", "auto").await.unwrap();
            store.set("languageMode", "manual").await.unwrap();
            assert_eq!(
                store.get("languageMode").await.unwrap().as_deref(),
                Some("manual")
            );
        });
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            tokio_test::block_on(store.set("selectedLanguage", "ta-IN")).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let value = tokio_test::block_on(store.get("selectedLanguage")).unwrap();
        assert_eq!(value.as_deref(), Some("ta-IN"));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
