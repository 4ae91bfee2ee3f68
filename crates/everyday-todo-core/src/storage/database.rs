//! SQLite-backed document store.
//!
//! Every piece of state is a whole JSON document under a fixed key (see
//! [`super::keys`]). Reads that fail to parse fall back to a default
//! document and log a warning; they are never fatal.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Key-value document store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a raw value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a raw value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a key. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Remove every document.
    pub fn kv_clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    /// Load a document, falling back to `T::default()` when it is missing,
    /// unreadable or malformed.
    pub fn load_document<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.try_load_document(key).unwrap_or_default()
    }

    /// Like [`Self::load_document`] but distinguishes "absent" (`None`).
    /// Malformed documents are logged and reported as absent.
    pub fn try_load_document<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = match self.kv_get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read document, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to parse document, using default");
                None
            }
        }
    }

    /// Serialize and store a whole document.
    pub fn save_document<T: Serialize + ?Sized>(&self, key: &str, doc: &T) -> Result<()> {
        let raw = serde_json::to_string(doc)?;
        self.kv_set(key, &raw)?;
        Ok(())
    }

    /// Write several raw documents atomically: either all land or none do.
    pub fn write_documents(&mut self, docs: &[(&str, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in docs {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
