//! SQLite-backed key-value store for engine state.
//!
//! Everything lives in one `kv` table. The engine snapshot is stored as JSON
//! under `<namespace>:state` and the emoji journal under `<namespace>:emoji`,
//! so several namespaces can share a database file.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::Config;
use crate::emoji::EmojiJournal;
use crate::engine::EngineSnapshot;
use crate::error::{DatabaseError, Result};

const STATE_SUFFIX: &str = "state";
const EMOJI_SUFFIX: &str = "emoji";

/// Persistent home of an engine snapshot.
pub struct StateStore {
    conn: Connection,
    namespace: String,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn,
            namespace: namespace.into(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open the database named by the config in the data directory.
    pub fn open_default(config: &Config) -> Result<Self> {
        Self::open(&config.db_path()?, config.storage.namespace.clone())
    }

    /// Open an in-memory database.
    pub fn open_memory(namespace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            namespace: namespace.into(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}:{suffix}", self.namespace)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<bool, rusqlite::Error> {
        let removed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn load_json<T: DeserializeOwned>(&self, suffix: &str) -> Result<Option<T>> {
        let key = self.key(suffix);
        let Some(raw) = self.kv_get(&key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| DatabaseError::CorruptState {
            key: key.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(value))
    }

    fn save_json<T: Serialize>(&self, suffix: &str, value: &T) -> Result<()> {
        let key = self.key(suffix);
        let raw = serde_json::to_string(value)?;
        self.kv_set(&key, &raw)?;
        debug!(%key, bytes = raw.len(), "state saved");
        Ok(())
    }

    /// Stored engine snapshot, `None` on first run.
    ///
    /// # Errors
    /// Returns [`DatabaseError::CorruptState`] if the stored JSON no longer decodes.
    pub fn load_snapshot(&self) -> Result<Option<EngineSnapshot>> {
        self.load_json(STATE_SUFFIX)
    }

    pub fn save_snapshot(&self, snapshot: &EngineSnapshot) -> Result<()> {
        self.save_json(STATE_SUFFIX, snapshot)
    }

    /// Save without surfacing failures. The in-memory engine stays
    /// authoritative; a failed write is only logged.
    pub fn persist(&self, snapshot: &EngineSnapshot) {
        if let Err(err) = self.save_snapshot(snapshot) {
            warn!(error = %err, namespace = %self.namespace, "failed to persist engine state");
        }
    }

    pub fn load_emoji_journal(&self) -> Result<EmojiJournal> {
        Ok(self.load_json::<EmojiJournal>(EMOJI_SUFFIX)?.unwrap_or_default())
    }

    pub fn save_emoji_journal(&self, journal: &EmojiJournal) -> Result<()> {
        self.save_json(EMOJI_SUFFIX, journal)
    }

    /// Remove everything stored under this namespace.
    pub fn wipe(&self) -> Result<()> {
        self.kv_delete(&self.key(STATE_SUFFIX))?;
        self.kv_delete(&self.key(EMOJI_SUFFIX))?;
        Ok(())
    }
}
