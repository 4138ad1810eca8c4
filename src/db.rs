use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::player::history::{KeyValueStore, StoreError};

/// SQLite-backed key-value table standing in for the browser's local storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.get_value(key)
            .map_err(|err| StoreError::Backend(format!("{err:#}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_value(key, value)
            .map_err(|err| StoreError::Backend(format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::history::WatchHistory;

    #[test]
    fn values_round_trip_and_overwrite() {
        let db = Database::open_in_memory().expect("open db");
        db.migrate().expect("migrate");

        assert_eq!(db.get_value("k").expect("read"), None);
        db.set_value("k", "one").expect("write");
        db.set_value("k", "two").expect("overwrite");
        assert_eq!(db.get_value("k").expect("read").as_deref(), Some("two"));
    }

    #[test]
    fn history_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("reelwatch.db");

        {
            let db = Database::open(&path).expect("open db");
            db.migrate().expect("migrate");
            let mut history = WatchHistory::new(db);
            history.record_at("tien-nghich", 12, 0.0, 1_700_000_000_000);
        }

        let db = Database::open(&path).expect("reopen db");
        db.migrate().expect("migrate is idempotent");
        let history = WatchHistory::new(db);
        let record = history.lookup("tien-nghich").expect("record persisted");
        assert_eq!(record.episode, 12);
        assert_eq!(record.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn unmigrated_database_degrades_history() {
        let db = Database::open_in_memory().expect("open db");
        let mut history = WatchHistory::new(db);
        history.record("x", 2, 0.0);
        assert_eq!(history.lookup("x"), None);
    }
}
