use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Store key holding the whole history map as one JSON object.
pub(crate) const HISTORY_KEY: &str = "watchHistory";

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("persisted store is unavailable")]
    Unavailable,
    #[error("persisted store failed: {0}")]
    Backend(String),
}

/// Durable string key-value storage, one namespace per user profile.
pub(crate) trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; also the default when nothing durable is configured.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stand-in when durable storage cannot be opened. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DisabledStore;

impl KeyValueStore for DisabledStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WatchRecord {
    pub(crate) episode: u32,
    pub(crate) progress: f64,
    /// Unix epoch milliseconds.
    pub(crate) timestamp: i64,
}

/// Last-watched bookmark per title. Last writer wins; storage failures are
/// logged and swallowed so playback never depends on them.
#[derive(Debug)]
pub(crate) struct WatchHistory<S> {
    store: S,
}

impl<S: KeyValueStore> WatchHistory<S> {
    pub(crate) fn new(store: S) -> Self {
        Self { store }
    }

    pub(crate) fn record(&mut self, movie_id: &str, episode: u32, progress: f64) {
        self.record_at(movie_id, episode, progress, Utc::now().timestamp_millis());
    }

    pub(crate) fn record_at(
        &mut self,
        movie_id: &str,
        episode: u32,
        progress: f64,
        timestamp: i64,
    ) {
        let mut records = self.load();
        records.insert(
            movie_id.to_string(),
            WatchRecord {
                episode,
                progress,
                timestamp,
            },
        );

        let payload = match serde_json::to_string(&records) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, movie_id, "failed to encode watch history");
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &payload) {
            warn!(%err, movie_id, episode, "watch history write skipped");
        }
    }

    pub(crate) fn lookup(&self, movie_id: &str) -> Option<WatchRecord> {
        self.load().remove(movie_id)
    }

    /// All records, most recently written first.
    pub(crate) fn entries(&self) -> Vec<(String, WatchRecord)> {
        let mut entries: Vec<_> = self.load().into_iter().collect();
        entries.sort_by(|left, right| {
            right
                .1
                .timestamp
                .cmp(&left.1.timestamp)
                .then_with(|| left.0.cmp(&right.0))
        });
        entries
    }

    fn load(&self) -> BTreeMap<String, WatchRecord> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(err) => {
                warn!(%err, "watch history read skipped");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(%err, "discarding unreadable watch history payload");
            BTreeMap::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_upserts_by_title() {
        let mut history = WatchHistory::new(MemoryStore::default());
        history.record_at("x", 2, 0.0, 100);
        history.record_at("y", 7, 0.5, 200);
        history.record_at("x", 3, 0.0, 300);

        assert_eq!(
            history.lookup("x"),
            Some(WatchRecord {
                episode: 3,
                progress: 0.0,
                timestamp: 300
            })
        );
        assert_eq!(history.lookup("y").map(|record| record.episode), Some(7));
        assert_eq!(history.lookup("z"), None);
    }

    #[test]
    fn entries_are_newest_first() {
        let mut history = WatchHistory::new(MemoryStore::default());
        history.record_at("old", 1, 0.0, 10);
        history.record_at("new", 4, 0.0, 30);
        history.record_at("mid", 2, 0.0, 20);

        let ids: Vec<_> = history.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn payload_uses_title_keyed_json_object() {
        let mut store = MemoryStore::default();
        store
            .set(
                HISTORY_KEY,
                r#"{"x":{"episode":5,"progress":0.25,"timestamp":42}}"#,
            )
            .expect("memory store accepts writes");
        let history = WatchHistory::new(store);
        assert_eq!(
            history.lookup("x"),
            Some(WatchRecord {
                episode: 5,
                progress: 0.25,
                timestamp: 42
            })
        );
    }

    #[test]
    fn unavailable_store_degrades_to_noop() {
        let mut history = WatchHistory::new(DisabledStore);
        history.record("x", 2, 0.0);
        assert_eq!(history.lookup("x"), None);
        assert!(history.entries().is_empty());
    }

    #[test]
    fn corrupt_payload_is_replaced_on_next_write() {
        let mut store = MemoryStore::default();
        store
            .set(HISTORY_KEY, "{not json")
            .expect("memory store accepts writes");
        let mut history = WatchHistory::new(store);
        assert_eq!(history.lookup("x"), None);

        history.record_at("x", 1, 0.0, 1);
        assert_eq!(history.lookup("x").map(|record| record.episode), Some(1));
    }
}
