// src/history/store.rs
// Bounded, deduplicating, write-through history of completed explanations

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::storage::KeyValueStore;
use crate::error::ExplainerError;
use crate::prompt::Level;

/// Key under which the serialized list is stored
pub const STORAGE_KEY: &str = "explanation-history";

/// Maximum number of entries retained
pub const MAX_HISTORY_ITEMS: usize = 20;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One completed explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub topic: String,
    pub level: Level,
    pub explanation: String,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    fn new(topic: &str, level: Level, explanation: &str) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        Self {
            id: new_entry_id(timestamp),
            topic: topic.to_string(),
            level,
            explanation: explanation.to_string(),
            timestamp,
        }
    }

    fn same_query(&self, topic: &str, level: Level) -> bool {
        self.topic == topic && self.level == level
    }
}

/// `<millis>-<9 base36 chars>`
fn new_entry_id(timestamp: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", timestamp, suffix)
}

/// History store shared between tasks; the mutex makes each
/// read-modify-write atomic
pub type SharedHistory = Arc<Mutex<HistoryStore>>;

/// Recency-ordered history (most recent first)
pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Hydrate from storage. Missing or unreadable data means empty history.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let entries = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => normalize(entries),
                Err(e) => {
                    warn!(error = %e, "Failed to parse stored history, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load history, starting empty");
                Vec::new()
            }
        };
        debug!(entries = entries.len(), "History loaded");

        Self { storage, entries }
    }

    pub fn shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    /// Prepend a new entry, evicting any entry for the same (topic, level)
    /// and anything beyond the cap
    pub fn add(&mut self, topic: &str, level: Level, explanation: &str) -> HistoryEntry {
        let entry = HistoryEntry::new(topic, level, explanation);

        self.entries.retain(|e| !e.same_query(topic, level));
        self.entries.insert(0, entry.clone());
        self.entries.truncate(MAX_HISTORY_ITEMS);
        self.persist();

        debug!(id = %entry.id, level = %level, "History entry added");
        entry
    }

    /// Delete one entry by id; returns whether anything was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Entries, most recent first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole list through to storage. Failures are logged; the
    /// in-memory list stays authoritative.
    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(ExplainerError::from)
            .and_then(|json| self.storage.set(STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to save history");
        }
    }
}

/// Re-establish the invariants on data read from storage
fn normalize(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert((e.topic.clone(), e.level)))
        .take(MAX_HISTORY_ITEMS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::storage::{FileStore, MemoryStore};
    use std::sync::Arc;

    /// Storage handle that lets the test inspect what was persisted
    #[derive(Clone, Default)]
    struct SharedMemory(Arc<MemoryStore>);

    impl KeyValueStore for SharedMemory {
        fn get(&self, key: &str) -> crate::error::Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> crate::error::Result<()> {
            self.0.set(key, value)
        }
    }

    impl SharedMemory {
        fn persisted(&self) -> Vec<HistoryEntry> {
            let raw = self.0.get(STORAGE_KEY).unwrap().unwrap();
            serde_json::from_str(&raw).unwrap()
        }
    }

    fn store() -> (HistoryStore, SharedMemory) {
        let memory = SharedMemory::default();
        (HistoryStore::load(Box::new(memory.clone())), memory)
    }

    #[test]
    fn test_add_prepends_and_persists() {
        let (mut history, memory) = store();
        let first = history.add("tides", Level::Teen, "The moon pulls.");
        let second = history.add("rainbows", Level::Expert, "Dispersion.");

        let topics: Vec<_> = history.list().iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec!["rainbows", "tides"]);
        assert_ne!(first.id, second.id);
        assert_eq!(memory.persisted(), history.list());
    }

    #[test]
    fn test_cap_keeps_twenty_most_recent() {
        let (mut history, memory) = store();
        for i in 0..21 {
            history.add(&format!("topic {}", i), Level::Graduate, "x");
        }

        assert_eq!(history.len(), MAX_HISTORY_ITEMS);
        assert_eq!(history.list()[0].topic, "topic 20");
        assert_eq!(history.list()[19].topic, "topic 1");
        assert!(history.list().iter().all(|e| e.topic != "topic 0"));
        assert_eq!(memory.persisted().len(), MAX_HISTORY_ITEMS);
    }

    #[test]
    fn test_duplicate_pair_replaces_and_moves_to_front() {
        let (mut history, _) = store();
        let old = history.add("tides", Level::Teen, "old answer");
        history.add("rainbows", Level::Teen, "x");
        history.add("tides", Level::Expert, "different level");
        let new = history.add("tides", Level::Teen, "new answer");

        assert_eq!(history.len(), 3);
        assert_eq!(history.list()[0], new);
        assert_eq!(history.list()[0].explanation, "new answer");
        assert!(history.get(&old.id).is_none());
        assert_eq!(
            history
                .list()
                .iter()
                .filter(|e| e.topic == "tides" && e.level == Level::Teen)
                .count(),
            1
        );
    }

    #[test]
    fn test_remove_by_id() {
        let (mut history, memory) = store();
        let keep = history.add("a", Level::Teen, "x");
        let gone = history.add("b", Level::Teen, "y");

        assert!(history.remove(&gone.id));
        assert!(!history.remove("no-such-id"));
        assert_eq!(history.list(), &[keep]);
        assert_eq!(memory.persisted().len(), 1);
    }

    #[test]
    fn test_clear_persists_empty_list() {
        let (mut history, memory) = store();
        history.add("a", Level::Teen, "x");
        history.clear();

        assert!(history.is_empty());
        assert!(memory.persisted().is_empty());
        assert_eq!(memory.0.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_storage_means_empty() {
        let storage = MemoryStore::with_value(STORAGE_KEY, "{not valid json");
        let history = HistoryStore::load(Box::new(storage));
        assert!(history.is_empty());
    }

    #[test]
    fn test_hydrate_accepts_legacy_level_ids_and_normalizes() {
        let mut raw = Vec::new();
        raw.push(serde_json::json!({
            "id": "1-a", "topic": "tides", "level": "5-year-old",
            "explanation": "first", "timestamp": 1
        }));
        raw.push(serde_json::json!({
            "id": "2-b", "topic": "tides", "level": "child-basic",
            "explanation": "dupe", "timestamp": 2
        }));
        for i in 0..25 {
            raw.push(serde_json::json!({
                "id": format!("x-{}", i), "topic": format!("t{}", i), "level": "expert",
                "explanation": "e", "timestamp": i
            }));
        }
        let storage = MemoryStore::with_value(STORAGE_KEY, &serde_json::to_string(&raw).unwrap());
        let history = HistoryStore::load(Box::new(storage));

        assert_eq!(history.len(), MAX_HISTORY_ITEMS);
        assert_eq!(history.list()[0].level, Level::ChildBasic);
        assert_eq!(history.list()[0].explanation, "first");
        assert_eq!(history.list()[1].topic, "t0");
    }

    #[test]
    fn test_survives_reload_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let entry = {
            let mut history = HistoryStore::load(Box::new(FileStore::new(dir.path())));
            history.add("photosynthesis", Level::ChildBasic, "Plants eat sunlight.")
        };

        let reloaded = HistoryStore::load(Box::new(FileStore::new(dir.path())));
        assert_eq!(reloaded.list(), &[entry]);
    }

    #[test]
    fn test_entry_id_format() {
        let id = new_entry_id(1700000000000);
        let (millis, suffix) = id.split_once('-').unwrap();
        assert_eq!(millis, "1700000000000");
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }
}
