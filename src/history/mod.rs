// src/history/mod.rs
// Persisted history of completed explanations

pub mod format;
pub mod storage;
pub mod store;

pub use format::format_relative;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{HistoryEntry, HistoryStore, MAX_HISTORY_ITEMS, STORAGE_KEY, SharedHistory};
