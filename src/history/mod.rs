//! Persisted search history.
//!
//! The history is a short list of recent queries, most recent first, stored
//! as one JSON-encoded list under a single key. Persistence is best effort:
//! a missing or malformed record loads as an empty history, and failed
//! writes are logged and dropped.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError, default_history_dir};

/// Maximum number of remembered queries.
pub const MAX_SEARCH_HISTORY: usize = 5;

/// Storage key holding the JSON-encoded history list.
pub const HISTORY_KEY: &str = "savedSearchQueries";

/// Bounded, persisted list of recent search queries.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Open the history backed by `store`, loading any persisted entries.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut history = Self {
            store,
            entries: Vec::new(),
        };
        history.entries = history.load();
        history
    }

    /// An empty history kept only in memory.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::default()))
    }

    /// Read the persisted list.
    ///
    /// Falls back to an empty list when nothing is stored, the stored value
    /// is not a JSON list of strings, or the backend fails.
    pub fn load(&self) -> Vec<String> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(%err, "search history unreadable; starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(MAX_SEARCH_HISTORY);
                entries
            }
            Err(err) => {
                tracing::warn!(%err, "search history malformed; starting empty");
                Vec::new()
            }
        }
    }

    /// Prepend `query`, evict past the bound, and persist.
    pub fn append(&mut self, query: impl Into<String>) {
        self.entries.insert(0, query.into());
        self.entries.truncate(MAX_SEARCH_HISTORY);
        self.persist();
    }

    /// Forget every entry and remove the persisted record.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(err) = self.store.remove(HISTORY_KEY) {
            tracing::warn!(%err, "failed to remove search history");
        }
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.entries) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(%err, "failed to encode search history");
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &encoded) {
            tracing::warn!(%err, "failed to persist search history");
        }
    }
}
