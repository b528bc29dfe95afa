//! Tracks which photos have finished loading their pixels.

use std::collections::HashSet;

/// Set of photo ids whose images have loaded.
///
/// Grows monotonically until [`ImageLoadTracker::clear`] on a query change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLoadTracker {
    loaded: HashSet<String>,
}

impl ImageLoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `photo_id` finished loading. Returns `false` if it was
    /// already recorded.
    pub fn mark_loaded(&mut self, photo_id: impl Into<String>) -> bool {
        self.loaded.insert(photo_id.into())
    }

    pub fn is_loaded(&self, photo_id: &str) -> bool {
        self.loaded.contains(photo_id)
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
