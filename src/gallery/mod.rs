//! Gallery view model.
//!
//! [`Gallery`] composes pagination, image-load tracking, photo selection,
//! search history and the history debouncer into one state machine. The
//! presentation layer drives it through explicit commands and reads it
//! through [`Gallery::snapshot`]. Commands that need network I/O return a
//! [`FetchRequest`]; the gallery never fetches on its own.

use crate::debounce::SearchDebouncer;
use crate::history::HistoryStore;
use crate::loaded::ImageLoadTracker;
use crate::pagination::{ApplyOutcome, FetchRequest, PageResponse, PaginationController};
use crate::photo::{Photo, Query};
use crate::source::SourceError;

/// One grid entry as the presentation layer should draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<'a> {
    pub photo: &'a Photo,
    /// Whether the real image is ready; otherwise draw a placeholder.
    pub loaded: bool,
}

/// Read-only view of everything needed to render the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySnapshot<'a> {
    pub query: &'a Query,
    pub tiles: Vec<Tile<'a>>,
    /// First page of the active query is outstanding.
    pub is_loading: bool,
    /// A follow-up page is outstanding.
    pub is_loading_more: bool,
    pub has_more: bool,
    pub error: Option<&'a SourceError>,
    pub selected: Option<&'a Photo>,
    pub history: &'a [String],
}

#[derive(Debug)]
pub struct Gallery {
    pager: PaginationController,
    loaded: ImageLoadTracker,
    selected: Option<Photo>,
    history: HistoryStore,
    debouncer: SearchDebouncer,
}

impl Gallery {
    pub fn new(history: HistoryStore) -> Self {
        Self {
            pager: PaginationController::new(),
            loaded: ImageLoadTracker::new(),
            selected: None,
            history,
            debouncer: SearchDebouncer::default(),
        }
    }

    /// Handle an edit of the search input.
    ///
    /// The active query switches immediately; remembering it in history is
    /// deferred until the input has been idle for the debounce delay. Blank
    /// input cancels any pending commit. Returns the first-page fetch when
    /// the query actually changed.
    pub fn on_input(&mut self, raw: &str, now_ms: u64) -> Option<FetchRequest> {
        let query = Query::parse(raw);
        match query.text() {
            Some(text) => self.debouncer.queue(text, now_ms),
            None => self.debouncer.cancel(),
        }
        if self.pager.generation() > 0 && &query == self.pager.query() {
            return None;
        }
        Some(self.change_query(query))
    }

    /// Re-issue the first page of the active query from scratch.
    pub fn refresh(&mut self) -> FetchRequest {
        let query = self.pager.query().clone();
        self.change_query(query)
    }

    fn change_query(&mut self, query: Query) -> FetchRequest {
        self.loaded.clear();
        self.pager.on_query_change(query)
    }

    /// Advance the debounce clock. Returns the query committed to history, if any.
    pub fn tick(&mut self, now_ms: u64) -> Option<String> {
        let query = self.debouncer.take_ready(now_ms)?;
        tracing::debug!(%query, "remembering search");
        self.history.append(query.clone());
        Some(query)
    }

    pub fn load_next_page(&mut self) -> Option<FetchRequest> {
        self.pager.load_next_page()
    }

    pub fn apply_page(&mut self, response: PageResponse) -> ApplyOutcome {
        self.pager.apply(response)
    }

    /// Record a finished image load issued during `generation`.
    ///
    /// Loads for an earlier query are ignored.
    pub fn mark_loaded(&mut self, generation: u64, photo_id: &str) -> bool {
        if generation != self.pager.generation() {
            return false;
        }
        self.loaded.mark_loaded(photo_id)
    }

    pub fn is_loaded(&self, photo_id: &str) -> bool {
        self.loaded.is_loaded(photo_id)
    }

    /// Show `photo` in the overlay, replacing any current selection.
    pub fn select_photo(&mut self, photo: Photo) {
        self.selected = Some(photo);
    }

    pub fn close_selection(&mut self) {
        self.selected = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub const fn selected(&self) -> Option<&Photo> {
        self.selected.as_ref()
    }

    pub fn photos(&self) -> &[Photo] {
        self.pager.photos()
    }

    pub const fn query(&self) -> &Query {
        self.pager.query()
    }

    pub const fn generation(&self) -> u64 {
        self.pager.generation()
    }

    pub const fn pagination(&self) -> &PaginationController {
        &self.pager
    }

    pub const fn history_commit_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn snapshot(&self) -> GallerySnapshot<'_> {
        GallerySnapshot {
            query: self.pager.query(),
            tiles: self
                .pager
                .photos()
                .iter()
                .map(|photo| Tile {
                    photo,
                    loaded: self.loaded.is_loaded(&photo.id),
                })
                .collect(),
            is_loading: self.pager.is_loading(),
            is_loading_more: self.pager.is_loading_more(),
            has_more: self.pager.can_load_more(),
            error: self.pager.last_error(),
            selected: self.selected.as_ref(),
            history: self.history.entries(),
        }
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(HistoryStore::in_memory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HISTORY_KEY, KeyValueStore, MemoryStore};
    use crate::photo::sample_photo;
    use crate::source::PageRequest;

    fn page(prefix: &str, n: usize) -> Vec<Photo> {
        (0..n).map(|i| sample_photo(&format!("{prefix}{i}"))).collect()
    }

    #[test]
    fn test_typing_a_then_ab_commits_only_ab() {
        let store = MemoryStore::default();
        let mut gallery = Gallery::new(HistoryStore::open(Box::new(store.clone())));

        assert!(gallery.on_input("a", 0).is_some());
        assert!(gallery.on_input("ab", 900).is_some());
        assert_eq!(gallery.tick(2000), None);
        assert_eq!(gallery.tick(2899), None);
        assert_eq!(gallery.tick(2900).as_deref(), Some("ab"));
        assert_eq!(gallery.tick(10_000), None);

        assert_eq!(gallery.history(), ["ab"]);
        assert_eq!(
            store.get(HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["ab"]"#)
        );
    }

    #[test]
    fn test_blank_input_never_commits_and_cancels_pending() {
        let mut gallery = Gallery::default();
        gallery.on_input("cat", 0);
        let request = gallery.on_input("   ", 500).unwrap();
        assert_eq!(request.page, PageRequest::Default);
        assert!(!gallery.history_commit_pending());
        assert_eq!(gallery.tick(60_000), None);
        assert!(gallery.history().is_empty());
    }

    #[test]
    fn test_committed_query_is_trimmed() {
        let mut gallery = Gallery::default();
        gallery.on_input("  owl  ", 0);
        assert_eq!(gallery.tick(2000).as_deref(), Some("owl"));
    }

    #[test]
    fn test_whitespace_edit_keeps_query_but_restarts_timer() {
        let mut gallery = Gallery::default();
        assert!(gallery.on_input("cat", 0).is_some());
        assert!(gallery.on_input("cat ", 1500).is_none());
        assert_eq!(gallery.tick(2000), None);
        assert_eq!(gallery.tick(3500).as_deref(), Some("cat"));
    }

    #[test]
    fn test_query_change_resets_pages_and_loaded_set() {
        let mut gallery = Gallery::default();
        let first = gallery.on_input("cat", 0).unwrap();
        gallery.apply_page(PageResponse::new(first.clone(), Ok(page("c", 50))));
        assert!(gallery.mark_loaded(first.generation, "c0"));
        assert!(gallery.is_loaded("c0"));

        let second = gallery.on_input("dog", 10).unwrap();
        assert!(gallery.photos().is_empty());
        assert!(!gallery.is_loaded("c0"));
        assert_eq!(second.generation, first.generation + 1);

        assert!(!gallery.mark_loaded(first.generation, "c1"), "stale load ignored");
        assert!(!gallery.is_loaded("c1"));
    }

    #[test]
    fn test_select_then_reselect_then_close() {
        let mut gallery = Gallery::default();
        let p1 = sample_photo("p1");
        let p2 = sample_photo("p2");

        gallery.select_photo(p1);
        gallery.select_photo(p2.clone());
        assert_eq!(gallery.selected(), Some(&p2));

        gallery.close_selection();
        assert_eq!(gallery.selected(), None);
        gallery.close_selection();
        assert_eq!(gallery.selected(), None);
    }

    #[test]
    fn test_snapshot_reports_tiles_and_flags() {
        let mut gallery = Gallery::default();
        let request = gallery.on_input("cat", 0).unwrap();
        {
            let snap = gallery.snapshot();
            assert!(snap.is_loading);
            assert!(!snap.is_loading_more);
            assert!(snap.tiles.is_empty());
        }
        gallery.apply_page(PageResponse::new(request.clone(), Ok(page("c", 3))));
        gallery.mark_loaded(request.generation, "c1");
        let snap = gallery.snapshot();
        assert!(!snap.is_loading);
        assert!(snap.has_more);
        assert_eq!(snap.tiles.len(), 3);
        assert_eq!(
            snap.tiles.iter().map(|t| t.loaded).collect::<Vec<_>>(),
            [false, true, false]
        );
        assert_eq!(snap.query, &Query::parse("cat"));
    }

    #[test]
    fn test_snapshot_exposes_fetch_error_and_keeps_results() {
        let mut gallery = Gallery::default();
        let first = gallery.on_input("cat", 0).unwrap();
        gallery.apply_page(PageResponse::new(first, Ok(page("c", 50))));
        let next = gallery.load_next_page().unwrap();
        gallery.apply_page(PageResponse::new(
            next,
            Err(SourceError::Network("dns".to_string())),
        ));
        let snap = gallery.snapshot();
        assert_eq!(snap.tiles.len(), 50);
        assert!(!snap.is_loading_more);
        assert!(snap.has_more);
        assert_eq!(snap.error, Some(&SourceError::Network("dns".to_string())));
    }

    #[test]
    fn test_refresh_restarts_active_query() {
        let mut gallery = Gallery::default();
        let startup = gallery.refresh();
        assert_eq!(startup.page, PageRequest::Default);
        assert_eq!(startup.generation, 1);
        assert!(gallery.on_input("", 0).is_none(), "already on the default feed");
    }

    #[test]
    fn test_clear_history_removes_entries() {
        let mut gallery = Gallery::default();
        gallery.on_input("x", 0);
        gallery.tick(5000);
        gallery.clear_history();
        assert!(gallery.snapshot().history.is_empty());
    }
}
