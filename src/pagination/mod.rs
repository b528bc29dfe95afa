//! Incremental pagination over the remote source.
//!
//! The controller never performs I/O. Commands return a [`FetchRequest`]
//! for the caller to execute, and the outcome comes back through
//! [`PaginationController::apply`] as a [`PageResponse`].
//!
//! Every request carries the generation it was issued for. A query change
//! bumps the generation, so results that arrive late for an earlier query
//! are recognised and dropped.

use crate::photo::{Photo, Query};
use crate::source::{PageRequest, SourceError};

/// A page fetch the caller should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub page: PageRequest,
}

/// Result of running a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub generation: u64,
    pub page: PageRequest,
    pub result: Result<Vec<Photo>, SourceError>,
}

impl PageResponse {
    pub fn new(request: FetchRequest, result: Result<Vec<Photo>, SourceError>) -> Self {
        Self {
            generation: request.generation,
            page: request.page,
            result,
        }
    }
}

/// What applying a response did to the page state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response belonged to an earlier query or page and was dropped.
    Stale,
    /// Photos were appended; carries how many.
    Appended(usize),
    /// The page was empty; no further pages will be requested.
    Exhausted,
    /// The fetch failed; state is unchanged apart from the error.
    Failed(SourceError),
}

/// Accumulated results for the active query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub accumulated: Vec<Photo>,
    pub next_page: u32,
    pub has_more: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            accumulated: Vec::new(),
            next_page: 1,
            has_more: true,
        }
    }
}

/// Tracks pages for the active query and guards against overlapping and
/// stale fetches.
#[derive(Debug, Clone, Default)]
pub struct PaginationController {
    query: Query,
    state: PageState,
    generation: u64,
    in_flight: Option<PageRequest>,
    last_error: Option<SourceError>,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `query`, resetting all page state, and request its first page.
    pub fn on_query_change(&mut self, query: Query) -> FetchRequest {
        self.generation += 1;
        self.state = PageState::default();
        self.last_error = None;
        self.query = query;
        let page = match &self.query {
            Query::Default => PageRequest::Default,
            Query::Search(text) => PageRequest::Search {
                text: text.clone(),
                page: 1,
            },
        };
        tracing::debug!(generation = self.generation, query = %self.query, "query changed");
        self.issue(page)
    }

    /// Request the next page, unless one is already in flight, the results
    /// are exhausted, or the active query is the single-page default feed.
    pub fn load_next_page(&mut self) -> Option<FetchRequest> {
        if self.in_flight.is_some() || !self.state.has_more {
            return None;
        }
        let page = match &self.query {
            Query::Default if self.state.accumulated.is_empty() => PageRequest::Default,
            Query::Default => return None,
            Query::Search(text) => PageRequest::Search {
                text: text.clone(),
                page: self.state.next_page,
            },
        };
        Some(self.issue(page))
    }

    /// Fold a completed fetch into the page state.
    pub fn apply(&mut self, response: PageResponse) -> ApplyOutcome {
        if response.generation != self.generation
            || self.in_flight.as_ref() != Some(&response.page)
        {
            tracing::debug!(
                generation = response.generation,
                current = self.generation,
                "dropping stale page response"
            );
            return ApplyOutcome::Stale;
        }
        self.in_flight = None;

        match response.result {
            Ok(photos) if photos.is_empty() => {
                self.last_error = None;
                self.state.has_more = false;
                ApplyOutcome::Exhausted
            }
            Ok(photos) => {
                self.last_error = None;
                let count = photos.len();
                self.state.accumulated.extend(photos);
                if matches!(response.page, PageRequest::Search { .. }) {
                    self.state.next_page += 1;
                }
                ApplyOutcome::Appended(count)
            }
            Err(err) => {
                tracing::warn!(%err, query = %self.query, "page fetch failed");
                self.last_error = Some(err.clone());
                ApplyOutcome::Failed(err)
            }
        }
    }

    fn issue(&mut self, page: PageRequest) -> FetchRequest {
        self.in_flight = Some(page.clone());
        FetchRequest {
            generation: self.generation,
            page,
        }
    }

    pub const fn query(&self) -> &Query {
        &self.query
    }

    pub const fn state(&self) -> &PageState {
        &self.state
    }

    pub fn photos(&self) -> &[Photo] {
        &self.state.accumulated
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the first page of the active query is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() && self.state.accumulated.is_empty()
    }

    /// Whether a follow-up page is outstanding.
    pub fn is_loading_more(&self) -> bool {
        self.in_flight.is_some() && !self.state.accumulated.is_empty()
    }

    /// Whether scrolling further could produce more results.
    pub fn can_load_more(&self) -> bool {
        self.state.has_more && !(self.query.is_default() && !self.state.accumulated.is_empty())
    }

    pub const fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }
}
