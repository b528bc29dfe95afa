//! Debounced search-history commits.
//!
//! Time is passed in as milliseconds since an arbitrary origin so the
//! event loop, and tests, control the clock.

/// Idle time after the last keystroke before a query is remembered.
pub const HISTORY_COMMIT_DELAY_MS: u64 = 2000;

/// An owned, cancelable timer holding at most one pending query.
///
/// Queuing replaces any earlier pending query, so only the input that
/// survives a full quiet period is ever released.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay_ms: u64,
    pending: Option<(String, u64)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(HISTORY_COMMIT_DELAY_MS)
    }
}

impl SearchDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Start (or restart) the timer for `query`.
    pub fn queue(&mut self, query: impl Into<String>, now_ms: u64) {
        self.pending = Some((query.into(), now_ms));
    }

    /// Release the pending query once the delay has passed.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<String> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(query, _)| query)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
