//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Network work never happens inside [`update`]. Transitions queue
//! [`Effect`]s on the model; the event loop hands them to a background
//! executor and feeds the results back in as messages.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Effect, Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

/// Main application struct that owns the terminal and runs the event loop.
#[derive(Debug, Clone, Default)]
pub struct App {
    initial_query: Option<String>,
    images_enabled: bool,
    force_half_cell: bool,
    history_dir: Option<PathBuf>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application showing the default feed.
    pub fn new() -> Self {
        Self {
            images_enabled: true,
            ..Self::default()
        }
    }

    /// Start with a search instead of the default feed.
    #[must_use]
    pub fn with_initial_query(mut self, query: Option<String>) -> Self {
        self.initial_query = query;
        self
    }

    /// Enable or disable thumbnail rendering.
    #[must_use]
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Force half-cell image rendering, bypassing terminal detection.
    #[must_use]
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }

    /// Store search history under `dir` instead of the platform data dir.
    #[must_use]
    pub fn with_history_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.history_dir = dir;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;
