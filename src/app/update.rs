use image::DynamicImage;

use crate::app::Model;
use crate::app::model::{Focus, ToastLevel};
use crate::pagination::{ApplyOutcome, PageResponse};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and results coming back from
/// background fetches.
#[derive(Debug, Clone)]
pub enum Message {
    // Search
    /// Search box text changed; carries the new text and the time of the edit
    SearchInput(String, u64),
    /// Advance the history debounce clock
    Tick(u64),
    /// Re-run the n-th history entry (0-based)
    PickHistory(usize, u64),
    /// Forget all remembered searches
    ClearHistory,
    /// Restart the active query from its first page
    Reload,

    // Focus
    FocusSearch,
    FocusGrid,
    /// Switch focus between search box and grid
    SwitchFocus,

    // Grid navigation
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Scroll up by n tile rows
    ScrollUp(usize),
    /// Scroll down by n tile rows
    ScrollDown(usize),
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    /// The last grid row came into view
    NearBottom,

    // Overlay
    /// Open the highlighted photo
    OpenSelected,
    /// Highlight and open the photo at an index (mouse click)
    SelectTile(usize),
    CloseOverlay,
    /// Show the previous photo in the overlay
    OverlayPrev,
    /// Show the next photo in the overlay
    OverlayNext,

    // Fetch results
    PageLoaded(PageResponse),
    ThumbnailLoaded {
        generation: u64,
        photo_id: String,
        result: Result<DynamicImage, String>,
    },
    LargeImageLoaded {
        photo_id: String,
        result: Result<DynamicImage, String>,
    },

    // Help
    ToggleHelp,
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Work that
/// needs I/O is queued on the model as effects for the event loop to run.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Search
        Message::SearchInput(text, now_ms) => {
            model.focus = Focus::Search;
            model.set_input(text, now_ms);
        }
        Message::Tick(now_ms) => {
            if let Some(query) = model.gallery.tick(now_ms) {
                tracing::debug!(%query, "search committed to history");
            }
        }
        Message::PickHistory(index, now_ms) => {
            if let Some(query) = model.gallery.history().get(index).cloned() {
                model.focus = Focus::Grid;
                model.set_input(query, now_ms);
            }
        }
        Message::ClearHistory => {
            model.gallery.clear_history();
            model.show_toast(ToastLevel::Info, "Search history cleared");
        }
        Message::Reload => {
            model.refresh();
            model.show_toast(ToastLevel::Info, "Reloading");
        }

        // Focus
        Message::FocusSearch => model.focus = Focus::Search,
        Message::FocusGrid => model.focus = Focus::Grid,
        Message::SwitchFocus => {
            model.focus = match model.focus {
                Focus::Search => Focus::Grid,
                Focus::Grid => Focus::Search,
            };
        }

        // Grid navigation
        Message::CursorLeft => {
            model.move_cursor_to(model.cursor.saturating_sub(1));
            model.load_more_if_near_bottom();
        }
        Message::CursorRight => {
            model.move_cursor_to(model.cursor + 1);
            model.load_more_if_near_bottom();
        }
        Message::CursorUp => {
            model.move_cursor_to(model.cursor.saturating_sub(model.viewport.columns()));
            model.load_more_if_near_bottom();
        }
        Message::CursorDown => {
            let next = model.cursor + model.viewport.columns();
            if next < model.gallery.photos().len() {
                model.move_cursor_to(next);
            }
            model.load_more_if_near_bottom();
        }
        Message::ScrollUp(n) => {
            model.viewport.scroll_up(n);
            model.follow_viewport();
        }
        Message::ScrollDown(n) => {
            model.viewport.scroll_down(n);
            model.follow_viewport();
            model.load_more_if_near_bottom();
        }
        Message::PageUp => {
            model.viewport.page_up();
            model.follow_viewport();
        }
        Message::PageDown => {
            model.viewport.page_down();
            model.follow_viewport();
            model.load_more_if_near_bottom();
        }
        Message::GoToTop => {
            model.viewport.go_to_top();
            model.move_cursor_to(0);
        }
        Message::GoToBottom => {
            model.move_cursor_to(model.gallery.photos().len().saturating_sub(1));
            model.load_more_if_near_bottom();
        }
        Message::NearBottom => model.request_more(),

        // Overlay
        Message::OpenSelected => {
            let index = model.cursor;
            model.open_photo(index);
        }
        Message::SelectTile(index) => model.open_photo(index),
        Message::CloseOverlay => model.close_overlay(),
        Message::OverlayPrev => {
            if model.gallery.selected().is_some() && model.cursor > 0 {
                let index = model.cursor - 1;
                model.open_photo(index);
            }
        }
        Message::OverlayNext => {
            if model.gallery.selected().is_some() {
                let index = model.cursor + 1;
                model.open_photo(index);
                model.load_more_if_near_bottom();
            }
        }

        // Fetch results
        Message::PageLoaded(response) => match model.gallery.apply_page(response) {
            ApplyOutcome::Stale => {}
            ApplyOutcome::Appended(count) => {
                tracing::debug!(count, total = model.gallery.photos().len(), "page appended");
                model.sync_grid();
                model.load_more_if_near_bottom();
            }
            ApplyOutcome::Exhausted => {
                model.sync_grid();
                if model.gallery.photos().is_empty() {
                    model.show_toast(
                        ToastLevel::Info,
                        format!("No photos found for {}", model.gallery.query()),
                    );
                }
            }
            ApplyOutcome::Failed(err) => {
                model.show_toast(ToastLevel::Error, format!("Fetch failed: {err}"));
            }
        },
        Message::ThumbnailLoaded {
            generation,
            photo_id,
            result,
        } => model.on_thumbnail(generation, photo_id, result),
        Message::LargeImageLoaded { photo_id, result } => {
            model.on_large_image(photo_id, result);
        }

        // Help
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,

        // Window
        Message::Resize(width, height) => {
            model.resize(width, height);
            model.load_more_if_near_bottom();
        }

        // Application
        Message::Quit => model.should_quit = true,
    }

    model
}
