use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::gallery::Gallery;
use crate::pagination::FetchRequest;
use crate::photo::ImageSize;
use crate::ui::viewport::Viewport;

/// Screens of tiles above and below the viewport whose thumbnails are requested.
const THUMBNAIL_LOOKAHEAD_SCREENS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives key input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Search,
    Grid,
}

/// Work for the executor, produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch a page of photo records.
    FetchPage(FetchRequest),
    /// Download a grid thumbnail for the query generation it was issued in.
    FetchThumbnail {
        generation: u64,
        photo_id: String,
        url: String,
    },
    /// Download the enlarged image for the overlay.
    FetchLarge { photo_id: String, url: String },
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Query, pages, history and selection
    pub gallery: Gallery,
    /// Raw text of the search box
    pub input: String,
    pub focus: Focus,
    /// Index of the highlighted tile
    pub cursor: usize,
    /// Grid scroll state
    pub viewport: Viewport,
    /// Terminal size the grid was laid out for
    pub terminal_size: (u16, u16),
    /// Image picker for terminal rendering
    pub picker: Option<Picker>,
    /// Whether thumbnails are downloaded and drawn
    pub images_enabled: bool,
    /// Render protocols for loaded thumbnails, keyed by photo id
    pub thumbnails: HashMap<String, StatefulProtocol>,
    /// Enlarged image for the overlay, tagged with its photo id
    pub large_image: Option<(String, StatefulProtocol)>,
    requested: HashSet<String>,
    failed: HashSet<String>,
    toast: Option<Toast>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// True when a resize is pending and image work should be paused
    resize_pending: bool,
    effects: Vec<Effect>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("query", self.gallery.query())
            .field("input", &self.input)
            .field("focus", &self.focus)
            .field("cursor", &self.cursor)
            .field("thumbnails", &self.thumbnails.len())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a new model for a terminal of the given size.
    pub fn new(gallery: Gallery, terminal_size: (u16, u16)) -> Self {
        let (columns, rows) = crate::ui::grid_shape(terminal_size.0, terminal_size.1);
        Self {
            gallery,
            input: String::new(),
            focus: Focus::Search,
            cursor: 0,
            viewport: Viewport::new(columns, rows, 0),
            terminal_size,
            picker: None,
            images_enabled: true,
            thumbnails: HashMap::new(),
            large_image: None,
            requested: HashSet::new(),
            failed: HashSet::new(),
            toast: None,
            help_visible: false,
            config_global_path: None,
            config_local_path: None,
            should_quit: false,
            resize_pending: false,
            effects: Vec::new(),
        }
    }

    /// Set the image picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Issue the first fetch: the given query, or the default feed.
    pub fn start(&mut self, initial_query: Option<&str>, now_ms: u64) {
        match initial_query.filter(|q| !q.trim().is_empty()) {
            Some(query) => {
                self.focus = Focus::Grid;
                self.set_input(query.to_string(), now_ms);
            }
            None => self.refresh(),
        }
    }

    /// Drain the effects produced since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Replace the search text and switch the active query if it changed.
    pub(super) fn set_input(&mut self, text: String, now_ms: u64) {
        let request = self.gallery.on_input(&text, now_ms);
        self.input = text;
        if let Some(request) = request {
            self.reset_grid();
            self.effects.push(Effect::FetchPage(request));
        }
    }

    /// Start the active query over from its first page.
    pub(super) fn refresh(&mut self) {
        let request = self.gallery.refresh();
        self.reset_grid();
        self.effects.push(Effect::FetchPage(request));
    }

    fn reset_grid(&mut self) {
        self.thumbnails.clear();
        self.requested.clear();
        self.failed.clear();
        self.cursor = 0;
        self.viewport.set_total_tiles(0);
        self.viewport.go_to_top();
    }

    /// Ask for the next page.
    pub(super) fn request_more(&mut self) {
        if let Some(request) = self.gallery.load_next_page() {
            tracing::debug!(?request, "requesting next page");
            self.effects.push(Effect::FetchPage(request));
        }
    }

    /// Ask for the next page when the last grid row is on screen and the
    /// grid already holds results.
    pub(super) fn load_more_if_near_bottom(&mut self) {
        if !self.gallery.photos().is_empty() && self.viewport.shows_last_row() {
            self.request_more();
        }
    }

    /// Bring the viewport and cursor in line with the number of photos.
    pub(super) fn sync_grid(&mut self) {
        let total = self.gallery.photos().len();
        self.viewport.set_total_tiles(total);
        self.cursor = self.cursor.min(total.saturating_sub(1));
    }

    pub(super) fn move_cursor_to(&mut self, index: usize) {
        let total = self.gallery.photos().len();
        if total == 0 {
            return;
        }
        self.cursor = index.min(total - 1);
        self.viewport.ensure_row_visible(self.viewport.row_of(self.cursor));
    }

    /// Keep the cursor on screen after the viewport scrolled.
    pub(super) fn follow_viewport(&mut self) {
        let rows = self.viewport.visible_rows();
        if rows.is_empty() {
            return;
        }
        let row = self.viewport.row_of(self.cursor);
        let column = self.cursor % self.viewport.columns();
        let target_row = row.clamp(rows.start, rows.end - 1);
        if target_row != row {
            let index = target_row * self.viewport.columns() + column;
            self.cursor = index.min(self.gallery.photos().len().saturating_sub(1));
        }
    }

    pub(super) fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let (columns, rows) = crate::ui::grid_shape(width, height);
        self.viewport.resize(columns, rows);
        if !self.gallery.photos().is_empty() {
            self.viewport
                .ensure_row_visible(self.viewport.row_of(self.cursor));
        }
    }

    /// Show the photo at `index` in the overlay and request its large image.
    pub(super) fn open_photo(&mut self, index: usize) {
        let Some(photo) = self.gallery.photos().get(index).cloned() else {
            return;
        };
        self.cursor = index;
        self.viewport.ensure_row_visible(self.viewport.row_of(index));
        if self
            .large_image
            .as_ref()
            .is_none_or(|(id, _)| *id != photo.id)
        {
            self.large_image = None;
            if self.images_enabled && self.picker.is_some() {
                self.effects.push(Effect::FetchLarge {
                    photo_id: photo.id.clone(),
                    url: photo.image_url_sized(ImageSize::Large),
                });
            }
        }
        self.gallery.select_photo(photo);
    }

    pub(super) fn close_overlay(&mut self) {
        self.gallery.close_selection();
        self.large_image = None;
    }

    /// Request thumbnails for tiles on or near the screen.
    ///
    /// Returns how many downloads were queued.
    pub fn queue_visible_thumbnails(&mut self) -> usize {
        if self.resize_pending || !self.images_enabled || self.picker.is_none() {
            return 0;
        }
        let generation = self.gallery.generation();
        let range = self.viewport.lookahead_tiles(THUMBNAIL_LOOKAHEAD_SCREENS);
        let queued: Vec<Effect> = self
            .gallery
            .photos()
            .get(range)
            .unwrap_or_default()
            .iter()
            .filter(|photo| !self.requested.contains(&photo.id))
            .map(|photo| Effect::FetchThumbnail {
                generation,
                photo_id: photo.id.clone(),
                url: photo.image_url_sized(ImageSize::Square),
            })
            .collect();
        for effect in &queued {
            if let Effect::FetchThumbnail { photo_id, .. } = effect {
                self.requested.insert(photo_id.clone());
            }
        }
        let count = queued.len();
        self.effects.extend(queued);
        count
    }

    pub(super) fn on_thumbnail(
        &mut self,
        generation: u64,
        photo_id: String,
        result: Result<DynamicImage, String>,
    ) {
        if generation != self.gallery.generation() {
            tracing::debug!(%photo_id, generation, "dropping thumbnail for earlier query");
            return;
        }
        match result {
            Ok(image) => {
                if let Some(picker) = &self.picker {
                    let protocol = crate::image::protocol_for(picker, image);
                    self.thumbnails.insert(photo_id.clone(), protocol);
                }
                self.gallery.mark_loaded(generation, &photo_id);
            }
            Err(err) => {
                tracing::warn!(%photo_id, %err, "thumbnail failed");
                self.failed.insert(photo_id);
            }
        }
    }

    pub(super) fn on_large_image(&mut self, photo_id: String, result: Result<DynamicImage, String>) {
        let still_selected = self
            .gallery
            .selected()
            .is_some_and(|photo| photo.id == photo_id);
        if !still_selected {
            return;
        }
        match result {
            Ok(image) => {
                if let Some(picker) = &self.picker {
                    self.large_image = Some((photo_id, crate::image::protocol_for(picker, image)));
                }
            }
            Err(err) => {
                tracing::warn!(%photo_id, %err, "large image failed");
                self.show_toast(ToastLevel::Warning, format!("Image unavailable: {err}"));
            }
        }
    }

    /// Whether the thumbnail for `photo_id` failed to download or decode.
    pub fn thumbnail_failed(&self, photo_id: &str) -> bool {
        self.failed.contains(photo_id)
    }

    pub(super) const fn set_resize_pending(&mut self, pending: bool) {
        self.resize_pending = pending;
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(Gallery::default(), (80, 24))
    }
}
