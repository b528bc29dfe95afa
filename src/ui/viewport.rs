//! Viewport management for the photo grid.
//!
//! The [`Viewport`] tracks which rows of tiles are on screen and handles
//! all scroll operations. Offsets are measured in tile rows, not terminal
//! lines.

use std::ops::Range;

/// Manages the visible portion of the photo grid.
///
/// The viewport tracks:
/// - Grid shape (tile columns, visible tile rows)
/// - Current scroll offset (in tile rows)
/// - Total number of tiles
///
/// # Example
///
/// ```
/// use photogrid::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(4, 3, 50);
/// assert_eq!(vp.total_rows(), 13);
/// assert_eq!(vp.visible_tiles(), 0..12);
///
/// vp.scroll_down(2);
/// assert_eq!(vp.visible_tiles(), 8..20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    columns: usize,
    rows: usize,
    offset: usize,
    total_tiles: usize,
}

impl Viewport {
    /// Create a new viewport.
    ///
    /// # Arguments
    ///
    /// * `columns` - Tiles per grid row (at least 1)
    /// * `rows` - Tile rows that fit on screen (at least 1)
    /// * `total_tiles` - Number of tiles in the grid
    pub fn new(columns: usize, rows: usize, total_tiles: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
            offset: 0,
            total_tiles,
        }
    }

    /// First visible tile row.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Tile rows that fit on screen.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn total_tiles(&self) -> usize {
        self.total_tiles
    }

    /// Number of tile rows needed for all tiles.
    pub const fn total_rows(&self) -> usize {
        self.total_tiles.div_ceil(self.columns)
    }

    /// Grid row holding tile `index`.
    pub const fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    /// Range of visible tile rows, clamped to the grid.
    pub fn visible_rows(&self) -> Range<usize> {
        let start = self.offset;
        let end = (self.offset + self.rows).min(self.total_rows());
        start..end.max(start)
    }

    /// Range of tile indices that are on screen.
    pub fn visible_tiles(&self) -> Range<usize> {
        let rows = self.visible_rows();
        let start = (rows.start * self.columns).min(self.total_tiles);
        let end = (rows.end * self.columns).min(self.total_tiles);
        start..end
    }

    /// Tile indices on screen plus `screens` screenfuls above and below.
    pub fn lookahead_tiles(&self, screens: usize) -> Range<usize> {
        let extra = self.rows * screens;
        let first_row = self.offset.saturating_sub(extra);
        let last_row = (self.offset + self.rows + extra).min(self.total_rows());
        let start = (first_row * self.columns).min(self.total_tiles);
        let end = (last_row * self.columns).min(self.total_tiles);
        start..end
    }

    /// Whether the last grid row is on screen.
    pub fn shows_last_row(&self) -> bool {
        self.total_rows() == 0 || self.offset + self.rows >= self.total_rows()
    }

    /// Get the scroll percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }

        // Percentage value always 0-100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    /// Scroll up by n rows.
    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    /// Scroll down by n rows.
    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.rows);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.rows);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    /// Scroll the minimum distance that puts `row` on screen.
    pub fn ensure_row_visible(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + self.rows {
            self.offset = row + 1 - self.rows;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    /// Resize the grid. The first visible tile stays on screen.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        let first_tile = self.offset * self.columns;
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self.offset = (first_tile / self.columns).min(self.max_offset());
    }

    /// Update the number of tiles (after a page lands or a reset).
    pub fn set_total_tiles(&mut self, total: usize) {
        self.total_tiles = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_rows().saturating_sub(self.rows)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}
