//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range of the photo grid
//! - Grid geometry shared by rendering and mouse hit-testing

pub mod viewport;

mod overlays;
mod render;
mod status;

pub use overlays::photo_overlay_rect;
pub use render::render;

use ratatui::layout::Rect;

/// Search box (3 rows with border) plus the history chip row.
pub const HEADER_ROWS: u16 = 4;
/// Status bar below the grid.
pub const FOOTER_ROWS: u16 = 1;
/// Width of one grid tile, border included.
pub const TILE_WIDTH: u16 = 26;
/// Height of one grid tile, border included.
pub const TILE_HEIGHT: u16 = 12;
/// Placeholder tiles shown while the first page loads.
pub const SKELETON_TILES: usize = 20;

/// Area below the header and above the status bar.
pub fn grid_area(area: Rect) -> Rect {
    let top = HEADER_ROWS.min(area.height);
    Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height: area.height.saturating_sub(top + FOOTER_ROWS),
    }
}

/// Tile columns and visible tile rows for a terminal of the given size.
pub fn grid_shape(width: u16, height: u16) -> (usize, usize) {
    let grid = grid_area(Rect::new(0, 0, width, height));
    let columns = (grid.width / TILE_WIDTH).max(1);
    let rows = (grid.height / TILE_HEIGHT).max(1);
    (usize::from(columns), usize::from(rows))
}

/// Screen rect of the tile at (`row`, `column`) relative to the first visible row.
pub fn tile_rect(grid: Rect, row: usize, column: usize) -> Rect {
    let x = grid.x.saturating_add(u16::try_from(column).unwrap_or(u16::MAX).saturating_mul(TILE_WIDTH));
    let y = grid.y.saturating_add(u16::try_from(row).unwrap_or(u16::MAX).saturating_mul(TILE_HEIGHT));
    let right = grid.x.saturating_add(grid.width);
    let bottom = grid.y.saturating_add(grid.height);
    Rect {
        x,
        y,
        width: TILE_WIDTH.min(right.saturating_sub(x)),
        height: TILE_HEIGHT.min(bottom.saturating_sub(y)),
    }
}

/// Tile index under a terminal cell, given the grid's scroll state.
pub fn tile_at(
    area: Rect,
    viewport: &viewport::Viewport,
    column: u16,
    row: u16,
) -> Option<usize> {
    let grid = grid_area(area);
    if column < grid.x || row < grid.y || row >= grid.y + grid.height {
        return None;
    }
    let col = usize::from((column - grid.x) / TILE_WIDTH);
    let visible_row = usize::from((row - grid.y) / TILE_HEIGHT);
    if col >= viewport.columns() || visible_row >= viewport.rows() {
        return None;
    }
    let index = (viewport.offset() + visible_row) * viewport.columns() + col;
    (index < viewport.total_tiles()).then_some(index)
}

/// Whether a terminal cell falls inside the search box.
pub const fn in_search_box(area: Rect, row: u16) -> bool {
    row >= area.y && row < area.y + 3
}
