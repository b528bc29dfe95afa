use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui_image::{Resize, StatefulImage};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{Focus, Model};

use super::{FOOTER_ROWS, HEADER_ROWS, SKELETON_TILES, grid_area, overlays, status, tile_rect};

const SKELETON_STYLE: Style = Style::new().bg(Color::Indexed(236)).fg(Color::Indexed(244));

/// What a tile needs for drawing, copied out so protocols can be borrowed mutably.
struct TileView {
    index: usize,
    id: String,
    title: String,
    loaded: bool,
    failed: bool,
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();

    let header_area = Rect {
        height: HEADER_ROWS.min(area.height),
        ..area
    };
    let grid = grid_area(area);
    let toast_active = model.active_toast().is_some();
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(FOOTER_ROWS),
        height: FOOTER_ROWS.min(area.height),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(FOOTER_ROWS + 1),
        height: 1.min(area.height),
        ..area
    };

    render_header(model, frame, header_area);
    render_grid(model, frame, grid);
    status::render_status_bar(model, frame, status_area);
    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }

    if model.gallery.selected().is_some() {
        overlays::render_photo_overlay(model, frame, area);
    }
    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_header(model: &Model, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let focused = model.focus == Focus::Search;
    let search_area = Rect {
        height: area.height.min(3),
        ..area
    };
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let line = if model.input.is_empty() && !focused {
        Line::styled(
            "Type / to search (showing recent photos)",
            Style::default().fg(Color::Indexed(245)),
        )
    } else {
        let mut spans = vec![Span::raw(model.input.clone())];
        if focused {
            spans.push(Span::styled(" ", Style::default().bg(Color::White)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line).block(block), search_area);

    if area.height > 3 {
        let chips_area = Rect {
            y: area.y + 3,
            height: 1,
            ..area
        };
        let chips = history_chips(model.gallery.history(), usize::from(area.width));
        frame.render_widget(Paragraph::new(chips), chips_area);
    }
}

/// One line listing recent searches as numbered chips.
pub(super) fn history_chips(history: &[String], max_width: usize) -> Line<'static> {
    let dim = Style::default().fg(Color::Indexed(245));
    if history.is_empty() {
        return Line::styled(" No recent searches", dim);
    }
    let mut spans = vec![Span::styled(" Recent:", dim)];
    let mut used = " Recent:".width();
    for (idx, query) in history.iter().enumerate() {
        let number = format!(" {} ", idx + 1);
        let remaining = max_width.saturating_sub(used + number.width() + 1);
        if remaining < 2 {
            break;
        }
        let label = truncate_to_width(query, remaining.min(24));
        used += number.width() + label.width() + 1;
        spans.push(Span::styled(
            number,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(label, Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_grid(model: &mut Model, frame: &mut Frame, grid: Rect) {
    frame.render_widget(Clear, grid);
    if grid.height == 0 || grid.width == 0 {
        return;
    }

    let snapshot = model.gallery.snapshot();
    if snapshot.tiles.is_empty() {
        if snapshot.is_loading {
            render_skeleton_grid(model, frame, grid);
            return;
        }
        let (message, style) = match snapshot.error {
            Some(err) => (
                format!("Could not load photos: {err}\n\nPress r to retry"),
                Style::default().fg(Color::Red),
            ),
            None => (
                format!("No photos found for {}", snapshot.query),
                Style::default().fg(Color::Indexed(245)),
            ),
        };
        let y = grid.y + grid.height / 3;
        let message_area = Rect {
            y,
            height: grid.height.saturating_sub(y - grid.y),
            ..grid
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(style)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            message_area,
        );
        return;
    }

    let columns = model.viewport.columns();
    let visible = model.viewport.visible_tiles();
    let first_row = model.viewport.offset();
    let views: Vec<TileView> = snapshot
        .tiles
        .iter()
        .enumerate()
        .skip(visible.start)
        .take(visible.len())
        .map(|(index, tile)| TileView {
            index,
            id: tile.photo.id.clone(),
            title: tile.photo.display_title().to_string(),
            loaded: tile.loaded,
            failed: model.thumbnail_failed(&tile.photo.id),
        })
        .collect();
    drop(snapshot);

    let grid_focused = model.focus == Focus::Grid;
    for view in views {
        let rect = tile_rect(grid, view.index / columns - first_row, view.index % columns);
        if rect.width < 3 || rect.height < 3 {
            continue;
        }
        let is_cursor = view.index == model.cursor;
        let border_style = match (is_cursor, grid_focused) {
            (true, true) => Style::default().fg(Color::Yellow),
            (true, false) => Style::default().fg(Color::White),
            _ => Style::default().fg(Color::DarkGray),
        };
        let title = truncate_to_width(&view.title, usize::from(rect.width.saturating_sub(2)));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_bottom(Line::styled(title, Style::default().fg(Color::White)));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if view.loaded
            && let Some(protocol) = model.thumbnails.get_mut(&view.id)
        {
            let image = StatefulImage::default().resize(Resize::Scale(None));
            frame.render_stateful_widget(image, inner, protocol);
            continue;
        }

        let label = if view.failed {
            "image unavailable"
        } else if model.images_enabled {
            "loading"
        } else {
            ""
        };
        render_placeholder(frame, inner, label);
    }
}

fn render_skeleton_grid(model: &Model, frame: &mut Frame, grid: Rect) {
    let columns = model.viewport.columns();
    let capacity = columns * model.viewport.rows();
    for index in 0..SKELETON_TILES.min(capacity) {
        let rect = tile_rect(grid, index / columns, index % columns);
        if rect.width < 3 || rect.height < 3 {
            continue;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        render_placeholder(frame, inner, "");
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, label: &str) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(Paragraph::new("").style(SKELETON_STYLE), area);
    if !label.is_empty() {
        let label_area = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new(label)
                .style(SKELETON_STYLE)
                .alignment(Alignment::Center),
            label_area,
        );
    }
}

/// Cut `text` to at most `max_width` display columns, marking the cut with `…`.
pub(super) fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
