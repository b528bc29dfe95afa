use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use ratatui_image::{Resize, StatefulImage};

use crate::app::Model;

use super::render::truncate_to_width;

/// Popup area for the enlarged photo.
pub fn photo_overlay_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(8).max(30);
    let height = area.height.saturating_sub(4).max(10);
    centered_popup_rect(width, height, area)
}

pub fn render_photo_overlay(model: &mut Model, frame: &mut Frame, area: Rect) {
    let Some(photo) = model.gallery.selected().cloned() else {
        return;
    };
    let popup = photo_overlay_rect(area);
    let title = truncate_to_width(
        photo.display_title(),
        usize::from(popup.width.saturating_sub(4)),
    );
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Two rows of details and one of key hints under the image.
    let footer_rows = 3.min(inner.height);
    let image_area = Rect {
        height: inner.height.saturating_sub(footer_rows),
        ..inner
    };
    let footer_area = Rect {
        y: inner.y + image_area.height,
        height: footer_rows,
        ..inner
    };

    let image = StatefulImage::default().resize(Resize::Scale(None));
    match model.large_image.as_mut() {
        Some((id, protocol)) if *id == photo.id => {
            frame.render_stateful_widget(image, image_area, protocol);
        }
        _ => {
            if let Some(protocol) = model.thumbnails.get_mut(&photo.id) {
                frame.render_stateful_widget(image, image_area, protocol);
            } else {
                let label = if model.images_enabled {
                    "Loading image"
                } else {
                    "Images disabled"
                };
                let label_area = Rect {
                    y: image_area.y + image_area.height / 2,
                    height: 1.min(image_area.height),
                    ..image_area
                };
                frame.render_widget(
                    Paragraph::new(label)
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(Color::Indexed(245))),
                    label_area,
                );
            }
        }
    }

    let dim = Style::default().fg(Color::Indexed(245));
    let footer = vec![
        Line::from(vec![
            Span::styled("by ", dim),
            Span::styled(photo.owner.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  id {}", photo.id), dim),
        ]),
        Line::styled(photo.image_url(), dim),
        Line::styled("h/l browse \u{2502} Esc closes", dim),
    ];
    frame.render_widget(Paragraph::new(footer), footer_area);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Search", section_style));
    lines.push(Line::raw("  / or Tab            Focus search box"));
    lines.push(Line::raw("  Backspace / Ctrl-u  Delete char / clear"));
    lines.push(Line::raw("  Enter / Down        Back to grid"));
    lines.push(Line::raw("  1-5                 Re-run recent search"));
    lines.push(Line::raw("  X                   Clear recent searches"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Grid", section_style));
    lines.push(Line::raw("  hjkl or arrows      Move"));
    lines.push(Line::raw("  Space/PageDown      Page down"));
    lines.push(Line::raw("  b/PageUp            Page up"));
    lines.push(Line::raw("  g / G               First / last photo"));
    lines.push(Line::raw("  Enter or click      Open photo"));
    lines.push(Line::raw("  n                   Load more"));
    lines.push(Line::raw("  r                   Reload"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Other", section_style));
    lines.push(Line::raw("  Esc                 Close photo"));
    lines.push(Line::raw("  q / Ctrl-c          Quit"));
    lines.push(Line::raw("  ? / F1              Toggle help"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
