use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let pager = model.gallery.pagination();
    let count = pager.photos().len();

    let state = if pager.is_loading() {
        " [loading]"
    } else if pager.is_loading_more() {
        " [loading more]"
    } else if pager.last_error().is_some() {
        " [fetch failed]"
    } else if count > 0 && !pager.can_load_more() {
        " [end]"
    } else {
        ""
    };
    let position = if count == 0 {
        String::new()
    } else {
        format!(
            "  Photo {}/{}  {}%",
            model.cursor + 1,
            count,
            model.viewport.scroll_percent()
        )
    };
    let history_pending = if model.gallery.history_commit_pending() {
        " *"
    } else {
        ""
    };

    let status = format!(
        " {}{}  {} photos{}{}  ?:help",
        model.gallery.query(),
        history_pending,
        count,
        position,
        state
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        crate::app::ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        crate::app::ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        crate::app::ToastLevel::Error => {
            ("[error]", Style::default().bg(Color::Red).fg(Color::White))
        }
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
