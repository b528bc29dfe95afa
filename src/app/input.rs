use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::model::Focus;
use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Self::handle_key(*key, model, now_ms)
            }
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model, now_ms: u64) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::F(1) => Some(Message::HideHelp),
                _ => None,
            };
        }

        if model.gallery.selected().is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | ' ') => {
                    Some(Message::CloseOverlay)
                }
                KeyCode::Left | KeyCode::Char('h') => Some(Message::OverlayPrev),
                KeyCode::Right | KeyCode::Char('l') => Some(Message::OverlayNext),
                _ => None,
            };
        }

        match model.focus {
            Focus::Search => Self::handle_search_key(key, model, now_ms),
            Focus::Grid => Self::handle_grid_key(key, model, now_ms),
        }
    }

    fn handle_search_key(key: KeyEvent, model: &Model, now_ms: u64) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => Some(Message::SearchInput(String::new(), now_ms)),
            KeyCode::Char(_) if ctrl => None,
            KeyCode::Char(c) => {
                let mut text = model.input.clone();
                text.push(c);
                Some(Message::SearchInput(text, now_ms))
            }
            KeyCode::Backspace => {
                let mut text = model.input.clone();
                text.pop()?;
                Some(Message::SearchInput(text, now_ms))
            }
            KeyCode::Enter | KeyCode::Down | KeyCode::Esc => Some(Message::FocusGrid),
            KeyCode::Tab => Some(Message::SwitchFocus),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    fn handle_grid_key(key: KeyEvent, model: &Model, now_ms: u64) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('/') => Some(Message::FocusSearch),
            KeyCode::Tab => Some(Message::SwitchFocus),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::CursorLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::CursorRight),
            KeyCode::Up | KeyCode::Char('k') => {
                if model.cursor < model.viewport.columns() {
                    Some(Message::FocusSearch)
                } else {
                    Some(Message::CursorUp)
                }
            }
            KeyCode::Down | KeyCode::Char('j') => Some(Message::CursorDown),
            KeyCode::PageUp | KeyCode::Char('b') => Some(Message::PageUp),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Message::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::GoToTop),
            KeyCode::End | KeyCode::Char('G') => Some(Message::GoToBottom),
            KeyCode::Enter => Some(Message::OpenSelected),
            KeyCode::Char('n') => Some(Message::NearBottom),
            KeyCode::Char('r') => Some(Message::Reload),
            KeyCode::Char('X') => Some(Message::ClearHistory),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                Some(Message::PickHistory(index, now_ms))
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        let area = Rect::new(0, 0, model.terminal_size.0, model.terminal_size.1);

        if model.gallery.selected().is_some() {
            return match mouse.kind {
                MouseEventKind::Up(MouseButton::Left) => Some(Message::CloseOverlay),
                MouseEventKind::ScrollDown => Some(Message::OverlayNext),
                MouseEventKind::ScrollUp => Some(Message::OverlayPrev),
                _ => None,
            };
        }

        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(1)),
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(1)),
            MouseEventKind::Up(MouseButton::Left) => {
                if crate::ui::in_search_box(area, mouse.row) {
                    return Some(Message::FocusSearch);
                }
                crate::ui::tile_at(area, &model.viewport, mouse.column, mouse.row)
                    .map(Message::SelectTile)
            }
            _ => None,
        }
    }
}
