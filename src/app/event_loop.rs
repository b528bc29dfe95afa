use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::Executor;
use crate::app::{App, Message, Model, update};
use crate::gallery::Gallery;
use crate::history::{FileStore, HistoryStore, default_history_dir};
use crate::source::PhotoSource;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop against `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch runtime cannot start, the terminal
    /// cannot be initialized, or the event loop hits an I/O failure.
    pub fn run<S: PhotoSource>(&mut self, source: S) -> Result<()> {
        let executor = Executor::new(source)?;

        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker = if self.images_enabled {
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let history_dir = self
            .history_dir
            .clone()
            .unwrap_or_else(default_history_dir);
        tracing::debug!(dir = %history_dir.display(), "opening search history");
        let history = HistoryStore::open(Box::new(FileStore::new(history_dir)));

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; photogrid requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model =
            Model::new(Gallery::new(history), (size.width, size.height)).with_picker(picker);
        model.images_enabled = self.images_enabled && model.picker.is_some();
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model.start(self.initial_query.as_deref(), 0);
        Self::handle_message_side_effects(&mut model, &executor);

        let result = execute!(stdout(), EnableMouseCapture)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model, &executor));

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn apply<S: PhotoSource>(model: &mut Model, executor: &Executor<S>, msg: Message) {
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, executor);
    }

    fn event_loop<S: PhotoSource>(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        executor: &Executor<S>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "applying resize");
                Self::apply(model, executor, Message::Resize(width, height));
                needs_render = true;
            }

            // Fold in everything the background tasks finished.
            while let Some(msg) = executor.try_recv() {
                Self::apply(model, executor, msg);
                needs_render = true;
            }

            if model.gallery.history_commit_pending() {
                Self::apply(model, executor, Message::Tick(now_ms));
                if !model.gallery.history_commit_pending() {
                    needs_render = true;
                }
            }

            model.set_resize_pending(resize_debouncer.is_pending());

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else if executor.has_pending() || model.gallery.history_commit_pending() {
                30
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    tracing::trace!(?msg, "event");
                    Self::apply(model, executor, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        Self::apply(model, executor, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                // Request thumbnails near the viewport before rendering
                if model.queue_visible_thumbnails() > 0 {
                    Self::handle_message_side_effects(model, executor);
                }
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
