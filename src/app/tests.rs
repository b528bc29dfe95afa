use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use image::{DynamicImage, RgbImage};
use ratatui_image::picker::Picker;

use crate::gallery::Gallery;
use crate::history::{HistoryStore, MemoryStore};
use crate::pagination::{FetchRequest, PageResponse};
use crate::photo::{Photo, sample_photo};
use crate::source::{PageRequest, SourceError};

use super::event_loop::ResizeDebouncer;
use super::{App, Effect, Focus, Message, Model, ToastLevel, update};

/// 80x40 lays out as 3 columns by 2 visible rows of tiles.
fn create_test_model() -> Model {
    Model::new(Gallery::default(), (80, 40))
}

fn page(prefix: &str, n: usize) -> Vec<Photo> {
    (0..n).map(|i| sample_photo(&format!("{prefix}{i}"))).collect()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn fetches(effects: &[Effect]) -> Vec<FetchRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchPage(request) => Some(request.clone()),
            _ => None,
        })
        .collect()
}

fn only_fetch(model: &mut Model) -> FetchRequest {
    let requests = fetches(&model.take_effects());
    assert_eq!(requests.len(), 1, "expected exactly one page fetch");
    requests.into_iter().next().unwrap()
}

fn deliver(model: Model, request: FetchRequest, result: Result<Vec<Photo>, SourceError>) -> Model {
    update(model, Message::PageLoaded(PageResponse::new(request, result)))
}

/// Model showing a search for "cat" with one loaded page of `n` photos.
fn searched_model(n: usize) -> Model {
    let mut model = create_test_model();
    model.start(Some("cat"), 0);
    let request = only_fetch(&mut model);
    deliver(model, request, Ok(page("c", n)))
}

fn tiny_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(4, 4))
}

#[test]
fn test_start_without_query_fetches_default_feed() {
    let mut model = create_test_model();
    model.start(None, 0);
    let request = only_fetch(&mut model);
    assert_eq!(request.page, PageRequest::Default);
    assert_eq!(model.focus, Focus::Search);
    assert!(model.gallery.pagination().is_loading());
}

#[test]
fn test_start_with_query_searches_and_focuses_grid() {
    let mut model = create_test_model();
    model.start(Some("owls"), 0);
    let request = only_fetch(&mut model);
    assert_eq!(
        request.page,
        PageRequest::Search {
            text: "owls".to_string(),
            page: 1
        }
    );
    assert_eq!(model.input, "owls");
    assert_eq!(model.focus, Focus::Grid);
}

#[test]
fn test_search_input_switches_query_and_resets_grid() {
    let mut model = searched_model(10);
    model.cursor = 7;

    let mut model = update(model, Message::SearchInput("dog".to_string(), 100));
    let request = only_fetch(&mut model);
    assert_eq!(
        request.page,
        PageRequest::Search {
            text: "dog".to_string(),
            page: 1
        }
    );
    assert_eq!(model.cursor, 0);
    assert!(model.gallery.photos().is_empty());
    assert_eq!(model.viewport.total_tiles(), 0);
}

#[test]
fn test_trailing_space_does_not_refetch() {
    let mut model = searched_model(10);
    let mut model = update(model, Message::SearchInput("cat ".to_string(), 100));
    assert!(model.take_effects().is_empty());
    assert_eq!(model.gallery.photos().len(), 10);
    assert_eq!(model.input, "cat ");
}

#[test]
fn test_page_loaded_fills_grid() {
    let model = searched_model(10);
    assert_eq!(model.viewport.total_tiles(), 10);
    assert_eq!(model.viewport.total_rows(), 4);
    assert!(!model.gallery.pagination().is_fetching());
}

#[test]
fn test_short_first_page_loads_more_immediately() {
    let mut model = create_test_model();
    model.start(Some("cat"), 0);
    let first = only_fetch(&mut model);
    let mut model = deliver(model, first, Ok(page("c", 4)));

    // Two rows of three fit on screen, so the last row is already visible.
    let next = only_fetch(&mut model);
    assert_eq!(
        next.page,
        PageRequest::Search {
            text: "cat".to_string(),
            page: 2
        }
    );
}

#[test]
fn test_cursor_reaching_last_row_requests_next_page_once() {
    let mut model = searched_model(50);
    assert!(model.take_effects().is_empty());

    for _ in 0..16 {
        model = update(model, Message::CursorDown);
    }
    let requests = fetches(&model.take_effects());
    assert_eq!(requests.len(), 1, "in-flight page blocks duplicates");
    assert_eq!(
        requests[0].page,
        PageRequest::Search {
            text: "cat".to_string(),
            page: 2
        }
    );

    let model = update(model, Message::NearBottom);
    let mut model = update(model, Message::CursorDown);
    assert!(fetches(&model.take_effects()).is_empty());
}

#[test]
fn test_default_feed_never_asks_for_second_page() {
    let mut model = create_test_model();
    model.start(None, 0);
    let request = only_fetch(&mut model);
    let mut model = deliver(model, request, Ok(page("r", 4)));
    assert!(model.take_effects().is_empty());
    let mut model = update(model, Message::NearBottom);
    assert!(model.take_effects().is_empty());
}

#[test]
fn test_failed_page_shows_error_without_retrying() {
    let mut model = searched_model(50);
    model = update(model, Message::GoToBottom);
    let next = only_fetch(&mut model);

    let mut model = deliver(model, next, Err(SourceError::Network("timeout".to_string())));
    assert!(model.take_effects().is_empty(), "no automatic retry");
    assert_eq!(model.gallery.photos().len(), 50);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("timeout"));

    // Scrolling again retries the same page.
    let mut model = update(model, Message::CursorRight);
    let retry = only_fetch(&mut model);
    assert_eq!(
        retry.page,
        PageRequest::Search {
            text: "cat".to_string(),
            page: 2
        }
    );
}

#[test]
fn test_late_page_for_previous_query_is_dropped() {
    let mut model = create_test_model();
    model.start(Some("cat"), 0);
    let cat = only_fetch(&mut model);
    let mut model = update(model, Message::SearchInput("dog".to_string(), 50));
    let _dog = only_fetch(&mut model);

    let model = deliver(model, cat, Ok(page("c", 50)));
    assert!(model.gallery.photos().is_empty());
    assert!(model.gallery.pagination().is_loading());
}

#[test]
fn test_empty_result_shows_toast() {
    let mut model = create_test_model();
    model.start(Some("zzqx"), 0);
    let request = only_fetch(&mut model);
    let model = deliver(model, request, Ok(Vec::new()));
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(message.contains("zzqx"));
}

#[test]
fn test_tick_commits_history_after_quiet_period() {
    let mut model = create_test_model();
    model = update(model, Message::SearchInput("a".to_string(), 0));
    model = update(model, Message::SearchInput("ab".to_string(), 900));
    model = update(model, Message::Tick(2000));
    assert!(model.gallery.history().is_empty());
    model = update(model, Message::Tick(2900));
    assert_eq!(model.gallery.history(), ["ab"]);
}

#[test]
fn test_pick_history_runs_that_search() {
    let store = MemoryStore::default();
    let mut history = HistoryStore::open(Box::new(store));
    history.append("dogs");
    history.append("cats");
    let mut model = Model::new(Gallery::new(history), (80, 40));

    model = update(model, Message::PickHistory(1, 10));
    let request = only_fetch(&mut model);
    assert_eq!(
        request.page,
        PageRequest::Search {
            text: "dogs".to_string(),
            page: 1
        }
    );
    assert_eq!(model.input, "dogs");
    assert_eq!(model.focus, Focus::Grid);

    let mut model = update(model, Message::PickHistory(4, 20));
    assert!(model.take_effects().is_empty(), "no entry at index 4");
}

#[test]
fn test_clear_history_empties_list() {
    let mut model = create_test_model();
    model = update(model, Message::SearchInput("x".to_string(), 0));
    model = update(model, Message::Tick(5000));
    assert_eq!(model.gallery.history().len(), 1);
    let model = update(model, Message::ClearHistory);
    assert!(model.gallery.history().is_empty());
    assert!(model.active_toast().is_some());
}

#[test]
fn test_open_and_close_overlay() {
    let mut model = searched_model(10);
    model = update(model, Message::CursorRight);
    let mut model = update(model, Message::OpenSelected);
    assert_eq!(model.gallery.selected().map(|p| p.id.as_str()), Some("c1"));
    assert!(
        model.take_effects().is_empty(),
        "no picker, so no image download"
    );

    let model = update(model, Message::OverlayNext);
    assert_eq!(model.gallery.selected().map(|p| p.id.as_str()), Some("c2"));
    assert_eq!(model.cursor, 2);

    let model = update(model, Message::CloseOverlay);
    assert!(model.gallery.selected().is_none());
    let model = update(model, Message::CloseOverlay);
    assert!(model.gallery.selected().is_none());
}

#[test]
fn test_open_with_picker_requests_large_image() {
    let mut model = searched_model(10).with_picker(Some(Picker::halfblocks()));
    model.take_effects();
    let mut model = update(model, Message::SelectTile(3));
    let effects = model.take_effects();
    assert!(matches!(
        effects.as_slice(),
        [Effect::FetchLarge { photo_id, url }]
            if photo_id == "c3" && url.ends_with("c3_abcdef_b.jpg")
    ));

    let model = update(
        model,
        Message::LargeImageLoaded {
            photo_id: "c3".to_string(),
            result: Ok(tiny_image()),
        },
    );
    assert!(model.large_image.as_ref().is_some_and(|(id, _)| id == "c3"));
}

#[test]
fn test_large_image_for_closed_photo_is_ignored() {
    let model = searched_model(10).with_picker(Some(Picker::halfblocks()));
    let model = update(model, Message::SelectTile(3));
    let model = update(model, Message::CloseOverlay);
    let model = update(
        model,
        Message::LargeImageLoaded {
            photo_id: "c3".to_string(),
            result: Ok(tiny_image()),
        },
    );
    assert!(model.large_image.is_none());
}

#[test]
fn test_thumbnails_queued_once_for_nearby_tiles() {
    let mut model = searched_model(50).with_picker(Some(Picker::halfblocks()));
    model.take_effects();

    // 2 visible rows plus 2 screens below: 6 rows of 3 tiles.
    assert_eq!(model.queue_visible_thumbnails(), 18);
    let effects = model.take_effects();
    assert!(effects.iter().all(|effect| matches!(
        effect,
        Effect::FetchThumbnail { url, .. } if url.ends_with("_q.jpg")
    )));
    assert_eq!(model.queue_visible_thumbnails(), 0);
}

#[test]
fn test_no_thumbnails_without_images() {
    let mut model = searched_model(50).with_picker(Some(Picker::halfblocks()));
    model.images_enabled = false;
    assert_eq!(model.queue_visible_thumbnails(), 0);
}

#[test]
fn test_thumbnail_marks_tile_loaded() {
    let model = searched_model(10).with_picker(Some(Picker::halfblocks()));
    let generation = model.gallery.generation();
    let model = update(
        model,
        Message::ThumbnailLoaded {
            generation,
            photo_id: "c0".to_string(),
            result: Ok(tiny_image()),
        },
    );
    assert!(model.gallery.is_loaded("c0"));
    assert!(model.thumbnails.contains_key("c0"));
}

#[test]
fn test_thumbnail_for_previous_query_is_dropped() {
    let mut model = searched_model(10).with_picker(Some(Picker::halfblocks()));
    let old_generation = model.gallery.generation();
    model = update(model, Message::SearchInput("dog".to_string(), 10));
    let model = update(
        model,
        Message::ThumbnailLoaded {
            generation: old_generation,
            photo_id: "c0".to_string(),
            result: Ok(tiny_image()),
        },
    );
    assert!(!model.gallery.is_loaded("c0"));
    assert!(model.thumbnails.is_empty());
}

#[test]
fn test_failed_thumbnail_is_remembered() {
    let model = searched_model(10);
    let generation = model.gallery.generation();
    let model = update(
        model,
        Message::ThumbnailLoaded {
            generation,
            photo_id: "c0".to_string(),
            result: Err("404".to_string()),
        },
    );
    assert!(model.thumbnail_failed("c0"));
    assert!(!model.gallery.is_loaded("c0"));
}

#[test]
fn test_resize_reshapes_grid() {
    let model = searched_model(10);
    let model = update(model, Message::Resize(160, 60));
    assert_eq!(model.viewport.columns(), 6);
    assert_eq!(model.viewport.rows(), 4);
    assert_eq!(model.terminal_size, (160, 60));
}

#[test]
fn test_scroll_keeps_cursor_on_screen() {
    let model = searched_model(50);
    let model = update(model, Message::ScrollDown(5));
    assert_eq!(model.viewport.offset(), 5);
    assert!(model.viewport.visible_tiles().contains(&model.cursor));
}

#[test]
fn test_focus_switching() {
    let model = create_test_model();
    let model = update(model, Message::SwitchFocus);
    assert_eq!(model.focus, Focus::Grid);
    let model = update(model, Message::FocusSearch);
    assert_eq!(model.focus, Focus::Search);
}

#[test]
fn test_quit_and_help() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_typing_in_search_appends_to_input() {
    let mut model = create_test_model();
    model.input = "ca".to_string();
    let msg = App::handle_key(key(KeyCode::Char('t')), &model, 42);
    assert!(matches!(msg, Some(Message::SearchInput(text, 42)) if text == "cat"));

    let msg = App::handle_key(key(KeyCode::Char('q')), &model, 42);
    assert!(
        matches!(msg, Some(Message::SearchInput(text, _)) if text == "caq"),
        "q types in the search box"
    );

    let msg = App::handle_key(key(KeyCode::Backspace), &model, 43);
    assert!(matches!(msg, Some(Message::SearchInput(text, 43)) if text == "c"));
}

#[test]
fn test_backspace_on_empty_input_does_nothing() {
    let model = create_test_model();
    assert!(App::handle_key(key(KeyCode::Backspace), &model, 0).is_none());
}

#[test]
fn test_ctrl_u_clears_and_ctrl_c_quits() {
    let mut model = create_test_model();
    model.input = "cat".to_string();
    let msg = App::handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), &model, 5);
    assert!(matches!(msg, Some(Message::SearchInput(text, 5)) if text.is_empty()));
    let msg = App::handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &model, 5);
    assert!(matches!(msg, Some(Message::Quit)));
}

#[test]
fn test_grid_keys() {
    let mut model = searched_model(10);
    model.focus = Focus::Grid;
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('1')), &model, 9),
        Some(Message::PickHistory(0, 9))
    ));
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('X')), &model, 0),
        Some(Message::ClearHistory)
    ));
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('/')), &model, 0),
        Some(Message::FocusSearch)
    ));
    assert!(matches!(
        App::handle_key(key(KeyCode::Enter), &model, 0),
        Some(Message::OpenSelected)
    ));
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('q')), &model, 0),
        Some(Message::Quit)
    ));
}

#[test]
fn test_up_from_first_row_focuses_search() {
    let mut model = searched_model(10);
    model.focus = Focus::Grid;
    assert!(matches!(
        App::handle_key(key(KeyCode::Up), &model, 0),
        Some(Message::FocusSearch)
    ));
    model.cursor = 4;
    assert!(matches!(
        App::handle_key(key(KeyCode::Up), &model, 0),
        Some(Message::CursorUp)
    ));
}

#[test]
fn test_overlay_keys() {
    let model = update(searched_model(10), Message::SelectTile(2));
    assert!(matches!(
        App::handle_key(key(KeyCode::Esc), &model, 0),
        Some(Message::CloseOverlay)
    ));
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('l')), &model, 0),
        Some(Message::OverlayNext)
    ));
}

#[test]
fn test_help_swallows_keys() {
    let mut model = create_test_model();
    model.help_visible = true;
    assert!(App::handle_key(key(KeyCode::Char('j')), &model, 0).is_none());
    assert!(matches!(
        App::handle_key(key(KeyCode::Esc), &model, 0),
        Some(Message::HideHelp)
    ));
}

#[test]
fn test_click_on_tile_selects_it() {
    let model = searched_model(10);
    // Header is 4 rows; second tile row starts 12 rows below the grid top.
    let mouse = MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column: 30,
        row: 4 + 12 + 1,
        modifiers: KeyModifiers::NONE,
    };
    assert!(matches!(
        App::handle_mouse(mouse, &model),
        Some(Message::SelectTile(4))
    ));
}

#[test]
fn test_click_on_search_box_focuses_it() {
    let model = searched_model(10);
    let mouse = MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column: 5,
        row: 1,
        modifiers: KeyModifiers::NONE,
    };
    assert!(matches!(
        App::handle_mouse(mouse, &model),
        Some(Message::FocusSearch)
    ));
}

#[test]
fn test_wheel_scrolls_grid() {
    let model = searched_model(10);
    let mouse = MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column: 5,
        row: 10,
        modifiers: KeyModifiers::NONE,
    };
    assert!(matches!(
        App::handle_mouse(mouse, &model),
        Some(Message::ScrollDown(1))
    ));
}

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);

    assert!(debouncer.take_ready(50).is_none());
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
}

#[test]
fn test_resize_debouncer_uses_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);
    debouncer.queue(140, 50, 20);

    assert!(debouncer.take_ready(80).is_none());
    assert_eq!(debouncer.take_ready(120), Some((140, 50)));
}
