use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Position;
use std::time::{Duration, Instant};
use tracing::info;

use crate::app::keymap::KeyAction;
use crate::app::query::{QueryEvent, SortColumn};
use crate::app::{AppState, InputMode, LoadState, ModalState};
use crate::source::PendingLoad;
use crate::ui;

/// Input poll interval; also the debounce resolution.
const TICK: Duration = Duration::from_millis(100);

/// Whether the loop should keep running after an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    load: PendingLoad,
) -> Result<()> {
    let mut load = Some(load);

    loop {
        tick(app, &mut load, Instant::now());

        terminal
            .draw(|f| ui::render(f, app))
            .context("draw frame")?;

        if event::poll(TICK).context("poll terminal events")? {
            let flow = match event::read().context("read terminal event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key, Instant::now())
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse, Instant::now()),
                _ => Flow::Continue,
            };
            if flow == Flow::Quit {
                info!("quit requested");
                break;
            }
        }
    }
    Ok(())
}

/// Time-driven work: pick up the load result and settle the search debounce.
pub fn tick(app: &mut AppState, load: &mut Option<PendingLoad>, now: Instant) {
    if let Some(res) = load.as_ref().and_then(PendingLoad::poll) {
        app.finish_load(res);
        *load = None;
    }
    app.settle(now);
}

pub fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key, now),
        InputMode::Search => {
            handle_search_key(app, key, now);
            Flow::Continue
        }
        InputMode::Modal => {
            handle_modal_key(app, key.code, now);
            Flow::Continue
        }
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::Continue;
    };
    let len = app.visible().len();
    let rpp = app.rows_per_page.max(1);
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::OpenRoleFilter => {
            // Pre-select the active role, "All Roles" otherwise
            let selected = app
                .query
                .role_filter()
                .and_then(|r| app.role_options().iter().position(|o| o == r))
                .map_or(0, |i| i + 1);
            app.modal = Some(ModalState::RolePicker { selected });
            app.input_mode = InputMode::Modal;
        }
        KeyAction::SortByName => app.dispatch(QueryEvent::HeaderClicked(SortColumn::Name), now),
        KeyAction::SortByRole => app.dispatch(QueryEvent::HeaderClicked(SortColumn::Role), now),
        KeyAction::ClearFilters => app.dispatch(QueryEvent::Reset, now),
        KeyAction::OpenHelp => {
            app.modal = Some(ModalState::Help { scroll: 0 });
            app.input_mode = InputMode::Modal;
        }
        KeyAction::MoveUp => app.selected = app.selected.saturating_sub(1),
        KeyAction::MoveDown => {
            if app.selected + 1 < len {
                app.selected += 1;
            }
        }
        KeyAction::PageUp => app.selected = app.selected.saturating_sub(rpp),
        KeyAction::PageDown => {
            app.selected = app.selected.saturating_add(rpp).min(len.saturating_sub(1));
        }
        KeyAction::Top => app.selected = 0,
        KeyAction::Bottom => app.selected = len.saturating_sub(1),
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

fn handle_search_key(app: &mut AppState, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.dispatch(QueryEvent::SearchCleared, now);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            let mut text = app.query.search_text().to_string();
            if text.pop().is_some() {
                app.dispatch(QueryEvent::SearchEdited(text), now);
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut text = app.query.search_text().to_string();
            text.push(c);
            app.dispatch(QueryEvent::SearchEdited(text), now);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode, now: Instant) {
    let Some(state) = app.modal.clone() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match state {
        ModalState::RolePicker { selected } => {
            let roles = app.role_options();
            // "All Roles" plus one entry per role
            let count = roles.len() + 1;
            match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    app.modal = Some(ModalState::RolePicker {
                        selected: selected.saturating_sub(1),
                    });
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    app.modal = Some(ModalState::RolePicker {
                        selected: (selected + 1).min(count - 1),
                    });
                }
                KeyCode::Enter => {
                    let role = selected.checked_sub(1).and_then(|i| roles.get(i).cloned());
                    app.dispatch(QueryEvent::RoleSelected(role), now);
                    close_modal(app);
                }
                KeyCode::Esc | KeyCode::Char('q') => close_modal(app),
                _ => {}
            }
        }
        ModalState::Help { scroll } => match code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.modal = Some(ModalState::Help {
                    scroll: scroll.saturating_sub(1),
                });
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.modal = Some(ModalState::Help {
                    scroll: scroll.saturating_add(1),
                });
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                close_modal(app)
            }
            _ => {}
        },
    }
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

/// Left clicks on sortable headers toggle their sort; the wheel moves the selection.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent, now: Instant) -> Flow {
    if app.input_mode == InputMode::Modal || app.load != LoadState::Ready {
        return Flow::Continue;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let at = Position::new(mouse.column, mouse.row);
            let hit = app
                .header_hits
                .iter()
                .find(|(rect, _)| rect.contains(at))
                .map(|(_, column)| *column);
            if let Some(column) = hit {
                app.dispatch(QueryEvent::HeaderClicked(column), now);
            }
        }
        MouseEventKind::ScrollDown => {
            let len = app.visible().len();
            if app.selected + 1 < len {
                app.selected += 1;
            }
        }
        MouseEventKind::ScrollUp => app.selected = app.selected.saturating_sub(1),
        _ => {}
    }
    Flow::Continue
}
