//! Rendering: controls bar, users table, status bar and modals.
pub mod components;
pub mod table;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::{AppState, InputMode, LoadState, ModalState};

pub const SEARCH_PLACEHOLDER: &str = "Search by name or email...";
pub const ALL_ROLES: &str = "All Roles";
pub const LOADING_TEXT: &str = "Loading users...";

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(28)])
        .split(root[0]);

    render_search_box(f, controls[0], app);
    render_role_select(f, controls[1], app);

    match app.load.clone() {
        LoadState::Pending => {
            app.header_hits.clear();
            render_notice(f, root[1], app, LOADING_TEXT, app.theme.muted);
        }
        LoadState::Failed(reason) => {
            app.header_hits.clear();
            render_notice(f, root[1], app, &reason, app.theme.error_fg);
        }
        LoadState::Ready => table::render_users_table(f, root[1], app),
    }

    components::render_status_bar(f, root[2], app);

    if let Some(state) = app.modal.clone() {
        let area = f.area();
        match state {
            ModalState::RolePicker { selected } => {
                components::render_role_picker(f, area, app, selected)
            }
            ModalState::Help { scroll } => components::render_help_modal(f, area, app, scroll),
        }
    }
}

fn render_search_box(f: &mut Frame, area: Rect, app: &AppState) {
    let editing = app.input_mode == InputMode::Search;
    let text = app.query.search_text();
    let (body, style) = if text.is_empty() && !editing {
        (SEARCH_PLACEHOLDER, Style::default().fg(app.theme.muted))
    } else {
        (text, Style::default().fg(app.theme.text))
    };
    let border = if editing { app.theme.title } else { app.theme.border };
    let title = if editing { "Search (Enter: done, Esc: clear)" } else { "Search (/)" };
    let p = Paragraph::new(body).style(style).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);

    if editing {
        f.set_cursor_position((search_cursor_x(area, text), area.y + 1));
    }
}

/// Cursor column after `text` in the search box, measured in terminal cells.
fn search_cursor_x(area: Rect, text: &str) -> u16 {
    let width = u16::try_from(Span::raw(text).width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(width)
        .min(area.right().saturating_sub(2))
}

fn render_role_select(f: &mut Frame, area: Rect, app: &AppState) {
    let label = app.query.role_filter().unwrap_or(ALL_ROLES);
    let p = Paragraph::new(format!("{label} ▾"))
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Role (f)")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

fn render_notice(f: &mut Frame, area: Rect, app: &AppState, text: &str, color: ratatui::style::Color) {
    let p = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .title("Users")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}
