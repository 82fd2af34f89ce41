//! Shared UI components (status bar, modal helpers).
//!
//! Small building blocks reused around the users table.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::{KeyAction, Keymap, describe_action};
use crate::app::query::SortState;
use crate::app::{AppState, InputMode, LoadState};

/// Result counter with the active search and role context, e.g.
/// `Showing 1 of 3 users for "al" in role "admin"`.
pub fn status_line(app: &AppState) -> String {
    let mut msg = format!(
        "Showing {} of {} users",
        app.visible().len(),
        app.users_all.len()
    );
    let search = app.query.effective_search();
    if !search.is_empty() {
        msg.push_str(&format!(" for \"{search}\""));
    }
    if let Some(role) = app.query.role_filter() {
        msg.push_str(&format!(" in role \"{role}\""));
    }
    msg
}

/// Render the bottom status bar with mode, counts and sort.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let mut msg = format!("mode: {mode}");
    if app.load == LoadState::Ready {
        msg.push_str("  ");
        msg.push_str(&status_line(app));
        if let SortState::SortedBy { column, direction } = app.query.sort() {
            msg.push_str(&format!(
                "  sorted by {} ({:?})",
                column.label().to_lowercase(),
                direction
            ));
        }
    }
    msg.push_str("  ?: help");
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Entries of the role select: "All Roles" followed by every distinct role.
pub fn role_picker_options(app: &AppState) -> Vec<String> {
    std::iter::once(crate::ui::ALL_ROLES.to_string())
        .chain(app.role_options())
        .collect()
}

/// Render the role select as a modal list.
pub fn render_role_picker(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let options = role_picker_options(app);
    let width = options
        .iter()
        .map(|o| o.chars().count() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(8)
        .max(30);
    let height = (options.len() as u16).saturating_add(2).min(area.height.saturating_sub(2).max(3));
    let rect = centered_rect(width, height, area);

    // keep the selection visible when the list is taller than the dialog
    let capacity = rect.height.saturating_sub(2).max(1) as usize;
    let offset = selected.saturating_sub(capacity - 1);
    let active = app.query.role_filter().unwrap_or(crate::ui::ALL_ROLES);

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .skip(offset)
        .take(capacity)
        .map(|(idx, label)| {
            let marker = if idx == selected { "▶ " } else { "  " };
            let style = if label == active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![Span::raw(marker), Span::styled(label.clone(), style)])
        })
        .collect();

    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Filter by role")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Group bound keys by action for display, e.g. "Move down" -> {"Down", "j"}.
pub fn binding_rows(keymap: &Keymap) -> BTreeMap<&'static str, BTreeSet<String>> {
    let mut rows: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in keymap.all_bindings() {
        if action == KeyAction::Ignore {
            continue;
        }
        rows.entry(describe_action(action))
            .or_default()
            .insert(Keymap::format_key(mods, code));
    }
    rows
}

/// Render the help modal with the active keybindings and search tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let rows = binding_rows(&app.keymap);
    let label_w = rows.keys().map(|k| k.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Keys:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for (label, keys) in rows.iter() {
        let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>width$} │ ", label, width = label_w)),
            Span::styled(joined, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Search:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw("  Type to search; results update after a short pause."));
    lines.push(Line::raw("  Enter keeps the text, Esc clears it."));
    lines.push(Line::raw("  Click the Name or Role header to sort: asc, desc, off."));
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", Style::default().add_modifier(Modifier::ITALIC)),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
