use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::query::{SortColumn, SortState};
use crate::app::{AppState, Theme};
use crate::search::{Segment, highlight};

pub const NO_RECORDS_TEXT: &str = "No users to display";
pub const NO_MATCHES_TEXT: &str = "No users found matching your search.";

const WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(30),
    Constraint::Percentage(45),
    Constraint::Percentage(25),
];
const COLUMN_SPACING: u16 = 1;

/// Text for an empty derived view; nothing loaded reads differently from nothing matching.
pub fn empty_message(total_loaded: usize) -> &'static str {
    if total_loaded == 0 { NO_RECORDS_TEXT } else { NO_MATCHES_TEXT }
}

/// Build a line with every match of `query` emphasised. Matched text is
/// styled, never reinterpreted.
pub fn highlight_line<'a>(text: &'a str, query: &str, theme: &Theme) -> Line<'a> {
    let emphasis = Style::default()
        .fg(theme.match_fg)
        .bg(theme.match_bg)
        .add_modifier(Modifier::BOLD);
    let spans: Vec<Span<'a>> = highlight(text, query)
        .into_iter()
        .map(|seg| match seg {
            Segment::Plain(s) => Span::raw(s),
            Segment::Match(s) => Span::styled(s, emphasis),
        })
        .collect();
    Line::from(spans)
}

/// Header text for a sortable column, e.g. `Name ↑`.
pub fn header_label(sort: SortState, column: SortColumn) -> String {
    format!("{} {}", column.label(), sort.header(column).icon())
}

/// Sort-state attributes for both sortable columns, e.g. `name=ascending role=none`.
pub fn sort_attributes(sort: SortState) -> String {
    [SortColumn::Name, SortColumn::Role]
        .iter()
        .map(|c| format!("{}={}", c.label().to_lowercase(), sort.header(*c).attribute()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let sort = app.query.sort();
    let block = Block::default()
        .title(format!("Users  [sort {}]", sort_attributes(sort)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    // one line for the header row
    let body_height = inner.height.saturating_sub(1) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let cols = Layout::horizontal(WIDTHS)
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(inner);
    app.header_hits = vec![
        (Rect { y: inner.y, height: 1, ..cols[0] }, SortColumn::Name),
        (Rect { y: inner.y, height: 1, ..cols[2] }, SortColumn::Role),
    ];

    let len = app.visible().len();
    app.clamp_selection(len);

    let app = &*app;
    let view = app.visible();
    let query = app.query.effective_search();
    let rpp = app.rows_per_page.max(1);
    let start = (app.selected / rpp) * rpp;
    let end = (start + rpp).min(view.len());
    let slice = view.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(highlight_line(&u.name, query, &app.theme)),
            Cell::from(highlight_line(&u.email, query, &app.theme)),
            Cell::from(u.role.as_str()),
        ])
        .style(style)
    });

    let header = Row::new(vec![
        header_label(sort, SortColumn::Name),
        "Email".to_string(),
        header_label(sort, SortColumn::Role),
    ])
    .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, WIDTHS)
        .header(header)
        .block(block)
        .flex(Flex::Start)
        .column_spacing(COLUMN_SPACING);
    f.render_widget(table, area);

    if view.is_empty() {
        let rect = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let p = Paragraph::new(empty_message(app.users_all.len()))
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted));
        f.render_widget(p, rect);
    }
}
