//! Application state types and entry glue.
//!
//! Defines enums and structs that model the TUI state, as well as helpers
//! to construct defaults and to run the application loop (re-exported as `run`).
//!
pub mod keymap;
pub mod query;
pub mod update;

use ratatui::layout::Rect;
use ratatui::style::Color;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::search;
use crate::source::User;
use keymap::Keymap;
use query::{QueryEvent, QueryState, SortColumn, SortState};

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Progress of the one-shot record load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    /// User-facing failure reason.
    Failed(String),
}

/// Modal dialogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Role select; index 0 is "All Roles".
    RolePicker { selected: usize },
    Help { scroll: u16 },
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub match_fg: Color,
    pub match_bg: Color,
    pub error_fg: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            match_fg: Color::Black,
            match_bg: Color::Yellow,
            error_fg: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            match_fg: Color::Rgb(0x1e, 0x1e, 0x2e),     // base
            match_bg: Color::Rgb(0xf9, 0xe2, 0xaf),     // yellow
            error_fg: Color::Rgb(0xf3, 0x8b, 0xa8),     // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            let Some(color) = Self::parse_color(val) else {
                warn!(key, value = val, "ignoring unparsable theme color");
                continue;
            };
            match key {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "match_fg" => theme.match_fg = color,
                "match_bg" => theme.match_bg = color,
                "error_fg" => theme.error_fg = color,
                _ => {}
            }
        }

        Some(theme)
    }

    /// Parse a color: "#RRGGBB", bare "RRGGBB", a ratatui color name or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let s = s.trim();
        // bare digits like "000001" would otherwise read as an indexed color
        if s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return format!("#{s}").parse().ok();
        }
        s.parse().ok()
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdir theme configuration\n");
        buf.push_str("# Colors: #RRGGBB, RRGGBB, a color name, or 'reset'\n\n");
        for (key, color) in [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("match_fg", self.match_fg),
            ("match_bg", self.match_bg),
            ("error_fg", self.error_fg),
        ] {
            let _ = writeln!(buf, "{key} = {color}");
        }
        std::fs::write(path, buf)
    }

    /// Load from `path`, or write the default palette there if it is missing.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(|| {
                warn!(path = %path.display(), "unreadable theme file, using defaults");
                Self::mocha()
            });
        }
        let t = Self::mocha();
        if let Err(err) = t.write_file(path) {
            warn!(path = %path.display(), error = %err, "could not write default theme");
        }
        t
    }
}

pub struct AppState {
    pub started_at: Instant,
    pub load: LoadState,
    pub users_all: Vec<User>,
    pub query: QueryState,
    /// Index into the derived view.
    pub selected: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub theme: Theme,
    pub keymap: Keymap,
    /// Clickable header cells from the last frame.
    pub header_hits: Vec<(Rect, SortColumn)>,
}

impl AppState {
    /// Fresh session: nothing loaded, empty search, no role filter, no sort.
    pub fn new(theme: Theme, keymap: Keymap) -> Self {
        Self {
            started_at: Instant::now(),
            load: LoadState::Pending,
            users_all: Vec::new(),
            query: QueryState::default(),
            selected: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            modal: None,
            theme,
            keymap,
            header_hits: Vec::new(),
        }
    }

    /// Record the outcome of the load. On failure the record set stays empty.
    pub fn finish_load(&mut self, res: crate::error::Result<Vec<User>>) {
        match res {
            Ok(users) => {
                info!(
                    count = users.len(),
                    elapsed_ms = self.started_at.elapsed().as_millis() as u64,
                    "user directory ready"
                );
                self.users_all = users;
                self.load = LoadState::Ready;
            }
            Err(err) => {
                self.users_all.clear();
                self.load = LoadState::Failed(err.to_string());
            }
        }
        self.selected = 0;
    }

    /// The derived view for the current query.
    pub fn visible(&self) -> Vec<&User> {
        search::derive_view(&self.users_all, &self.query.view())
    }

    /// Selectable roles across every loaded record.
    pub fn role_options(&self) -> Vec<String> {
        search::role_options(&self.users_all)
    }

    fn view_inputs(&self) -> (String, Option<String>, SortState) {
        (
            self.query.effective_search().to_string(),
            self.query.role_filter().map(str::to_string),
            self.query.sort(),
        )
    }

    fn replace_query(&mut self, f: impl FnOnce(QueryState) -> QueryState) {
        let before = self.view_inputs();
        let q = std::mem::take(&mut self.query);
        self.query = f(q);
        if self.view_inputs() != before {
            self.selected = 0;
        }
    }

    /// Apply a user interaction to the query.
    pub fn dispatch(&mut self, event: QueryEvent, now: Instant) {
        self.replace_query(|q| q.reduce(event, now));
    }

    /// Let a pending search become effective once its quiet period is over.
    pub fn settle(&mut self, now: Instant) {
        if self.query.is_search_pending() {
            self.replace_query(|q| q.settle(now));
        }
    }

    /// Keep the selection inside the derived view.
    pub fn clamp_selection(&mut self, visible_len: usize) {
        self.selected = self.selected.min(visible_len.saturating_sub(1));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Theme::mocha(), Keymap::default())
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
