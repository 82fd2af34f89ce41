//! Query state holder: search text (raw and debounced), role filter, sort.
//!
//! State transitions take the current value and return the next one; the
//! derived view is recomputed from [`QueryState::view`] and never stored.
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::search::ViewQuery;
use crate::source::User;

/// Quiet period before a typed search becomes effective.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Columns that can be sorted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Role,
}

impl SortColumn {
    pub fn field(self, user: &User) -> &str {
        match self {
            SortColumn::Name => &user.name,
            SortColumn::Role => &user.role,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Role => "Role",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Descending is the exact reversal of the ascending comparison.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Sort key and direction, set and cleared together.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    SortedBy {
        column: SortColumn,
        direction: SortDirection,
    },
}

impl SortState {
    /// Next state after a header click: a new column starts ascending; the
    /// active column cycles ascending -> descending -> unsorted.
    pub fn toggle(self, clicked: SortColumn) -> SortState {
        match self {
            SortState::SortedBy { column, direction } if column == clicked => match direction {
                SortDirection::Ascending => SortState::SortedBy {
                    column,
                    direction: SortDirection::Descending,
                },
                SortDirection::Descending => SortState::Unsorted,
            },
            _ => SortState::SortedBy {
                column: clicked,
                direction: SortDirection::Ascending,
            },
        }
    }

    /// How a given column header should present itself.
    pub fn header(self, column: SortColumn) -> HeaderSort {
        match self {
            SortState::SortedBy { column: c, direction } if c == column => match direction {
                SortDirection::Ascending => HeaderSort::Ascending,
                SortDirection::Descending => HeaderSort::Descending,
            },
            _ => HeaderSort::None,
        }
    }
}

/// Per-column sort presentation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderSort {
    None,
    Ascending,
    Descending,
}

impl HeaderSort {
    pub fn icon(self) -> &'static str {
        match self {
            HeaderSort::None => "↕",
            HeaderSort::Ascending => "↑",
            HeaderSort::Descending => "↓",
        }
    }

    /// Machine-readable sort state.
    pub fn attribute(self) -> &'static str {
        match self {
            HeaderSort::None => "none",
            HeaderSort::Ascending => "ascending",
            HeaderSort::Descending => "descending",
        }
    }
}

/// Holds at most one pending value; each push replaces the previous one and
/// restarts the quiet period.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, due)) if now >= due => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// User interactions that change the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryEvent {
    /// Raw search text changed (keystroke).
    SearchEdited(String),
    /// Search box cleared; takes effect at once.
    SearchCleared,
    RoleSelected(Option<String>),
    HeaderClicked(SortColumn),
    /// Back to the session-start state.
    Reset,
}

#[derive(Clone, Debug)]
pub struct QueryState {
    search_text: String,
    effective_search: String,
    role_filter: Option<String>,
    sort: SortState,
    debounce: Debouncer<String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_delay(SEARCH_DEBOUNCE)
    }
}

impl QueryState {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            search_text: String::new(),
            effective_search: String::new(),
            role_filter: None,
            sort: SortState::Unsorted,
            debounce: Debouncer::new(delay),
        }
    }

    pub fn reduce(mut self, event: QueryEvent, now: Instant) -> Self {
        match event {
            QueryEvent::SearchEdited(text) => {
                self.debounce.push(text.clone(), now);
                self.search_text = text;
            }
            QueryEvent::SearchCleared => {
                self.debounce.cancel();
                self.search_text.clear();
                self.effective_search.clear();
                debug!("search cleared");
            }
            QueryEvent::RoleSelected(role) => {
                debug!(role = ?role, "role filter changed");
                self.role_filter = role;
            }
            QueryEvent::HeaderClicked(column) => {
                self.sort = self.sort.toggle(column);
                debug!(column = column.label(), sort = ?self.sort, "sort changed");
            }
            QueryEvent::Reset => {
                let delay = self.debounce.delay;
                self = Self::with_delay(delay);
                debug!("query reset");
            }
        }
        self
    }

    /// Promote the pending search once the quiet period has passed.
    pub fn settle(mut self, now: Instant) -> Self {
        if let Some(text) = self.debounce.poll(now) {
            debug!(search = %text, "effective search changed");
            self.effective_search = text;
        }
        self
    }

    /// Raw text, as shown in the search box.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Debounced text used for filtering and highlighting.
    pub fn effective_search(&self) -> &str {
        &self.effective_search
    }

    pub fn role_filter(&self) -> Option<&str> {
        self.role_filter.as_deref()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn is_search_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn view(&self) -> ViewQuery<'_> {
        ViewQuery {
            search: &self.effective_search,
            role: self.role_filter.as_deref(),
            sort: self.sort,
        }
    }
}
