//! In-memory search pipeline: filter, collate, sort and highlight.
//!
//! Everything here is a pure function of its inputs. The search text is
//! always matched as a literal, case-insensitively; it is never compiled
//! into a pattern.
use feruca::Collator;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::app::query::SortState;
use crate::source::User;

/// Inputs of the derived view besides the records themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewQuery<'q> {
    pub search: &'q str,
    pub role: Option<&'q str>,
    pub sort: SortState,
}

/// A piece of highlighted text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match *self {
            Segment::Plain(s) | Segment::Match(s) => s,
        }
    }
}

fn fold(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Byte end of a case-insensitive match of `needle` starting at `start`.
/// Matches start and end on character boundaries of `text`.
fn match_at(text: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut k = 0;
    for (off, ch) in text[start..].char_indices() {
        for lc in ch.to_lowercase() {
            if needle.get(k) != Some(&lc) {
                return None;
            }
            k += 1;
            // may stop inside a multi-char lowercase form ("İ" -> "i̇"); the whole char is covered
            if k == needle.len() {
                return Some(start + off + ch.len_utf8());
            }
        }
    }
    None
}

fn find_folded(text: &str, needle: &[char], from: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    text[from..]
        .char_indices()
        .find_map(|(off, _)| match_at(text, from + off, needle).map(|end| (from + off, end)))
}

/// Case-insensitive literal substring test. An empty needle is contained in everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = fold(needle);
    needle.is_empty() || find_folded(haystack, &needle, 0).is_some()
}

/// Filter predicate: exact role match (when filtering by role) and a
/// case-insensitive hit in name or email (when searching).
pub fn matches(user: &User, search: &str, role: Option<&str>) -> bool {
    let role_ok = role.is_none_or(|r| user.role == r);
    role_ok && (search.is_empty() || contains_ci(&user.name, search) || contains_ci(&user.email, search))
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Locale-aware string ordering using the CLDR root collation, so "Émile"
/// sorts among the E's. Equal collation keys fall back to lowercase before
/// uppercase, then code points.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with_borrow_mut(|c| c.collate(a, b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Compute the visible records: filtered, then sorted if a sort is active.
/// With no sort the resource order is preserved.
pub fn derive_view<'a>(records: &'a [User], query: &ViewQuery<'_>) -> Vec<&'a User> {
    let mut view: Vec<&User> = records
        .iter()
        .filter(|u| matches(u, query.search, query.role))
        .collect();
    if let SortState::SortedBy { column, direction } = query.sort {
        view.sort_by(|a, b| direction.apply(compare_text(column.field(a), column.field(b))));
    }
    view
}

/// Distinct roles across all records, ascending.
pub fn role_options(records: &[User]) -> Vec<String> {
    records
        .iter()
        .map(|u| u.role.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Split `text` into plain and matched segments, marking every
/// non-overlapping case-insensitive occurrence of `query`.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let needle = fold(query);
    let mut out = Vec::new();
    let mut i = 0;
    while let Some((start, end)) = find_folded(text, &needle, i) {
        if start > i {
            out.push(Segment::Plain(&text[i..start]));
        }
        out.push(Segment::Match(&text[start..end]));
        i = end;
    }
    if i < text.len() || out.is_empty() {
        out.push(Segment::Plain(&text[i..]));
    }
    out
}
