// Unit tests for userdir-tui
// These tests work with the public API only

#[cfg(test)]
mod filter_property_tests {
    use proptest::prelude::*;
    use std::cmp::Ordering;
    use userdir_tui::app::query::{SortColumn, SortDirection, SortState};
    use userdir_tui::search::{ViewQuery, compare_text, derive_view};
    use userdir_tui::source::User;

    fn arb_users() -> impl Strategy<Value = Vec<User>> {
        prop::collection::vec(
            // "İ" lowercases to two chars, so matching must not assume one-to-one folding
            ("[abiAB@.İ]{0,6}", "[abiAB@.İ]{0,6}", prop_oneof![Just("x"), Just("y")]),
            0..12,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, email, role))| User::new(i as i64, name, email, role))
                .collect()
        })
    }

    fn arb_role() -> impl Strategy<Value = Option<String>> {
        prop_oneof![Just(None), Just(Some("x".to_string())), Just(Some("y".to_string()))]
    }

    fn reference(u: &User, q: &str, role: Option<&str>) -> bool {
        let q = q.to_lowercase();
        role.is_none_or(|r| u.role == r)
            && (q.is_empty()
                || u.name.to_lowercase().contains(&q)
                || u.email.to_lowercase().contains(&q))
    }

    proptest! {
        #[test]
        fn unsorted_view_is_exactly_the_filtered_records_in_load_order(
            users in arb_users(),
            search in "[abiABİ]{0,2}",
            role in arb_role(),
        ) {
            let query = ViewQuery { search: &search, role: role.as_deref(), sort: SortState::Unsorted };
            let got: Vec<&User> = derive_view(&users, &query);
            let want: Vec<&User> = users.iter().filter(|u| reference(u, &search, role.as_deref())).collect();
            prop_assert_eq!(got, want);
        }

        #[test]
        fn sorted_views_are_ordered_and_stable(
            users in arb_users(),
            search in "[ab]{0,1}",
        ) {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let sort = SortState::SortedBy { column: SortColumn::Name, direction };
                let view = derive_view(&users, &ViewQuery { search: &search, role: None, sort });
                for pair in view.windows(2) {
                    let ord = direction.apply(compare_text(&pair[0].name, &pair[1].name));
                    prop_assert_ne!(ord, Ordering::Greater);
                    if ord == Ordering::Equal {
                        // ties keep load order
                        prop_assert!(pair[0].id.to_string().parse::<i64>().ok() < pair[1].id.to_string().parse::<i64>().ok());
                    }
                }
            }
        }

        #[test]
        fn derived_view_is_deterministic(users in arb_users(), search in "[ab]{0,2}") {
            let sort = SortState::SortedBy { column: SortColumn::Role, direction: SortDirection::Descending };
            let q = ViewQuery { search: &search, role: None, sort };
            prop_assert_eq!(derive_view(&users, &q), derive_view(&users, &q));
        }
    }
}

#[cfg(test)]
mod search_tests {
    use userdir_tui::app::query::SortState;
    use userdir_tui::search::{Segment, ViewQuery, derive_view, highlight, role_options};
    use userdir_tui::source::User;

    fn create_test_users() -> Vec<User> {
        vec![
            User::new(1, "Alice", "a@x.com", "admin"),
            User::new(2, "bob", "b@x.com", "user"),
        ]
    }

    #[test]
    fn test_search_a_matches_by_substring_rule() {
        let users = create_test_users();
        let view = derive_view(&users, &ViewQuery { search: "a", role: None, sort: SortState::Unsorted });
        // "Alice" contains "a"; neither "bob" nor "b@x.com" does
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "Alice");
    }

    #[test]
    fn test_search_x_matches_both_emails() {
        let users = create_test_users();
        let view = derive_view(&users, &ViewQuery { search: "X.COM", role: None, sort: SortState::Unsorted });
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_role_options_are_distinct_and_sorted() {
        let users = vec![
            User::new("A", "A", "a", "admin"),
            User::new("B", "B", "b", "user"),
            User::new("C", "C", "c", "admin"),
        ];
        assert_eq!(role_options(&users), vec!["admin", "user"]);
    }

    #[test]
    fn test_highlight_special_characters_literal() {
        let segs = highlight("a.b*c", ".B*");
        assert_eq!(segs, vec![Segment::Plain("a"), Segment::Match(".b*"), Segment::Plain("c")]);
        assert_eq!(highlight("abc", "a|b"), vec![Segment::Plain("abc")]);
    }

    #[test]
    fn test_search_performance_large_dataset() {
        use std::time::Instant;

        let users: Vec<User> = (0..10_000)
            .map(|i| User::new(i, format!("user{i}"), format!("user{i}@example.com"), "member"))
            .collect();
        let start = Instant::now();
        let view = derive_view(&users, &ViewQuery { search: "user5000@", role: None, sort: SortState::Unsorted });
        let duration = start.elapsed();

        assert_eq!(view.len(), 1);
        assert!(duration.as_millis() < 500, "Search took too long: {:?}", duration);
    }
}

#[cfg(test)]
mod error_handling_tests {
    use std::path::Path;
    use userdir_tui::error::LoadError;
    use userdir_tui::source::parse_users;

    #[test]
    fn test_malformed_payload_aborts_whole_load() {
        let json = br#"[{"id": 1, "name": "a", "email": "a@x", "role": "r"}, {"id": 2}]"#;
        let err = parse_users(Path::new("data.json"), json).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("data.json"));
    }

    #[test]
    fn test_non_array_payload_is_rejected() {
        let err = parse_users(Path::new("data.json"), br#"{"users": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_empty_array_is_a_successful_load() {
        let users = parse_users(Path::new("data.json"), b"[]").expect("parse");
        assert!(users.is_empty());
    }
}

#[cfg(test)]
mod render_tests {
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::{Duration, Instant};
    use userdir_tui::app::query::QueryEvent;
    use userdir_tui::app::{AppState, Theme};
    use userdir_tui::error::LoadError;
    use userdir_tui::source::User;
    use userdir_tui::ui::render;

    fn draw(app: &mut AppState) -> Terminal<TestBackend> {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).expect("create terminal");
        terminal.draw(|f| render(f, app)).expect("render frame");
        terminal
    }

    fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        buf.content
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }

    fn loaded(users: Vec<User>) -> AppState {
        let mut app = AppState::new(Theme::dark(), Default::default());
        app.finish_load(Ok(users));
        app
    }

    #[test]
    fn test_ui_render_loading() {
        let mut app = AppState::new(Theme::dark(), Default::default());
        let text = screen(&draw(&mut app)).join("\n");
        assert!(text.contains("Loading users..."));
        assert!(!text.contains("Showing"));
        assert!(text.contains("Search by name or email..."));
        assert!(text.contains("All Roles"));
    }

    #[test]
    fn test_ui_render_failure_message() {
        let mut app = AppState::default();
        app.finish_load(Err(LoadError::DuplicateId { id: "9".into() }));
        let text = screen(&draw(&mut app)).join("\n");
        assert!(text.contains("Duplicate user id '9'"));
        assert!(!text.contains("Showing"));
    }

    #[test]
    fn test_ui_render_table_and_status() {
        let mut app = loaded(vec![
            User::new(1, "Alice", "a@x.com", "admin"),
            User::new(2, "bob", "b@x.com", "user"),
        ]);
        let text = screen(&draw(&mut app)).join("\n");
        assert!(text.contains("Showing 2 of 2 users"));
        assert!(text.contains("Name ↕"));
        assert!(text.contains("Role ↕"));
        assert!(text.contains("Email"));
        assert!(text.contains("name=none role=none"));
        assert!(text.contains("b@x.com"));
    }

    #[test]
    fn test_ui_render_empty_states() {
        let mut empty = loaded(vec![]);
        let text = screen(&draw(&mut empty)).join("\n");
        assert!(text.contains("No users to display"));

        let t0 = Instant::now();
        let mut app = loaded(vec![User::new(1, "Alice", "a@x.com", "admin")]);
        app.dispatch(QueryEvent::SearchEdited("zzz".into()), t0);
        app.settle(t0 + Duration::from_millis(300));
        let text = screen(&draw(&mut app)).join("\n");
        assert!(text.contains("No users found matching your search."));
        assert!(text.contains("Showing 0 of 1 users for \"zzz\""));
    }

    #[test]
    fn test_ui_render_highlights_matches() {
        let t0 = Instant::now();
        let mut app = loaded(vec![User::new(1, "Alice", "a@x.com", "admin")]);
        app.dispatch(QueryEvent::SearchEdited("LI".into()), t0);
        app.settle(t0 + Duration::from_millis(300));
        let terminal = draw(&mut app);
        let rows = screen(&terminal);
        let (y, line) = rows
            .iter()
            .enumerate()
            .find(|(_, l)| l.contains("Alice"))
            .expect("row with Alice");
        // borders are multi-byte, so count chars rather than bytes
        let byte_pos = line.find("Alice").expect("Alice column");
        let x = line[..byte_pos].chars().count() + 1;
        let buf = terminal.backend().buffer();
        let width = buf.area.width as usize;
        let cell = &buf.content[y * width + x];
        assert_eq!(cell.symbol(), "l");
        assert_eq!(cell.bg, app.theme.match_bg);
        let before = &buf.content[y * width + x - 1];
        assert_ne!(before.bg, app.theme.match_bg);
    }
}
