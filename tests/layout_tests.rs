// Integration tests for the overlap layout and the views built on it

mod fixtures;

use chrono_tz::UTC;
use fixtures::lessons::{on_jan, span};
use lesson_calendar::models::settings::CalendarSettings;
use lesson_calendar::ui::overlap_layout::{compute_layout, LayoutConfig};
use lesson_calendar::ui::views::{BlockState, WeekView};
use pretty_assertions::assert_eq;

#[test]
fn test_simple_overlap_uses_two_columns() {
    let lessons = vec![span("a", (9, 0), (9, 45)), span("b", (9, 30), (10, 15))];
    let layout = compute_layout(&lessons, &UTC, &LayoutConfig::default());

    let a = layout.position("a").unwrap();
    let b = layout.position("b").unwrap();
    assert_eq!((a.column_index, a.total_columns), (0, 2));
    assert_eq!((b.column_index, b.total_columns), (1, 2));
    assert!(layout.overflow.is_empty());
}

#[test]
fn test_back_to_back_lessons_share_full_width() {
    let lessons = vec![
        span("a", (9, 0), (10, 0)),
        span("b", (10, 0), (11, 0)),
        span("c", (11, 0), (12, 0)),
    ];
    let layout = compute_layout(&lessons, &UTC, &LayoutConfig::default());

    for id in ["a", "b", "c"] {
        let position = layout.position(id).unwrap();
        assert_eq!((position.column_index, position.total_columns), (0, 1));
        assert_eq!(position.width_percent(), 100.0);
    }
}

#[test]
fn test_five_identical_lessons_overflow() {
    let lessons: Vec<_> = (0..5)
        .map(|i| span(&format!("l{}", i), (9, 0), (10, 0)))
        .collect();
    let layout = compute_layout(&lessons, &UTC, &LayoutConfig::default());

    assert_eq!(layout.positions.len(), 2);
    assert_eq!(layout.position("l0").unwrap().column_index, 0);
    assert_eq!(layout.position("l1").unwrap().column_index, 1);
    assert_eq!(layout.position("l0").unwrap().total_columns, 3);

    let bucket = layout.overflow.get("l0").unwrap();
    assert_eq!(bucket.lessons.len(), 3);
    assert_eq!(bucket.label(), "+3 more");
    assert_eq!((bucket.top, bucket.height), (120.0, 60.0));
    assert_eq!(layout.len(), 5);
}

#[test]
fn test_cluster_chains_through_intermediate_lesson() {
    // a and c never overlap, but both overlap b
    let lessons = vec![
        span("a", (9, 0), (10, 0)),
        span("b", (9, 30), (10, 30)),
        span("c", (10, 0), (11, 0)),
    ];
    let layout = compute_layout(&lessons, &UTC, &LayoutConfig::default());

    assert_eq!(layout.position("a").unwrap().column_index, 0);
    assert_eq!(layout.position("b").unwrap().column_index, 1);
    assert_eq!(layout.position("c").unwrap().column_index, 0);
    assert!(["a", "b", "c"]
        .iter()
        .all(|id| layout.position(id).unwrap().total_columns == 2));
}

#[test]
fn test_week_view_allows_four_columns() {
    let settings = CalendarSettings {
        timezone: UTC,
        ..Default::default()
    };
    let lessons: Vec<_> = (0..5).map(|i| on_jan(&format!("w{}", i), 3, 9, 0, 60)).collect();
    let view = WeekView::new(fixtures::dates::new_year_2024(), &settings, &lessons);

    let rendered = view.grid.render(&lessons, None, None);
    assert_eq!(rendered.blocks.len(), 3);
    assert!(rendered.blocks.iter().all(|b| b.state == BlockState::Normal));
    assert!(rendered.blocks.iter().all(|b| b.width_percent == 25.0));

    assert_eq!(rendered.overflow.len(), 1);
    let bucket = &rendered.overflow[0];
    assert_eq!(bucket.day_index, 3);
    assert_eq!(bucket.left_percent, 75.0);
    assert_eq!(bucket.label, "+2 more");
}
