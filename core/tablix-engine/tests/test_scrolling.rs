//! FILENAME: tests/test_scrolling.rs
//! Integration tests for offsets, the scrollbar and resize re-clamping.

mod common;

use common::{table_navigator, test_options, TestHarness};
use tablix_engine::models::LabelBinder;
use tablix_engine::{Axis, PassKind, ScrollbarOptions, TablixOptions, TrackClickMode};

// The 100x10 table at 400x210 shows 9.5 rows, so the last offset is 90.5.

// ============================================================================
// OFFSETS
// ============================================================================

#[test]
fn test_scroll_to_end_clamps() {
    let mut harness = TestHarness::table(100, 10);
    let report = harness.control.scroll_to(Axis::Row, 1e9).unwrap();
    assert_eq!(report.kind, PassKind::Scroll);
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 90.5);

    let rows = harness.view().realized_leaf_indices(Axis::Row);
    assert_eq!(rows.first(), Some(&90));
    assert_eq!(rows.last(), Some(&99));
    // Nothing further to scroll to.
    assert!(harness.control.scroll_delta(Axis::Row, 1.0).is_none());
}

#[test]
fn test_horizontal_scroll_delta() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.scroll_delta(Axis::Column, 1.5).unwrap();
    let view = harness.view();
    assert_eq!(view.column_offset, 1.5);
    assert_eq!(view.columns[0].leaf_index, 1);
    // Half of column 1 is scrolled out behind the row headers.
    assert_eq!(view.columns[0].offset, 30.0);
    assert_eq!(view.rows[0].leaf_index, 0);
}

#[test]
fn test_growing_viewport_pulls_offset_back() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.scroll_to(Axis::Row, 90.5).unwrap();

    // 390 px of body is 19.5 rows; the last offset moves up to 80.5.
    harness.control.update_viewport(400.0, 410.0).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 80.5);
    let view = harness.view();
    assert_eq!(view.row_offset, 80.5);
    assert_eq!(view.rows.len(), 20);
    assert_eq!(view.rows.last().map(|r| r.leaf_index), Some(99));
}

#[test]
fn test_shrinking_viewport_keeps_offset() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.scroll_to(Axis::Row, 40.0).unwrap();
    let report = harness.control.update_viewport(400.0, 110.0).unwrap();
    assert_eq!(report.kind, PassKind::Session);
    assert_eq!(report.rows_realized, 5);
    assert_eq!(harness.view().rows[0].leaf_index, 40);
}

// ============================================================================
// SCROLLBAR
// ============================================================================

#[test]
fn test_wheel_scrolls_by_lines() {
    let mut harness = TestHarness::table(100, 10);
    assert!(harness.control.scrollbar_wheel(Axis::Row, -1.0).is_none());
    harness.control.scrollbar_wheel(Axis::Row, 1.0).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 3.0);
    harness.control.scrollbar_wheel(Axis::Row, -0.5).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 1.5);
}

#[test]
fn test_track_click_pages_and_repeats() {
    let mut harness = TestHarness::table(100, 10);
    // Thumb is 18.05 px at the top of a 190 px track.
    harness.control.scrollbar_pointer_down(Axis::Row, 150.0, 0).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 9.5);
    assert!(harness.control.dimension(Axis::Row).scrollbar().is_repeating());

    assert!(harness.control.scrollbar_tick(Axis::Row, 100).is_none());
    harness.control.scrollbar_tick(Axis::Row, 400).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 19.0);

    harness.control.scrollbar_pointer_up(Axis::Row);
    assert!(harness.control.scrollbar_tick(Axis::Row, 1000).is_none());
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 19.0);
}

#[test]
fn test_thumb_drag_maps_to_offset() {
    let mut harness = TestHarness::table(100, 10);
    assert!(harness.control.scrollbar_pointer_down(Axis::Row, 5.0, 0).is_none());
    assert!(harness.control.dimension(Axis::Row).scrollbar().is_dragging());

    harness.control.scrollbar_pointer_move(Axis::Row, 500.0).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 90.5);

    harness.control.scrollbar_pointer_up(Axis::Row);
    assert!(harness.control.scrollbar_pointer_move(Axis::Row, 5.0).is_none());
}

#[test]
fn test_track_click_centers_thumb() {
    let options = TablixOptions {
        scrollbar: ScrollbarOptions {
            track_click: TrackClickMode::Center,
            ..ScrollbarOptions::default()
        },
        ..test_options()
    };
    let mut harness = TestHarness::new(table_navigator(100, 10), LabelBinder::new(), options);
    harness.control.update_viewport(400.0, 210.0).unwrap();

    harness.control.scrollbar_pointer_down(Axis::Row, 100.0, 0).unwrap();
    // Thumb start 100 - 18.05 / 2 of 171.95 px of travel.
    let offset = harness.control.dimension(Axis::Row).offset();
    assert!((offset - 47.88).abs() < 0.01, "offset {}", offset);
    assert!(!harness.control.dimension(Axis::Row).scrollbar().is_repeating());
}

#[test]
fn test_scrollbar_hidden_when_everything_fits() {
    let harness = TestHarness::table(5, 3);
    let rows = harness.control.dimension(Axis::Row);
    assert_eq!(rows.visible_extent(), 5.0);
    assert_eq!(rows.max_offset(), 0.0);
    assert!(!rows.scrollbar().is_visible());
}
