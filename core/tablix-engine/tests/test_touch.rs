//! FILENAME: tests/test_touch.rs
//! Integration tests for touch gestures and momentum slides.

mod common;

use common::TestHarness;
use tablix_engine::scroll::AxisLock;
use tablix_engine::{Axis, PassKind, TouchRegionKind};

// Regions of the 400x210 table: row headers x < 60, column headers y < 20.

#[test]
fn test_touch_regions_follow_the_frame() {
    let harness = TestHarness::table(100, 10);
    let touch = harness.control.touch();
    assert_eq!(touch.regions().len(), 3);
    assert_eq!(touch.region_at(200.0, 100.0), Some(TouchRegionKind::Body));
    assert_eq!(touch.region_at(30.0, 100.0), Some(TouchRegionKind::RowHeader));
    assert_eq!(touch.region_at(200.0, 10.0), Some(TouchRegionKind::ColumnHeader));
    // The corner is not a touch region.
    assert_eq!(touch.region_at(30.0, 10.0), None);
}

#[test]
fn test_touch_outside_regions_is_ignored() {
    let mut harness = TestHarness::table(100, 10);
    assert!(!harness.control.touch_start(30.0, 10.0, 0));
    assert!(harness.control.touch_move(30.0, 100.0, 16).is_none());
    assert!(!harness.control.touch_end(32));
}

#[test]
fn test_vertical_drag_scrolls_rows() {
    let mut harness = TestHarness::table(100, 10);
    assert!(harness.control.touch_start(200.0, 100.0, 0));

    // Dragging up by two rows reveals later rows.
    let report = harness.control.touch_move(200.0, 60.0, 16).unwrap();
    assert_eq!(report.kind, PassKind::Scroll);
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 2.0);
    assert_eq!(harness.control.touch().axis_lock(), Some(AxisLock::Vertical));

    // Locked vertically: the sideways part is dropped.
    harness.control.touch_move(190.0, 20.0, 32).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 4.0);
    assert_eq!(harness.control.dimension(Axis::Column).offset(), 0.0);
}

#[test]
fn test_small_moves_wait_for_the_axis_decision() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.touch_start(200.0, 100.0, 0);
    assert!(harness.control.touch_move(200.0, 97.0, 16).is_none());
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 0.0);

    // The held-back movement is released once the gesture locks.
    harness.control.touch_move(200.0, 80.0, 32).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 1.0);
}

#[test]
fn test_row_header_only_scrolls_vertically() {
    let mut harness = TestHarness::table(100, 10);
    assert!(harness.control.touch_start(50.0, 100.0, 0));
    // A sideways drag on the row headers moves nothing.
    assert!(harness.control.touch_move(10.0, 100.0, 16).is_none());
    assert_eq!(harness.control.dimension(Axis::Column).offset(), 0.0);
}

#[test]
fn test_column_header_drag_scrolls_columns() {
    let mut harness = TestHarness::table(100, 10);
    assert!(harness.control.touch_start(200.0, 10.0, 0));
    harness.control.touch_move(80.0, 10.0, 16).unwrap();
    assert_eq!(harness.control.dimension(Axis::Column).offset(), 2.0);
    assert_eq!(harness.view().columns[0].leaf_index, 2);
}

#[test]
fn test_fast_release_slides_then_stops() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.touch_start(200.0, 100.0, 0);
    harness.control.touch_move(200.0, 60.0, 16).unwrap();
    harness.control.touch_move(200.0, 20.0, 32).unwrap();
    assert!(harness.control.touch_end(40));
    assert!(harness.control.is_sliding());

    let mut frames = 0;
    while harness.control.slide_frame().is_some() {
        frames += 1;
        assert!(frames <= 10, "slide did not stop");
    }
    assert!(!harness.control.is_sliding());
    assert_eq!(frames, 10);

    let offset = harness.control.dimension(Axis::Row).offset();
    assert!(offset > 11.0 && offset < 11.3, "offset {}", offset);
    assert_eq!(harness.view().row_offset, offset);
}

#[test]
fn test_slow_release_does_not_slide() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.touch_start(200.0, 100.0, 0);
    harness.control.touch_move(200.0, 60.0, 16).unwrap();
    // Released long after the last move.
    assert!(!harness.control.touch_end(500));
    assert!(harness.control.slide_frame().is_none());
}

#[test]
fn test_slide_stops_at_data_bounds() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.scroll_to(Axis::Row, 88.0).unwrap();

    harness.control.touch_start(200.0, 100.0, 0);
    harness.control.touch_move(200.0, 20.0, 16).unwrap();
    assert_eq!(harness.control.dimension(Axis::Row).offset(), 90.5);
    assert!(harness.control.touch_end(20));

    assert!(harness.control.slide_frame().is_none());
    assert!(!harness.control.is_sliding());
}

#[test]
fn test_new_touch_stops_a_slide() {
    let mut harness = TestHarness::table(100, 10);
    harness.control.touch_start(200.0, 100.0, 0);
    harness.control.touch_move(200.0, 20.0, 16).unwrap();
    assert!(harness.control.touch_end(20));

    harness.control.touch_start(200.0, 100.0, 30);
    assert!(!harness.control.is_sliding());
    assert!(harness.control.slide_frame().is_none());
}
