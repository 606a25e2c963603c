//! FILENAME: core/tablix-engine/src/scroll/touch.rs
//! Touch - Regions, axis-lock classification and momentum slides.
//!
//! The viewport is split into non-overlapping regions. A gesture starts in
//! one region and keeps its handler until release: the row header region
//! scrolls rows only, the column header region columns only, the body both.
//! Pixel deltas are turned into item deltas with the live average item
//! sizes the control passes in on every move.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cell::Rect;
use crate::definition::TouchOptions;
use crate::error::{Result, TablixError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TouchRegionKind {
    RowHeader,
    ColumnHeader,
    Body,
}

impl TouchRegionKind {
    fn filter(self, dx: f64, dy: f64) -> (f64, f64) {
        match self {
            TouchRegionKind::RowHeader => (0.0, dy),
            TouchRegionKind::ColumnHeader => (dx, 0.0),
            TouchRegionKind::Body => (dx, dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchRegion {
    pub kind: TouchRegionKind,
    pub rect: Rect,
}

/// Scroll movement in items. Positive values move toward the end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollDelta {
    pub rows: f64,
    pub columns: f64,
}

impl ScrollDelta {
    pub fn is_zero(&self) -> bool {
        self.rows == 0.0 && self.columns == 0.0
    }
}

/// Average pixel size of one item per axis, measured from the live frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSizes {
    pub row: f64,
    pub column: f64,
}

impl ItemSizes {
    /// Finger movement (px) to item movement. Dragging content left or up
    /// reveals later items.
    fn to_delta(self, dx: f64, dy: f64) -> ScrollDelta {
        ScrollDelta {
            rows: if self.row > 0.0 { -dy / self.row } else { 0.0 },
            columns: if self.column > 0.0 { -dx / self.column } else { 0.0 },
        }
    }
}

// ============================================================================
// GESTURE CLASSIFIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    Undecided,
    Horizontal,
    Vertical,
    Free,
}

/// Locks a gesture to one axis once its first movement clearly favors it.
/// Movement is held back until the decision, then released at once.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    lock: AxisLock,
    pending: (f64, f64),
    samples: usize,
    lock_distance: f64,
    lock_ratio: f64,
    lock_samples: usize,
}

impl GestureClassifier {
    pub fn new(options: &TouchOptions) -> Self {
        GestureClassifier {
            lock: AxisLock::Undecided,
            pending: (0.0, 0.0),
            samples: 0,
            lock_distance: options.lock_distance,
            lock_ratio: options.lock_ratio,
            lock_samples: options.lock_samples,
        }
    }

    pub fn lock(&self) -> AxisLock {
        self.lock
    }

    pub fn push(&mut self, dx: f64, dy: f64) -> Option<(f64, f64)> {
        if self.lock == AxisLock::Undecided {
            self.pending.0 += dx;
            self.pending.1 += dy;
            self.samples += 1;

            let (ax, ay) = (self.pending.0.abs(), self.pending.1.abs());
            if ax.hypot(ay) < self.lock_distance {
                return None;
            }
            self.lock = if ax >= self.lock_ratio * ay {
                AxisLock::Horizontal
            } else if ay >= self.lock_ratio * ax {
                AxisLock::Vertical
            } else if self.samples >= self.lock_samples {
                AxisLock::Free
            } else {
                return None;
            };
            let (px, py) = std::mem::take(&mut self.pending);
            return Some(self.apply(px, py));
        }
        Some(self.apply(dx, dy))
    }

    fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        match self.lock {
            AxisLock::Horizontal => (dx, 0.0),
            AxisLock::Vertical => (0.0, dy),
            AxisLock::Free | AxisLock::Undecided => (dx, dy),
        }
    }
}

// ============================================================================
// SLIDE
// ============================================================================

/// Momentum after a fast release: a bounded number of decaying steps.
#[derive(Debug, Clone)]
pub struct Slide {
    /// px per ms
    velocity: (f64, f64),
    decay: f64,
    frame_ms: f64,
    steps_left: usize,
}

impl Slide {
    pub fn new(velocity: (f64, f64), options: &TouchOptions) -> Self {
        Slide {
            velocity,
            decay: options.slide_decay,
            frame_ms: options.slide_frame_ms,
            steps_left: options.max_slide_steps,
        }
    }

    pub fn steps_left(&self) -> usize {
        self.steps_left
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    /// Next step in items, or `None` once the slide is over.
    pub fn next_step(&mut self, sizes: ItemSizes) -> Option<ScrollDelta> {
        if self.steps_left == 0 {
            return None;
        }
        self.steps_left -= 1;
        let dx = self.velocity.0 * self.frame_ms;
        let dy = self.velocity.1 * self.frame_ms;
        self.velocity.0 *= self.decay;
        self.velocity.1 *= self.decay;

        let delta = sizes.to_delta(dx, dy);
        if delta.rows.abs() < 1e-3 && delta.columns.abs() < 1e-3 {
            self.steps_left = 0;
            return None;
        }
        Some(delta)
    }

    pub fn stop(&mut self) {
        self.steps_left = 0;
    }
}

// ============================================================================
// TOUCH MANAGER
// ============================================================================

#[derive(Debug, Clone)]
struct ActiveGesture {
    region: TouchRegionKind,
    last: (f64, f64),
    classifier: GestureClassifier,
    /// (time, dx, dy) of recent filtered moves
    samples: VecDeque<(u64, f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct TouchManager {
    options: TouchOptions,
    regions: Vec<TouchRegion>,
    gesture: Option<ActiveGesture>,
}

impl TouchManager {
    pub fn new(options: TouchOptions) -> Self {
        TouchManager {
            options,
            regions: Vec::new(),
            gesture: None,
        }
    }

    pub fn regions(&self) -> &[TouchRegion] {
        &self.regions
    }

    pub fn add_region(&mut self, kind: TouchRegionKind, rect: Rect) -> Result<()> {
        if self.regions.iter().any(|r| r.rect.intersects(&rect)) {
            return Err(TablixError::OverlappingTouchRegion { kind });
        }
        self.regions.push(TouchRegion { kind, rect });
        Ok(())
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
    }

    pub fn region_at(&self, x: f64, y: f64) -> Option<TouchRegionKind> {
        self.regions
            .iter()
            .find(|r| r.rect.contains(x, y))
            .map(|r| r.kind)
    }

    pub fn active_region(&self) -> Option<TouchRegionKind> {
        self.gesture.as_ref().map(|g| g.region)
    }

    pub fn axis_lock(&self) -> Option<AxisLock> {
        self.gesture.as_ref().map(|g| g.classifier.lock())
    }

    /// Starts a gesture. Returns false when the point hits no region.
    pub fn start(&mut self, x: f64, y: f64, _now_ms: u64) -> bool {
        self.gesture = self.region_at(x, y).map(|region| ActiveGesture {
            region,
            last: (x, y),
            classifier: GestureClassifier::new(&self.options),
            samples: VecDeque::new(),
        });
        self.gesture.is_some()
    }

    pub fn move_to(&mut self, x: f64, y: f64, now_ms: u64, sizes: ItemSizes) -> Option<ScrollDelta> {
        let window = self.options.velocity_window_ms;
        let gesture = self.gesture.as_mut()?;
        let (dx, dy) = (x - gesture.last.0, y - gesture.last.1);
        gesture.last = (x, y);

        let (dx, dy) = gesture.classifier.push(dx, dy)?;
        let (dx, dy) = gesture.region.filter(dx, dy);
        gesture.samples.push_back((now_ms, dx, dy));
        while let Some(&(time, _, _)) = gesture.samples.front() {
            if now_ms.saturating_sub(time) > window {
                gesture.samples.pop_front();
            } else {
                break;
            }
        }

        let delta = sizes.to_delta(dx, dy);
        if delta.is_zero() {
            None
        } else {
            Some(delta)
        }
    }

    /// Ends the gesture; a fast enough release starts a slide.
    pub fn end(&mut self, now_ms: u64) -> Option<Slide> {
        let gesture = self.gesture.take()?;
        let window = self.options.velocity_window_ms;
        let recent: Vec<&(u64, f64, f64)> = gesture
            .samples
            .iter()
            .filter(|(time, _, _)| now_ms.saturating_sub(*time) <= window)
            .collect();
        let oldest = recent.first()?.0;

        // The oldest sample's movement happened before its timestamp, so
        // time is measured from the sample before it, approximated by one
        // frame.
        let elapsed = (now_ms.saturating_sub(oldest) as f64 + self.options.slide_frame_ms).max(1.0);
        let sum_x: f64 = recent.iter().map(|(_, dx, _)| dx).sum();
        let sum_y: f64 = recent.iter().map(|(_, _, dy)| dy).sum();
        let velocity = (sum_x / elapsed, sum_y / elapsed);

        if velocity.0.hypot(velocity.1) < self.options.slide_velocity_threshold {
            return None;
        }
        log_debug!("TOUCH", "slide started at {:.3}, {:.3} px/ms", velocity.0, velocity.1);
        Some(Slide::new(velocity, &self.options))
    }

    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: ItemSizes = ItemSizes {
        row: 20.0,
        column: 80.0,
    };

    fn create_test_manager() -> TouchManager {
        let mut manager = TouchManager::new(TouchOptions::default());
        manager
            .add_region(TouchRegionKind::RowHeader, Rect::new(0.0, 30.0, 100.0, 300.0))
            .unwrap();
        manager
            .add_region(TouchRegionKind::ColumnHeader, Rect::new(100.0, 0.0, 400.0, 30.0))
            .unwrap();
        manager
            .add_region(TouchRegionKind::Body, Rect::new(100.0, 30.0, 400.0, 300.0))
            .unwrap();
        manager
    }

    #[test]
    fn test_overlapping_region_rejected() {
        let mut manager = create_test_manager();
        let err = manager.add_region(TouchRegionKind::Body, Rect::new(50.0, 50.0, 10.0, 10.0));
        assert!(matches!(
            err,
            Err(TablixError::OverlappingTouchRegion {
                kind: TouchRegionKind::Body
            })
        ));
        assert_eq!(manager.regions().len(), 3);
    }

    #[test]
    fn test_start_outside_regions() {
        let mut manager = create_test_manager();
        assert!(!manager.start(50.0, 10.0, 0));
        assert_eq!(manager.move_to(10.0, 10.0, 10, SIZES), None);
    }

    #[test]
    fn test_classifier_holds_back_small_moves() {
        let mut classifier = GestureClassifier::new(&TouchOptions::default());
        assert_eq!(classifier.push(2.0, 1.0), None);
        assert_eq!(classifier.lock(), AxisLock::Undecided);
        assert_eq!(classifier.push(8.0, 1.0), Some((10.0, 0.0)));
        assert_eq!(classifier.lock(), AxisLock::Horizontal);
    }

    #[test]
    fn test_classifier_goes_free_on_diagonal() {
        let mut classifier = GestureClassifier::new(&TouchOptions::default());
        for _ in 0..3 {
            assert_eq!(classifier.push(3.0, 3.0), None);
        }
        assert_eq!(classifier.push(3.0, 3.0), Some((12.0, 12.0)));
        assert_eq!(classifier.lock(), AxisLock::Free);
        assert_eq!(classifier.push(1.0, -2.0), Some((1.0, -2.0)));
    }

    #[test]
    fn test_row_header_region_scrolls_rows_only() {
        let mut manager = create_test_manager();
        assert!(manager.start(50.0, 200.0, 0));
        let delta = manager.move_to(50.0, 160.0, 16, SIZES).unwrap();
        assert_eq!(delta.rows, 2.0);
        assert_eq!(delta.columns, 0.0);
    }

    #[test]
    fn test_body_drag_left_moves_columns_forward() {
        let mut manager = create_test_manager();
        assert!(manager.start(400.0, 100.0, 0));
        let delta = manager.move_to(240.0, 101.0, 16, SIZES).unwrap();
        assert_eq!(delta.columns, 2.0);
        assert_eq!(delta.rows, 0.0);
        assert_eq!(manager.axis_lock(), Some(AxisLock::Horizontal));
    }

    #[test]
    fn test_slow_release_does_not_slide() {
        let mut manager = create_test_manager();
        manager.start(400.0, 100.0, 0);
        manager.move_to(380.0, 100.0, 100, SIZES);
        assert!(manager.end(400).is_none());
    }

    #[test]
    fn test_fast_release_slides_a_bounded_number_of_steps() {
        let mut manager = create_test_manager();
        manager.start(300.0, 300.0, 0);
        manager.move_to(300.0, 280.0, 16, SIZES);
        manager.move_to(300.0, 240.0, 32, SIZES);
        let mut slide = manager.end(40).unwrap();
        assert!(slide.velocity().1 < 0.0);

        let mut steps = 0;
        let mut last = f64::INFINITY;
        while let Some(delta) = slide.next_step(SIZES) {
            assert!(delta.rows > 0.0);
            assert!(delta.rows < last);
            last = delta.rows;
            steps += 1;
        }
        assert!(steps <= TouchOptions::default().max_slide_steps);
        assert!(steps > 0);
    }
}
