//! FILENAME: core/tablix-engine/src/realization.rs
//! Realization Manager - The adaptive estimator of one axis.
//!
//! Each iteration of a pass asks how many more items to realize to fill
//! the remaining space. The answer comes from a decaying average of pixels
//! per realized item. After every iteration the prediction is compared
//! with what the realized items really consumed; the ratio is clamped to
//! [min_correction, max_correction] and the average moves toward it by
//! the decay weight, so one odd batch cannot make the estimate oscillate.
//!
//! The estimate survives scroll passes and is reset by every rendering
//! session.

use rustc_hash::FxHashSet;

use crate::definition::RealizationOptions;
use crate::navigator::Axis;

#[derive(Debug, Clone)]
pub struct RealizationManager {
    axis: Axis,
    options: RealizationOptions,
    /// Decaying average px per item; `None` until the first sample.
    average: Option<f64>,
    /// Factor the last iteration applied to the prediction.
    adjustment: f64,
    realized_in_pass: usize,
    iterations_in_pass: usize,
    /// Leaves realized since the session started, one entry each.
    realized_leaves: FxHashSet<usize>,
    realized_corners: FxHashSet<(usize, usize)>,
}

impl RealizationManager {
    pub fn new(axis: Axis, options: RealizationOptions) -> Self {
        RealizationManager {
            axis,
            options,
            average: None,
            adjustment: 1.0,
            realized_in_pass: 0,
            iterations_in_pass: 0,
            realized_leaves: FxHashSet::default(),
            realized_corners: FxHashSet::default(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn on_start_rendering_session(&mut self) {
        self.average = None;
        self.adjustment = 1.0;
        self.realized_leaves.clear();
        self.realized_corners.clear();
        self.on_start_pass();
    }

    pub fn on_start_pass(&mut self) {
        self.realized_in_pass = 0;
        self.iterations_in_pass = 0;
    }

    fn initial_size(&self) -> f64 {
        match self.axis {
            Axis::Row => self.options.initial_row_height,
            Axis::Column => self.options.initial_column_width,
        }
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn adjustment(&self) -> f64 {
        self.adjustment
    }

    /// Pixels one more item is expected to consume.
    pub fn estimate_per_item(&self) -> f64 {
        self.average.unwrap_or_else(|| self.initial_size())
    }

    /// Items to realize to cover `remaining` px, with `available` items
    /// left in the data. Zero only when nothing is left to do.
    pub fn items_to_realize(&self, remaining: f64, available: usize) -> usize {
        if available == 0 || !(remaining > 0.0) {
            return 0;
        }
        let per_item = self.estimate_per_item();
        let wanted = if per_item > 0.0 && per_item.is_finite() {
            (remaining / per_item).ceil()
        } else {
            1.0
        };
        let cap = self.options.max_items_per_iteration.min(available).max(1);
        if wanted.is_finite() {
            (wanted as usize).clamp(1, cap)
        } else {
            cap
        }
    }

    /// Feeds back what the last iteration consumed.
    pub fn on_end_iteration(&mut self, consumed: f64, realized: usize) {
        self.iterations_in_pass += 1;
        self.realized_in_pass += realized;
        if realized == 0 || !(consumed > 0.0) || !consumed.is_finite() {
            return;
        }

        let sample = consumed / realized as f64;
        // The first sample replaces the configured guess outright.
        let (average, adjustment) = match self.average {
            Some(predicted) => {
                let ratio = (sample / predicted)
                    .clamp(self.options.min_correction, self.options.max_correction);
                let adjustment = 1.0 + self.options.average_decay * (ratio - 1.0);
                (predicted * adjustment, adjustment)
            }
            None => (sample, 1.0),
        };
        self.average = Some(average);
        self.adjustment = adjustment;

        log_debug!(
            "REALIZE",
            "{:?}: {} items took {:.1}px, average {:.2}, adjustment {:.3}",
            self.axis,
            realized,
            consumed,
            average,
            self.adjustment
        );
    }

    /// True the first time `leaf` is realized in this session.
    pub fn on_leaf_realized(&mut self, leaf: usize) -> bool {
        self.realized_leaves.insert(leaf)
    }

    /// True the first time the corner is realized in this session.
    pub fn on_corner_realized(&mut self, row_level: usize, column_level: usize) -> bool {
        self.realized_corners.insert((row_level, column_level))
    }

    pub fn realized_in_pass(&self) -> usize {
        self.realized_in_pass
    }

    pub fn iterations_in_pass(&self) -> usize {
        self.iterations_in_pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_manager() -> RealizationManager {
        RealizationManager::new(Axis::Row, RealizationOptions::default())
    }

    #[test]
    fn test_first_estimate_uses_initial_size() {
        let manager = create_test_manager();
        assert_eq!(manager.items_to_realize(200.0, 1_000), 10);
        assert_eq!(manager.items_to_realize(210.0, 1_000), 11);
    }

    #[test]
    fn test_never_more_than_available() {
        let manager = create_test_manager();
        assert_eq!(manager.items_to_realize(10_000.0, 7), 7);
        assert_eq!(manager.items_to_realize(10_000.0, 0), 0);
        assert_eq!(manager.items_to_realize(0.0, 10), 0);
    }

    #[test]
    fn test_capped_per_iteration() {
        let manager = create_test_manager();
        assert_eq!(manager.items_to_realize(1.0e9, 1_000_000), 500);
    }

    #[test]
    fn test_always_at_least_one() {
        let manager = create_test_manager();
        assert_eq!(manager.items_to_realize(0.5, 10), 1);
    }

    #[test]
    fn test_estimate_adapts_to_larger_items() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(400.0, 10);
        assert_eq!(manager.average(), Some(40.0));
        assert_eq!(manager.adjustment(), 1.0);
        assert_eq!(manager.items_to_realize(200.0, 100), 5);
    }

    #[test]
    fn test_correction_is_bounded() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(100.0, 10);
        // A batch 20x larger counts as 2x, then moves half way.
        manager.on_end_iteration(2_000.0, 10);
        assert_eq!(manager.adjustment(), 1.5);
        assert_eq!(manager.average(), Some(15.0));

        manager.on_end_iteration(10.0, 10);
        assert_eq!(manager.adjustment(), 0.75);
        assert_eq!(manager.average(), Some(11.25));
    }

    #[test]
    fn test_alternating_samples_settle_between() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(80.0, 4);
        for per_item in [30.0, 20.0, 30.0, 20.0, 30.0] {
            manager.on_end_iteration(per_item * 4.0, 4);
            let estimate = manager.estimate_per_item();
            assert!(estimate > 20.0 && estimate < 30.0, "estimate {}", estimate);
        }
        // 20, 25, 22.5, 26.25, ...
        assert!((manager.average().unwrap() - 26.5625).abs() < 1e-9);
    }

    #[test]
    fn test_steady_samples_keep_estimate() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(300.0, 5);
        manager.on_end_iteration(600.0, 10);
        assert_eq!(manager.estimate_per_item(), 60.0);
        assert_eq!(manager.adjustment(), 1.0);
    }

    #[test]
    fn test_session_reset() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(400.0, 10);
        assert!(manager.on_leaf_realized(3));
        assert!(!manager.on_leaf_realized(3));
        assert!(manager.on_corner_realized(0, 1));
        assert_eq!(manager.realized_in_pass(), 10);

        manager.on_start_rendering_session();
        assert_eq!(manager.average(), None);
        assert_eq!(manager.realized_in_pass(), 0);
        assert!(manager.on_leaf_realized(3));
        assert!(manager.on_corner_realized(0, 1));
    }

    #[test]
    fn test_empty_iteration_keeps_estimate() {
        let mut manager = create_test_manager();
        manager.on_end_iteration(0.0, 5);
        assert_eq!(manager.average(), None);
        assert_eq!(manager.iterations_in_pass(), 1);
    }
}
