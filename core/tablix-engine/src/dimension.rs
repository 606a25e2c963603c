//! FILENAME: core/tablix-engine/src/dimension.rs
//! Tablix Dimension - Scroll state of one axis.
//!
//! The offset is fractional: the integer part is the first visible leaf,
//! the fraction is how much of that leaf is scrolled out of view. It is
//! always clamped to `[0, max(0, leaf_count - visible_extent)]`.

use crate::definition::ScrollbarOptions;
use crate::navigator::Axis;
use crate::scroll::Scrollbar;

#[derive(Debug, Clone)]
pub struct TablixDimension<H> {
    axis: Axis,
    hierarchy: H,
    leaf_count: usize,
    depth: usize,
    offset: f64,
    /// Visible leaves (fractional) measured by the last pass.
    visible_extent: f64,
    scrollbar: Scrollbar,
}

impl<H> TablixDimension<H> {
    pub fn new(axis: Axis, hierarchy: H, leaf_count: usize, depth: usize, scrollbar: ScrollbarOptions) -> Self {
        TablixDimension {
            axis,
            hierarchy,
            leaf_count,
            depth,
            offset: 0.0,
            visible_extent: 0.0,
            scrollbar: Scrollbar::new(scrollbar),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Points the dimension at a new hierarchy snapshot and re-clamps.
    pub fn rebind(&mut self, hierarchy: H, leaf_count: usize, depth: usize) {
        self.hierarchy = hierarchy;
        self.leaf_count = leaf_count;
        self.depth = depth;
        self.visible_extent = self.visible_extent.min(leaf_count as f64);
        self.offset = self.clamp(self.offset);
        self.sync_scrollbar();
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn first_visible_leaf(&self) -> usize {
        self.offset.floor() as usize
    }

    pub fn fraction(&self) -> f64 {
        self.offset - self.offset.floor()
    }

    pub fn visible_extent(&self) -> f64 {
        self.visible_extent
    }

    /// Before the first pass the extent is unknown; the last leaf stays
    /// reachable but the offset cannot run past it.
    pub fn max_offset(&self) -> f64 {
        (self.leaf_count as f64 - self.visible_extent.max(1.0)).max(0.0)
    }

    pub fn clamp(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return if offset == f64::INFINITY { self.max_offset() } else { 0.0 };
        }
        offset.clamp(0.0, self.max_offset())
    }

    /// Sets the clamped offset. Returns whether it changed.
    pub fn set_offset(&mut self, offset: f64) -> bool {
        let clamped = self.clamp(offset);
        let changed = clamped != self.offset;
        self.offset = clamped;
        self.sync_scrollbar();
        changed
    }

    /// Records the extent of the last pass. Returns whether the offset had
    /// to be pulled back into range.
    pub fn set_visible_extent(&mut self, extent: f64) -> bool {
        self.visible_extent = extent.clamp(0.0, self.leaf_count as f64);
        let clamped = self.clamp(self.offset);
        let changed = clamped != self.offset;
        self.offset = clamped;
        self.sync_scrollbar();
        changed
    }

    pub fn scrollbar(&self) -> &Scrollbar {
        &self.scrollbar
    }

    pub fn scrollbar_mut(&mut self) -> &mut Scrollbar {
        &mut self.scrollbar
    }

    fn sync_scrollbar(&mut self) {
        self.scrollbar
            .update(self.leaf_count as f64, self.visible_extent, self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dimension() -> TablixDimension<()> {
        let mut dim = TablixDimension::new(Axis::Row, (), 100, 1, ScrollbarOptions::default());
        dim.set_visible_extent(10.5);
        dim
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut dim = create_test_dimension();
        assert_eq!(dim.max_offset(), 89.5);
        assert!(dim.set_offset(500.0));
        assert_eq!(dim.offset(), 89.5);
        assert!(dim.set_offset(-3.0));
        assert_eq!(dim.offset(), 0.0);
        assert!(!dim.set_offset(f64::NAN));
        assert_eq!(dim.offset(), 0.0);
    }

    #[test]
    fn test_fractional_offset() {
        let mut dim = create_test_dimension();
        dim.set_offset(12.25);
        assert_eq!(dim.first_visible_leaf(), 12);
        assert_eq!(dim.fraction(), 0.25);
        assert_eq!(dim.scrollbar().offset(), 12.25);
    }

    #[test]
    fn test_rebind_shrinks_offset() {
        let mut dim = create_test_dimension();
        dim.set_offset(80.0);
        dim.rebind((), 20, 1);
        assert_eq!(dim.offset(), 9.5);
    }

    #[test]
    fn test_everything_visible_pins_to_zero() {
        let mut dim = create_test_dimension();
        dim.set_offset(4.0);
        assert!(dim.set_visible_extent(200.0));
        assert_eq!(dim.offset(), 0.0);
        assert_eq!(dim.max_offset(), 0.0);
    }
}
