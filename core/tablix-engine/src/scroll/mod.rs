//! FILENAME: core/tablix-engine/src/scroll/mod.rs
//! Scroll and gesture primitives: the scrollbar model and touch handling.

pub mod scrollbar;
pub mod touch;

pub use scrollbar::Scrollbar;
pub use touch::{
    AxisLock, GestureClassifier, ItemSizes, ScrollDelta, Slide, TouchManager, TouchRegion,
    TouchRegionKind,
};
