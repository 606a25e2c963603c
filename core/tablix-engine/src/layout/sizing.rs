//! FILENAME: core/tablix-engine/src/layout/sizing.rs
//! Cell sizing strategies.
//!
//! Measured mode asks the host surface how large a bound cell renders.
//! Estimated mode computes sizes from character metrics, for surfaces
//! where nothing can be measured before layout.

use serde::{Deserialize, Serialize};

use crate::cell::{CellContent, CellContext, Size};
use crate::definition::TextMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutKind {
    Measured,
    Estimated,
}

/// Produces the natural size of a freshly bound cell.
pub trait CellSizer {
    fn kind(&self) -> LayoutKind;
    fn measure(&mut self, context: &CellContext, content: &CellContent) -> Size;
}

/// The host's "render and read back the box" hook.
pub trait ContentMeasurer {
    fn measure(&mut self, context: &CellContext, content: &CellContent) -> Size;
}

impl<F> ContentMeasurer for F
where
    F: FnMut(&CellContext, &CellContent) -> Size,
{
    fn measure(&mut self, context: &CellContext, content: &CellContent) -> Size {
        self(context, content)
    }
}

// ============================================================================
// MEASURED
// ============================================================================

pub struct MeasuredSizer<M: ContentMeasurer> {
    measurer: M,
    measured: usize,
}

impl<M: ContentMeasurer> MeasuredSizer<M> {
    pub fn new(measurer: M) -> Self {
        MeasuredSizer {
            measurer,
            measured: 0,
        }
    }

    /// Number of measurement calls made so far.
    pub fn measured(&self) -> usize {
        self.measured
    }
}

impl<M: ContentMeasurer> CellSizer for MeasuredSizer<M> {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Measured
    }

    fn measure(&mut self, context: &CellContext, content: &CellContent) -> Size {
        self.measured += 1;
        let size = self.measurer.measure(context, content);
        Size::new(sanitize(size.width), sanitize(size.height))
    }
}

// ============================================================================
// ESTIMATED
// ============================================================================

pub struct EstimatedSizer {
    metrics: TextMetrics,
}

impl EstimatedSizer {
    pub fn new(metrics: TextMetrics) -> Self {
        EstimatedSizer { metrics }
    }
}

impl CellSizer for EstimatedSizer {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Estimated
    }

    fn measure(&mut self, _context: &CellContext, content: &CellContent) -> Size {
        let m = &self.metrics;
        let (lines, widest) = content
            .text
            .split('\n')
            .fold((0usize, 0usize), |(lines, widest), line| {
                (lines + 1, widest.max(line.chars().count()))
            });

        let width = widest as f64 * m.char_width
            + 2.0 * m.horizontal_padding
            + content.indent as f64 * m.indent_width;
        let height = lines.max(1) as f64 * m.line_height + 2.0 * m.vertical_padding;
        Size::new(width.ceil(), height.ceil())
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
