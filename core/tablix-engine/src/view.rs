//! FILENAME: core/tablix-engine/src/view.rs
//! Tablix View - Renderable output for the frontend.
//!
//! A view is a snapshot of one pass: every realized cell with its pixel
//! rectangle, spans and content, plus the realized leaves of each axis.
//! It owns its data, so a host can keep drawing the previous frame while
//! a new pass runs, or ship it across a bridge as JSON.
//!
//! Coordinates are viewport pixels. Row headers sit left of the body, column
//! headers above it. The first realized leaf of each axis is shifted by the
//! fractional part of the scroll offset, so it may start before the body.

use serde::{Deserialize, Serialize};

use crate::cell::{CellKey, CellRole, Rect, Size, TablixCell};
use crate::dimension::TablixDimension;
use crate::error::Result;
use crate::grid::TablixGrid;
use crate::layout::TablixLayoutManager;
use crate::navigator::{Axis, HierarchyNavigator};

// ============================================================================
// FRAME LEAVES
// ============================================================================

/// A realized leaf of one axis and its pixel extent along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameLeaf {
    pub leaf_index: usize,
    /// Start along the axis, in viewport pixels.
    pub offset: f64,
    pub size: f64,
}

impl FrameLeaf {
    pub fn end(&self) -> f64 {
        self.offset + self.size
    }
}

// ============================================================================
// VIEW CELL
// ============================================================================

/// A single cell in the rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablixViewCell {
    pub key: CellKey,

    pub role: CellRole,

    /// Container rectangle in viewport pixels.
    pub rect: Rect,

    /// Size the content asked for. Smaller than the container when the
    /// cell was stretched for alignment.
    pub content_size: Size,

    /// Text produced by the binder.
    pub text: String,

    /// Style classes produced by the binder.
    pub classes: Vec<String>,

    pub indent: u8,

    /// Rows covered: realized leaves for row headers, header levels for
    /// column headers.
    pub row_span: u32,

    /// Columns covered: realized leaves for column headers, header levels
    /// for row headers.
    pub col_span: u32,

    /// Header level; row level for corners.
    pub level: usize,

    pub is_leaf: bool,

    pub is_first: bool,

    pub is_last: bool,

    /// Column leaf headers can be resized by the user.
    pub resizable: bool,

    pub row_leaf: Option<usize>,

    pub column_leaf: Option<usize>,
}

impl TablixViewCell {
    fn from_cell<N: HierarchyNavigator>(cell: &TablixCell<N>, rect: Rect) -> Self {
        let context = cell.context();
        let content = cell.content();
        let (row_span, col_span) = cell.spans();
        TablixViewCell {
            key: cell.key().clone(),
            role: context.role,
            rect,
            content_size: cell.content_size(),
            text: content.text.clone(),
            classes: content.classes.clone(),
            indent: content.indent,
            row_span,
            col_span,
            level: context.level,
            is_leaf: context.is_leaf,
            is_first: context.is_first,
            is_last: context.is_last,
            resizable: cell.is_resizable(),
            row_leaf: context.row_leaf,
            column_leaf: context.column_leaf,
        }
    }
}

// ============================================================================
// MAIN VIEW STRUCT
// ============================================================================

/// The complete rendered frame of a tablix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablixView {
    /// Rendering session that produced the frame.
    pub session: u64,

    /// Pass number within the control's lifetime.
    pub pass: u64,

    pub viewport: Size,

    /// Width of the row header region (sum of row level sizes).
    pub row_header_width: f64,

    /// Height of the column header region (sum of column level sizes).
    pub column_header_height: f64,

    /// Width of each row header column.
    pub row_level_sizes: Vec<f64>,

    /// Height of each column header row.
    pub column_level_sizes: Vec<f64>,

    /// Scroll offsets the frame was rendered at.
    pub row_offset: f64,
    pub column_offset: f64,

    /// Realized row leaves, top to bottom.
    pub rows: Vec<FrameLeaf>,

    /// Realized column leaves, left to right.
    pub columns: Vec<FrameLeaf>,

    /// Corners first, then column headers, row headers and body cells.
    pub cells: Vec<TablixViewCell>,
}

impl TablixView {
    /// Snapshots the grid after layout.
    pub(crate) fn build<N: HierarchyNavigator>(
        session: u64,
        grid: &TablixGrid<N>,
        layout: &TablixLayoutManager,
        rows: &TablixDimension<N::Items>,
        columns: &TablixDimension<N::Items>,
        viewport: Size,
    ) -> Self {
        let row_layout = layout.dimension(Axis::Row);
        let column_layout = layout.dimension(Axis::Column);
        let row_header_width = row_layout.levels_total();
        let column_header_height = column_layout.levels_total();

        let frame_rows = frame_leaves(grid, layout, Axis::Row, column_header_height, rows.fraction());
        let frame_columns = frame_leaves(grid, layout, Axis::Column, row_header_width, columns.fraction());

        let mut cells = Vec::with_capacity(grid.live());
        for &(row_level, column_level, id) in grid.corners() {
            let cell = grid.cell(id);
            let container = cell.container();
            let rect = Rect::new(
                row_layout.level_offset(row_level),
                column_layout.level_offset(column_level),
                container.width,
                container.height,
            );
            cells.push(TablixViewCell::from_cell(cell, rect));
        }

        for axis in [Axis::Column, Axis::Row] {
            let frame = match axis {
                Axis::Row => &frame_rows,
                Axis::Column => &frame_columns,
            };
            for header in &grid.window(axis).headers {
                let Some(start) = frame.get(header.first) else {
                    continue;
                };
                let cell = grid.cell(header.cell);
                let container = cell.container();
                let across = layout.dimension(axis).level_offset(header.level);
                let rect = match axis {
                    Axis::Row => Rect::new(across, start.offset, container.width, container.height),
                    Axis::Column => Rect::new(start.offset, across, container.width, container.height),
                };
                cells.push(TablixViewCell::from_cell(cell, rect));
            }
        }

        for row in &frame_rows {
            for column in &frame_columns {
                if let Some(cell) = grid.body_cell(row.leaf_index, column.leaf_index) {
                    let rect = Rect::new(column.offset, row.offset, column.size, row.size);
                    cells.push(TablixViewCell::from_cell(cell, rect));
                }
            }
        }

        TablixView {
            session,
            pass: grid.pass(),
            viewport,
            row_header_width,
            column_header_height,
            row_level_sizes: row_layout.level_sizes().to_vec(),
            column_level_sizes: column_layout.level_sizes().to_vec(),
            row_offset: rows.offset(),
            column_offset: columns.offset(),
            rows: frame_rows,
            columns: frame_columns,
            cells,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn cell(&self, key: &CellKey) -> Option<&TablixViewCell> {
        self.cells.iter().find(|c| &c.key == key)
    }

    pub fn cells_by_role(&self, role: CellRole) -> impl Iterator<Item = &TablixViewCell> + '_ {
        self.cells.iter().filter(move |c| c.role == role)
    }

    pub fn leaves(&self, axis: Axis) -> &[FrameLeaf] {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    pub fn realized_leaf_indices(&self, axis: Axis) -> Vec<usize> {
        self.leaves(axis).iter().map(|l| l.leaf_index).collect()
    }

    /// The scrollable region right of the row headers and below the column
    /// headers.
    pub fn body_rect(&self) -> Rect {
        Rect::new(
            self.row_header_width,
            self.column_header_height,
            (self.viewport.width - self.row_header_width).max(0.0),
            (self.viewport.height - self.column_header_height).max(0.0),
        )
    }

    pub fn row_header_rect(&self) -> Rect {
        Rect::new(
            0.0,
            self.column_header_height,
            self.row_header_width.min(self.viewport.width),
            (self.viewport.height - self.column_header_height).max(0.0),
        )
    }

    pub fn column_header_rect(&self) -> Rect {
        Rect::new(
            self.row_header_width,
            0.0,
            (self.viewport.width - self.row_header_width).max(0.0),
            self.column_header_height.min(self.viewport.height),
        )
    }

    /// Number of leaves visible in the body, counting partial leaves by
    /// their visible fraction.
    pub fn visible_extent(&self, axis: Axis) -> f64 {
        let body = self.body_rect();
        let (start, end) = match axis {
            Axis::Row => (body.y, body.bottom()),
            Axis::Column => (body.x, body.right()),
        };
        self.leaves(axis)
            .iter()
            .filter(|leaf| leaf.size > 0.0)
            .map(|leaf| {
                let visible = leaf.end().min(end) - leaf.offset.max(start);
                (visible / leaf.size).clamp(0.0, 1.0)
            })
            .sum()
    }

    /// Body space left empty after the last realized leaf, in average
    /// leaves. Non-zero when the data ran out before the body was full.
    pub fn unfilled_extent(&self, axis: Axis) -> f64 {
        let body = self.body_rect();
        let (start, end) = match axis {
            Axis::Row => (body.y, body.bottom()),
            Axis::Column => (body.x, body.right()),
        };
        let Some(average) = self.average_item_size(axis).filter(|size| *size > 0.0) else {
            return 0.0;
        };
        let last = self.leaves(axis).last().map(FrameLeaf::end).unwrap_or(start);
        (end - last.max(start)).max(0.0) / average
    }

    /// Mean pixel size of the realized leaves, or `None` when none are.
    pub fn average_item_size(&self, axis: Axis) -> Option<f64> {
        let leaves = self.leaves(axis);
        if leaves.is_empty() {
            return None;
        }
        let total: f64 = leaves.iter().map(|l| l.size).sum();
        Some(total / leaves.len() as f64)
    }
}

/// Lays the realized leaves of one axis end to end, starting `start` px
/// into the viewport minus the scrolled-out part of the first leaf.
fn frame_leaves<N: HierarchyNavigator>(
    grid: &TablixGrid<N>,
    layout: &TablixLayoutManager,
    axis: Axis,
    start: f64,
    fraction: f64,
) -> Vec<FrameLeaf> {
    let sizes = layout.dimension(axis);
    let window = grid.window(axis);
    let mut offset = start - fraction * sizes.leaf_size(0);
    window
        .leaves
        .iter()
        .enumerate()
        .map(|(position, leaf)| {
            let size = sizes.leaf_size(position);
            let frame = FrameLeaf {
                leaf_index: leaf.leaf_index,
                offset,
                size,
            };
            offset += size;
            frame
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_view() -> TablixView {
        TablixView {
            session: 1,
            pass: 1,
            viewport: Size::new(200.0, 100.0),
            row_header_width: 50.0,
            column_header_height: 20.0,
            row_level_sizes: vec![50.0],
            column_level_sizes: vec![20.0],
            row_offset: 0.5,
            column_offset: 0.0,
            rows: vec![
                FrameLeaf { leaf_index: 0, offset: 10.0, size: 20.0 },
                FrameLeaf { leaf_index: 1, offset: 30.0, size: 20.0 },
                FrameLeaf { leaf_index: 2, offset: 50.0, size: 20.0 },
                FrameLeaf { leaf_index: 3, offset: 70.0, size: 40.0 },
            ],
            columns: vec![
                FrameLeaf { leaf_index: 0, offset: 50.0, size: 100.0 },
                FrameLeaf { leaf_index: 1, offset: 150.0, size: 100.0 },
            ],
            cells: Vec::new(),
        }
    }

    #[test]
    fn test_regions() {
        let view = create_test_view();
        assert_eq!(view.body_rect(), Rect::new(50.0, 20.0, 150.0, 80.0));
        assert_eq!(view.row_header_rect(), Rect::new(0.0, 20.0, 50.0, 80.0));
        assert_eq!(view.column_header_rect(), Rect::new(50.0, 0.0, 150.0, 20.0));
    }

    #[test]
    fn test_visible_extent_counts_partial_leaves() {
        let view = create_test_view();
        // Rows: half of the first, two full, 30 of 40 px of the last.
        assert_eq!(view.visible_extent(Axis::Row), 0.5 + 1.0 + 1.0 + 0.75);
        assert_eq!(view.visible_extent(Axis::Column), 1.5);
    }

    #[test]
    fn test_unfilled_extent() {
        let mut view = create_test_view();
        assert_eq!(view.unfilled_extent(Axis::Row), 0.0);
        view.rows.truncate(2);
        // Rows end at 50, the body at 100; 50 px of 20 px rows.
        assert_eq!(view.unfilled_extent(Axis::Row), 2.5);
    }

    #[test]
    fn test_average_item_size() {
        let view = create_test_view();
        assert_eq!(view.average_item_size(Axis::Row), Some(25.0));
        assert_eq!(view.realized_leaf_indices(Axis::Column), vec![0, 1]);
        let mut empty = view.clone();
        empty.rows.clear();
        assert_eq!(empty.average_item_size(Axis::Row), None);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let json = create_test_view().to_json().unwrap();
        assert!(json.contains("\"rowHeaderWidth\":50.0"));
        assert!(json.contains("\"leafIndex\":3"));
    }
}
