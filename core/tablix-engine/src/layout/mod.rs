//! FILENAME: core/tablix-engine/src/layout/mod.rs
//! Tablix Layout Manager - Sizing for both axes.
//!
//! Owns the cell sizer (measured or estimated) and one
//! `DimensionLayoutManager` per axis, and writes the resulting container
//! sizes and spans back into the realized cells.

pub mod dimension;
pub mod sizing;

pub use dimension::{DimensionLayoutManager, LeafSize};
pub use sizing::{CellSizer, ContentMeasurer, EstimatedSizer, LayoutKind, MeasuredSizer};

use rustc_hash::FxHashSet;

use crate::cell::{CellContent, CellContext, CellKey, Size};
use crate::column_width::ColumnWidthManager;
use crate::definition::SizingOptions;
use crate::grid::TablixGrid;
use crate::navigator::{Axis, HierarchyNavigator};

pub struct TablixLayoutManager {
    sizer: Box<dyn CellSizer>,
    rows: DimensionLayoutManager,
    columns: DimensionLayoutManager,
    /// Corners whose size feeds the header level sizes.
    tracked_corners: FxHashSet<(usize, usize)>,
}

impl TablixLayoutManager {
    pub fn new(sizer: Box<dyn CellSizer>, sizing: &SizingOptions) -> Self {
        TablixLayoutManager {
            sizer,
            rows: DimensionLayoutManager::new(Axis::Row, sizing.min_row_height, sizing.min_level_size),
            columns: DimensionLayoutManager::new(
                Axis::Column,
                sizing.min_column_width,
                sizing.min_level_size,
            ),
            tracked_corners: FxHashSet::default(),
        }
    }

    pub fn kind(&self) -> LayoutKind {
        self.sizer.kind()
    }

    pub fn reset(&mut self) {
        self.rows.reset();
        self.columns.reset();
        self.tracked_corners.clear();
    }

    pub fn dimension(&self, axis: Axis) -> &DimensionLayoutManager {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    pub fn dimension_mut(&mut self, axis: Axis) -> &mut DimensionLayoutManager {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        }
    }

    pub fn measure(&mut self, context: &CellContext, content: &CellContent) -> Size {
        self.sizer.measure(context, content)
    }

    pub fn track_leaf(&mut self, axis: Axis, leaf_index: usize) {
        self.dimension_mut(axis).track_leaf(leaf_index);
    }

    pub fn track_corner(&mut self, row_level: usize, column_level: usize) {
        self.tracked_corners.insert((row_level, column_level));
    }

    /// Level sizes and natural leaf sizes of both axes.
    pub fn calculate<N: HierarchyNavigator>(
        &mut self,
        grid: &TablixGrid<N>,
        widths: &ColumnWidthManager,
        row_headers: bool,
        row_depth: usize,
        column_depth: usize,
    ) {
        let mut row_corners = Vec::new();
        let mut column_corners = Vec::new();
        for &(row_level, column_level, cell) in grid.corners() {
            if !self.tracked_corners.contains(&(row_level, column_level)) {
                continue;
            }
            let size = grid.cell(cell).content_size;
            row_corners.push((row_level, size));
            column_corners.push((column_level, size));
        }

        self.rows
            .calculate_sizes(grid, row_headers, row_depth, &row_corners);
        self.columns
            .calculate_sizes(grid, true, column_depth, &column_corners);
        self.rows.calculate_contextual_widths(grid, None);
        self.columns.calculate_contextual_widths(grid, Some(widths));
    }

    /// Span alignment of both axes.
    pub fn align<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) {
        self.rows.calculate_spans(grid);
        self.columns.calculate_spans(grid);
    }

    pub fn fix_sizes<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) {
        self.rows.fix_sizes(grid);
        self.columns.fix_sizes(grid);
    }

    /// Writes containers and spans into every realized cell.
    pub fn apply_containers<N: HierarchyNavigator>(&self, grid: &mut TablixGrid<N>) {
        for axis in Axis::BOTH {
            let layout = self.dimension(axis);
            let assignments: Vec<_> = grid
                .window(axis)
                .headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let along = layout.header_size(index);
                    let across = layout.level_extent(header.level, header.level_span);
                    (header.cell, along, across, header.span as u32, header.level_span as u32)
                })
                .collect();

            for (id, along, across, span, level_span) in assignments {
                let cell = grid.cell_mut(id);
                match axis {
                    Axis::Row => {
                        cell.container = Size::new(across, along);
                        cell.row_span = span;
                        cell.col_span = level_span;
                    }
                    Axis::Column => {
                        cell.container = Size::new(along, across);
                        cell.col_span = span;
                        cell.row_span = level_span;
                        cell.resizable = cell.context.is_leaf;
                    }
                }
            }
        }

        let rows: Vec<(usize, f64)> = grid
            .window(Axis::Row)
            .leaves
            .iter()
            .enumerate()
            .map(|(pos, leaf)| (leaf.leaf_index, self.rows.leaf_size(pos)))
            .collect();
        let columns: Vec<(usize, f64)> = grid
            .window(Axis::Column)
            .leaves
            .iter()
            .enumerate()
            .map(|(pos, leaf)| (leaf.leaf_index, self.columns.leaf_size(pos)))
            .collect();
        for &(row, height) in &rows {
            for &(column, width) in &columns {
                let key = CellKey::Body { row, column };
                if let Some(id) = grid.cell_id(&key) {
                    grid.cell_mut(id).container = Size::new(width, height);
                }
            }
        }

        let corners: Vec<(usize, usize, usize)> = grid.corners().to_vec();
        for (row_level, column_level, id) in corners {
            let size = Size::new(
                self.rows.level_size(row_level),
                self.columns.level_size(column_level),
            );
            grid.cell_mut(id).container = size;
        }
    }

    /// Auto widths of newly tracked columns, for the column width manager.
    pub fn take_auto_widths<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) -> Vec<(String, f64)> {
        self.columns.take_auto_sizes(grid)
    }
}
