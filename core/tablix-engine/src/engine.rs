//! FILENAME: core/tablix-engine/src/engine.rs
//! Tablix Engine - One rendering pass over the grid.
//!
//! A pass realizes the leaves visible from the current offsets of both
//! dimensions and produces a `TablixView`. Two kinds of pass exist:
//! - Session: full re-layout (initial load, resize, data change). Every
//!   cell is recycled first and the estimators start over.
//! - Scroll: cells still inside the window keep their binding and size;
//!   only newly exposed cells are bound and measured.
//!
//! Realization is an iterative loop. Each iteration asks the realization
//! managers how many leaves to add on each axis, realizes them with their
//! headers and body cells, re-runs layout and feeds the pixels actually
//! consumed back into the estimators. The loop stops when both axes are
//! filled or out of data, or at the iteration cap.

use serde::{Deserialize, Serialize};

use crate::binder::{bind_cell, unbind_cell, TablixBinder};
use crate::cell::{CellContext, CellId, CellKey, CellPayload, CellRole, HeaderPath, Size};
use crate::column_width::ColumnWidthManager;
use crate::definition::RealizationOptions;
use crate::dimension::TablixDimension;
use crate::error::{contract_violation, Result};
use crate::grid::{RealizedHeader, RealizedLeaf, TablixGrid};
use crate::layout::TablixLayoutManager;
use crate::navigator::{Axis, HierarchyNavigator};
use crate::realization::RealizationManager;
use crate::view::TablixView;

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassKind {
    Session,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// Both axes cover the viewport.
    Filled,
    /// At least one axis ran out of data first.
    Exhausted,
    /// Stopped at the iteration cap; the frame is best effort.
    IterationCap,
    /// A navigator contract violation; the previous frame stays current.
    Aborted,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub kind: PassKind,
    pub status: SessionStatus,
    pub iterations: usize,
    pub rows_realized: usize,
    pub columns_realized: usize,
    /// Cells bound (and measured) during the pass.
    pub cells_bound: usize,
    /// Cells unbound and returned to the pool at the end of the pass.
    pub cells_recycled: usize,
}

impl SessionReport {
    pub fn aborted(kind: PassKind) -> Self {
        SessionReport {
            kind,
            status: SessionStatus::Aborted,
            iterations: 0,
            rows_realized: 0,
            columns_realized: 0,
            cells_bound: 0,
            cells_recycled: 0,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.status == SessionStatus::Aborted
    }
}

pub(crate) struct PassOutcome {
    pub report: SessionReport,
    pub view: TablixView,
}

/// Space bookkeeping of one axis between iterations.
#[derive(Debug, Clone, Copy)]
struct Fill {
    available: f64,
    consumed: f64,
    exhausted: bool,
}

impl Fill {
    fn filled(&self) -> bool {
        self.consumed >= self.available
    }

    fn done(&self) -> bool {
        self.filled() || self.exhausted
    }

    fn remaining(&self) -> f64 {
        (self.available - self.consumed).max(0.0)
    }
}

// ============================================================================
// RENDERING SESSION
// ============================================================================

/// Borrowed state of the control for the duration of one pass.
pub(crate) struct RenderingSession<'a, N: HierarchyNavigator, B: TablixBinder<N> + ?Sized> {
    pub navigator: &'a N,
    pub binder: &'a mut B,
    pub grid: &'a mut TablixGrid<N>,
    pub layout: &'a mut TablixLayoutManager,
    pub row_realization: &'a mut RealizationManager,
    pub column_realization: &'a mut RealizationManager,
    pub column_widths: &'a mut ColumnWidthManager,
    pub rows: &'a TablixDimension<N::Items>,
    pub columns: &'a TablixDimension<N::Items>,
    pub options: &'a RealizationOptions,
    pub viewport: Size,
    pub kind: PassKind,
    pub session: u64,
    pub cells_bound: usize,
}

impl<'a, N: HierarchyNavigator, B: TablixBinder<N> + ?Sized> RenderingSession<'a, N, B> {
    pub fn run(mut self) -> Result<PassOutcome> {
        if self.kind == PassKind::Session {
            let navigator = self.navigator;
            let binder = &mut *self.binder;
            let released = self.grid.release_all(|cell| unbind_cell(navigator, &mut *binder, cell));
            self.layout.reset();
            self.row_realization.on_start_rendering_session();
            self.column_realization.on_start_rendering_session();
            log_debug!(
                "TABLIX",
                "session {} started, {} cells released, viewport {}x{}",
                self.session,
                released,
                self.viewport.width,
                self.viewport.height
            );
            self.binder.on_start_rendering_session();
        }

        let result = self.realize();
        if self.kind == PassKind::Session {
            self.binder.on_end_rendering_session();
        }
        result
    }

    fn dimension(&self, axis: Axis) -> &'a TablixDimension<N::Items> {
        match axis {
            Axis::Row => self.rows,
            Axis::Column => self.columns,
        }
    }

    fn realization_mut(&mut self, axis: Axis) -> &mut RealizationManager {
        match axis {
            Axis::Row => &mut *self.row_realization,
            Axis::Column => &mut *self.column_realization,
        }
    }

    fn headers_enabled(&self, axis: Axis, row_headers: bool) -> bool {
        axis == Axis::Column || row_headers
    }

    fn fill(&self, axis: Axis) -> Fill {
        let dimension = self.dimension(axis);
        let headers = self.layout.dimension(axis.other()).levels_total();
        Fill {
            available: (self.viewport.along(axis) - headers).max(0.0),
            consumed: self.layout.dimension(axis).natural_extent(dimension.fraction()),
            exhausted: self.grid.window(axis).next_leaf_index() >= dimension.leaf_count(),
        }
    }

    fn calculate_layout(&mut self, row_headers: bool) {
        let row_depth = if row_headers { self.rows.depth() } else { 0 };
        self.layout.calculate(
            self.grid,
            self.column_widths,
            row_headers,
            row_depth,
            self.columns.depth(),
        );
    }

    fn realize(&mut self) -> Result<PassOutcome> {
        self.row_realization.on_start_pass();
        self.column_realization.on_start_pass();
        self.grid
            .begin_pass(self.rows.first_visible_leaf(), self.columns.first_visible_leaf());

        let row_headers = self.binder.has_row_groups();
        if row_headers {
            for row_level in 0..self.rows.depth() {
                for column_level in 0..self.columns.depth() {
                    self.realize_corner(row_level, column_level);
                }
            }
        }
        self.calculate_layout(row_headers);

        let mut iterations = 0;
        let mut rows_done = 0;
        let mut columns_done = 0;
        let status = loop {
            let row_fill = self.fill(Axis::Row);
            let column_fill = self.fill(Axis::Column);
            if row_fill.done() && column_fill.done() {
                break if row_fill.filled() && column_fill.filled() {
                    SessionStatus::Filled
                } else {
                    SessionStatus::Exhausted
                };
            }
            if iterations >= self.options.max_iterations {
                log_debug!("REALIZE", "iteration cap of {} reached", iterations);
                break SessionStatus::IterationCap;
            }
            iterations += 1;

            let columns_added = self.realize_more(Axis::Column, column_fill, row_headers)?;
            let rows_added = self.realize_more(Axis::Row, row_fill, row_headers)?;
            self.realize_body(&mut rows_done, &mut columns_done)?;
            self.calculate_layout(row_headers);

            let row_consumed = self.fill(Axis::Row).consumed - row_fill.consumed;
            let column_consumed = self.fill(Axis::Column).consumed - column_fill.consumed;
            self.row_realization.on_end_iteration(row_consumed, rows_added);
            self.column_realization.on_end_iteration(column_consumed, columns_added);
        };

        // Leaves past the last (partially) visible one are not kept.
        for axis in Axis::BOTH {
            let fill = self.fill(axis);
            let fraction = self.dimension(axis).fraction();
            let keep = self.layout.dimension(axis).leaves_to_fill(fill.available, fraction);
            self.grid.truncate(axis, keep);
            self.layout.dimension_mut(axis).truncate(keep);
        }

        self.layout.align(self.grid);
        self.layout.apply_containers(self.grid);
        self.layout.fix_sizes(self.grid);
        for (identity, width) in self.layout.take_auto_widths(self.grid) {
            self.column_widths.on_auto_width_measured(&identity, width);
        }

        let navigator = self.navigator;
        let binder = &mut *self.binder;
        let recycled = self.grid.sweep(|cell| unbind_cell(navigator, &mut *binder, cell));

        let view = TablixView::build(
            self.session,
            self.grid,
            self.layout,
            self.rows,
            self.columns,
            self.viewport,
        );
        let report = SessionReport {
            kind: self.kind,
            status,
            iterations,
            rows_realized: view.rows.len(),
            columns_realized: view.columns.len(),
            cells_bound: self.cells_bound,
            cells_recycled: recycled,
        };
        log_debug!(
            "TABLIX",
            "{:?} pass {}: {:?} after {} iterations, {}x{} leaves, {} bound, {} recycled",
            report.kind,
            view.pass,
            report.status,
            report.iterations,
            report.rows_realized,
            report.columns_realized,
            report.cells_bound,
            report.cells_recycled
        );
        Ok(PassOutcome { report, view })
    }

    // ========================================================================
    // REALIZATION
    // ========================================================================

    fn bind_and_measure(&mut self, id: CellId) {
        let cell = self.grid.cell_mut(id);
        bind_cell(self.navigator, &mut *self.binder, cell);
        cell.content_size = self.layout.measure(&cell.context, &cell.content);
        self.cells_bound += 1;
    }

    fn realize_corner(&mut self, row_level: usize, column_level: usize) {
        let key = CellKey::Corner {
            row_level,
            column_level,
        };
        let id = match self.grid.reuse(&key) {
            Some(id) => id,
            None => {
                let Some(payload) = self.navigator.corner(row_level, column_level) else {
                    return;
                };
                let id = self.grid.create(key, CellContext::corner(row_level));
                self.grid.cell_mut(id).payload = Some(CellPayload::Corner(payload));
                self.bind_and_measure(id);
                id
            }
        };
        self.grid.push_corner(row_level, column_level, id);
        if self.row_realization.on_corner_realized(row_level, column_level) {
            self.layout.track_corner(row_level, column_level);
        }
    }

    /// Realizes the next batch of leaves of one axis. Returns how many.
    fn realize_more(&mut self, axis: Axis, fill: Fill, row_headers: bool) -> Result<usize> {
        if fill.done() {
            return Ok(0);
        }
        let next = self.grid.window(axis).next_leaf_index();
        let available = self.dimension(axis).leaf_count().saturating_sub(next);
        let count = self
            .realization_mut(axis)
            .items_to_realize(fill.remaining(), available);
        for leaf in next..next + count {
            self.realize_leaf(axis, leaf, self.headers_enabled(axis, row_headers))?;
        }
        Ok(count)
    }

    fn realize_leaf(&mut self, axis: Axis, leaf: usize, headers: bool) -> Result<()> {
        let navigator = self.navigator;
        let dimension = self.dimension(axis);
        let depth = dimension.depth();

        let item = navigator.leaf_at(dimension.hierarchy(), leaf).ok_or_else(|| {
            contract_violation(
                "leaf_at",
                format!("{:?} leaf {} of {} is missing", axis, leaf, dimension.leaf_count()),
            )
        })?;
        if !navigator.is_leaf(&item) {
            return Err(contract_violation(
                "is_leaf",
                format!("{:?} item at leaf index {} has children", axis, leaf),
            ));
        }

        // Ancestor chain, outermost first.
        let too_deep = || {
            contract_violation(
                "parent",
                format!("{:?} leaf {} is nested deeper than {} levels", axis, leaf, depth),
            )
        };
        let mut chain = vec![item.clone()];
        while let Some(parent) = navigator.parent(&chain[chain.len() - 1]) {
            if chain.len() >= depth {
                return Err(too_deep());
            }
            chain.push(parent);
        }
        if chain.len() > depth {
            return Err(too_deep());
        }
        chain.reverse();
        for (level, node) in chain.iter().enumerate() {
            let reported = navigator.level(node);
            if reported != level {
                return Err(contract_violation(
                    "level",
                    format!("{:?} leaf {}: ancestor at depth {} reports level {}", axis, leaf, level, reported),
                ));
            }
        }
        let path: HeaderPath = chain.iter().map(|node| navigator.index(node) as u32).collect();

        let position = self.grid.window(axis).leaves.len();
        let mut leaf_header = None;
        if headers {
            for (level, node) in chain.iter().enumerate() {
                let prefix = &path[..=level];
                let is_leaf = level + 1 == chain.len();
                if let Some(index) = self.grid.window(axis).header_index(prefix) {
                    let header = &mut self.grid.window_mut(axis).headers[index];
                    if is_leaf || header.first + header.span != position {
                        return Err(contract_violation(
                            "children",
                            format!("{:?} leaves under {:?} are not contiguous", axis, prefix),
                        ));
                    }
                    header.span += 1;
                    continue;
                }

                let level_span = if is_leaf { depth - level } else { 1 };
                let context = self.header_context(axis, node, level, level_span, is_leaf, leaf)?;
                let (id, created) = self
                    .grid
                    .obtain(CellKey::header(axis, HeaderPath::from_slice(prefix)), context);
                if created {
                    self.grid.cell_mut(id).payload = Some(CellPayload::Header(node.clone()));
                    self.bind_and_measure(id);
                }
                self.grid.window_mut(axis).push_header(RealizedHeader {
                    path: HeaderPath::from_slice(prefix),
                    level,
                    level_span,
                    first: position,
                    span: 1,
                    cell: id,
                    is_leaf,
                });
                if is_leaf {
                    leaf_header = Some(id);
                }
            }
        }

        let identity = match axis {
            Axis::Column => Some(navigator.identity(&item).unwrap_or_else(|| format!("#{}", leaf))),
            Axis::Row => None,
        };
        self.grid.window_mut(axis).leaves.push(RealizedLeaf {
            leaf_index: leaf,
            item,
            identity,
            header: leaf_header,
        });
        if self.realization_mut(axis).on_leaf_realized(leaf) {
            self.layout.track_leaf(axis, leaf);
        }
        Ok(())
    }

    /// Edge flags come from the item's place among its siblings and the
    /// places of all its ancestors.
    fn header_context(
        &self,
        axis: Axis,
        node: &N::Item,
        level: usize,
        level_span: usize,
        is_leaf: bool,
        leaf: usize,
    ) -> Result<CellContext> {
        let navigator = self.navigator;
        let siblings = match navigator.parent(node) {
            Some(parent) => navigator.children(&parent).ok_or_else(|| {
                contract_violation("children", format!("{:?} parent at level {} has no children", axis, level))
            })?,
            None => self.dimension(axis).hierarchy().clone(),
        };
        let is_first = navigator.is_first_item(node, &siblings) && navigator.are_all_parents_first(node);
        let is_last = navigator.is_last_item(node, &siblings) && navigator.are_all_parents_last(node);
        let leaf_of = |wanted: Axis| (is_leaf && axis == wanted).then_some(leaf);
        Ok(CellContext {
            role: CellRole::header(axis),
            level,
            level_span,
            is_leaf,
            is_first,
            is_last,
            row_leaf: leaf_of(Axis::Row),
            column_leaf: leaf_of(Axis::Column),
        })
    }

    /// Body cells for every realized row/column pair not handled yet:
    /// new rows against all columns, old rows against new columns.
    fn realize_body(&mut self, rows_done: &mut usize, columns_done: &mut usize) -> Result<()> {
        let row_count = self.grid.window(Axis::Row).leaves.len();
        let column_count = self.grid.window(Axis::Column).leaves.len();
        for row in 0..row_count {
            let start = if row < *rows_done { *columns_done } else { 0 };
            for column in start..column_count {
                self.realize_body_cell(row, column)?;
            }
        }
        *rows_done = row_count;
        *columns_done = column_count;
        Ok(())
    }

    fn realize_body_cell(&mut self, row_position: usize, column_position: usize) -> Result<()> {
        let (row, row_item) = {
            let leaf = &self.grid.window(Axis::Row).leaves[row_position];
            (leaf.leaf_index, leaf.item.clone())
        };
        let (column, column_item) = {
            let leaf = &self.grid.window(Axis::Column).leaves[column_position];
            (leaf.leaf_index, leaf.item.clone())
        };

        let key = CellKey::Body { row, column };
        if self.grid.reuse(&key).is_some() {
            return Ok(());
        }
        let payload = self
            .navigator
            .intersection(&row_item, &column_item)
            .ok_or_else(|| {
                contract_violation("intersection", format!("row leaf {} x column leaf {}", row, column))
            })?;

        let is_first = row == 0;
        let is_last = row + 1 == self.rows.leaf_count();
        let id = self
            .grid
            .create(key, CellContext::body(row, column, is_first, is_last));
        self.grid.cell_mut(id).payload = Some(CellPayload::Body(payload));
        self.bind_and_measure(id);
        Ok(())
    }
}
