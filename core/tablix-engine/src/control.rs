//! FILENAME: core/tablix-engine/src/control.rs
//! Tablix Control - The public orchestrator.
//!
//! Owns both dimensions, the grid, the layout and realization managers,
//! the column width manager and the touch manager, and turns every host
//! event (resize, scroll, scrollbar, touch, column resize, data change)
//! into a rendering pass. Every operation takes `&mut self`, so a pass
//! always completes before the next event is looked at.
//!
//! A failed pass never replaces the current view. The next pass after a
//! failure is always a full rendering session.

use crate::binder::{unbind_cell, TablixBinder};
use crate::cell::Size;
use crate::column_width::{ColumnWidthChange, ColumnWidthManager, ColumnWidthObject};
use crate::definition::TablixOptions;
use crate::dimension::TablixDimension;
use crate::engine::{PassKind, RenderingSession, SessionReport};
use crate::error::{Result, TablixError};
use crate::grid::TablixGrid;
use crate::layout::{CellSizer, ContentMeasurer, EstimatedSizer, MeasuredSizer, TablixLayoutManager};
use crate::navigator::{Axis, HierarchyNavigator};
use crate::realization::RealizationManager;
use crate::scroll::{ItemSizes, ScrollDelta, Slide, TouchManager, TouchRegionKind};
use crate::view::TablixView;

/// Receives column width deltas that must be persisted by the host.
pub type PersistenceCallback = Box<dyn FnMut(&[ColumnWidthChange])>;

pub struct TablixControl<N: HierarchyNavigator, B: TablixBinder<N>> {
    options: TablixOptions,
    navigator: N,
    binder: B,

    rows: TablixDimension<N::Items>,
    columns: TablixDimension<N::Items>,

    grid: TablixGrid<N>,
    layout: TablixLayoutManager,
    row_realization: RealizationManager,
    column_realization: RealizationManager,
    column_widths: ColumnWidthManager,

    touch: TouchManager,
    slide: Option<Slide>,

    viewport: Size,
    needs_session: bool,
    session: u64,
    view: Option<TablixView>,
    last_report: Option<SessionReport>,
    persistence: Option<PersistenceCallback>,
}

impl<N: HierarchyNavigator, B: TablixBinder<N>> TablixControl<N, B> {
    pub fn new(navigator: N, binder: B, sizer: Box<dyn CellSizer>, options: TablixOptions) -> Result<Self> {
        options.validate()?;

        let row_root = navigator.row_hierarchy();
        let column_root = navigator.column_hierarchy();
        let rows = TablixDimension::new(
            Axis::Row,
            row_root.clone(),
            navigator.leaf_count(&row_root),
            navigator.depth(&row_root),
            options.scrollbar.clone(),
        );
        let columns = TablixDimension::new(
            Axis::Column,
            column_root.clone(),
            navigator.leaf_count(&column_root),
            navigator.depth(&column_root),
            options.scrollbar.clone(),
        );

        let mut control = TablixControl {
            layout: TablixLayoutManager::new(sizer, &options.sizing),
            row_realization: RealizationManager::new(Axis::Row, options.realization.clone()),
            column_realization: RealizationManager::new(Axis::Column, options.realization.clone()),
            column_widths: ColumnWidthManager::new(options.auto_size_columns),
            touch: TouchManager::new(options.touch.clone()),
            grid: TablixGrid::new(),
            slide: None,
            viewport: Size::ZERO,
            needs_session: true,
            session: 0,
            view: None,
            last_report: None,
            persistence: None,
            rows,
            columns,
            navigator,
            binder,
            options,
        };
        control.register_columns(&[]);
        log_info!(
            "TABLIX",
            "control created: {} rows, {} columns, {:?} layout",
            control.rows.leaf_count(),
            control.columns.leaf_count(),
            control.layout.kind()
        );
        Ok(control)
    }

    /// Sizes are estimated from character metrics.
    pub fn estimated(navigator: N, binder: B, options: TablixOptions) -> Result<Self> {
        let sizer = Box::new(EstimatedSizer::new(options.sizing.metrics.clone()));
        Self::new(navigator, binder, sizer, options)
    }

    /// Sizes are read back from the host surface.
    pub fn measured(
        navigator: N,
        binder: B,
        measurer: impl ContentMeasurer + 'static,
        options: TablixOptions,
    ) -> Result<Self> {
        Self::new(navigator, binder, Box::new(MeasuredSizer::new(measurer)), options)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &TablixOptions {
        &self.options
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut B {
        &mut self.binder
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The last successfully rendered frame.
    pub fn view(&self) -> Option<&TablixView> {
        self.view.as_ref()
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    pub fn dimension(&self, axis: Axis) -> &TablixDimension<N::Items> {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    fn dimension_mut(&mut self, axis: Axis) -> &mut TablixDimension<N::Items> {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        }
    }

    pub fn column_widths(&self) -> &ColumnWidthManager {
        &self.column_widths
    }

    /// The width blob the host should store for the current columns.
    pub fn serialize_column_widths(&self) -> Result<String> {
        self.column_widths.serialize_persisted()
    }

    pub fn touch(&self) -> &TouchManager {
        &self.touch
    }

    /// Cells currently realized in the grid.
    pub fn live_cells(&self) -> usize {
        self.grid.live()
    }

    pub fn set_persistence_callback(&mut self, callback: impl FnMut(&[ColumnWidthChange]) + 'static) {
        self.persistence = Some(Box::new(callback));
    }

    // ========================================================================
    // VIEWPORT AND DATA
    // ========================================================================

    /// New viewport size; starts a rendering session.
    pub fn update_viewport(&mut self, width: f64, height: f64) -> Result<SessionReport> {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(TablixError::InvalidViewport { width, height });
        }
        self.viewport = Size::new(width, height);
        Ok(self.render(PassKind::Session))
    }

    /// Final viewport of an interactive resize.
    pub fn on_resizing(&mut self, viewport: Size) -> Result<SessionReport> {
        self.update_viewport(viewport.width, viewport.height)
    }

    /// Re-renders from scratch, e.g. after cell content changed.
    pub fn refresh(&mut self) -> SessionReport {
        self.render(PassKind::Session)
    }

    /// Replaces the data. Cells are unbound against the navigator they were
    /// bound with, column width records are reconciled with the new column
    /// set, and `persisted` (the host's width blob, if any) is applied.
    pub fn update_navigator(&mut self, navigator: N, persisted: Option<&str>) -> SessionReport {
        let previous = std::mem::replace(&mut self.navigator, navigator);
        let binder = &mut self.binder;
        self.grid.release_all(|cell| unbind_cell(&previous, &mut *binder, cell));
        self.slide = None;
        self.touch.cancel();

        let row_root = self.navigator.row_hierarchy();
        let column_root = self.navigator.column_hierarchy();
        let (row_leaves, row_depth) = (self.navigator.leaf_count(&row_root), self.navigator.depth(&row_root));
        let (column_leaves, column_depth) = (
            self.navigator.leaf_count(&column_root),
            self.navigator.depth(&column_root),
        );
        self.rows.rebind(row_root, row_leaves, row_depth);
        self.columns.rebind(column_root, column_leaves, column_depth);

        let persisted = match persisted.map(ColumnWidthManager::parse_persisted) {
            Some(Ok(widths)) => widths,
            Some(Err(err)) => {
                log_warn!("WIDTH", "ignoring persisted column widths: {}", err);
                Vec::new()
            }
            None => Vec::new(),
        };
        self.register_columns(&persisted);
        self.render(PassKind::Session)
    }

    /// Applies a persisted width blob to the current columns. The next pass
    /// is a rendering session.
    pub fn load_column_widths(&mut self, blob: &str) -> Result<()> {
        let persisted = ColumnWidthManager::parse_persisted(blob)?;
        self.register_columns(&persisted);
        self.needs_session = true;
        Ok(())
    }

    fn register_columns(&mut self, persisted: &[ColumnWidthObject]) {
        let count = self.columns.leaf_count();
        let identities: Vec<String> = (0..count).map(|leaf| self.column_identity(leaf)).collect();
        self.column_widths.on_data_view_changed(&identities, persisted);
    }

    fn column_identity(&self, leaf: usize) -> String {
        self.navigator
            .leaf_at(self.columns.hierarchy(), leaf)
            .and_then(|item| self.navigator.identity(&item))
            .unwrap_or_else(|| format!("#{}", leaf))
    }

    // ========================================================================
    // SCROLLING
    // ========================================================================

    /// Scrolls one axis to `offset` (in leaves, fractional). `None` when the
    /// clamped offset did not change.
    pub fn scroll_to(&mut self, axis: Axis, offset: f64) -> Option<SessionReport> {
        if !self.dimension_mut(axis).set_offset(offset) {
            return None;
        }
        log_debug!("SCROLL", "{:?} offset -> {:.3}", axis, self.dimension(axis).offset());
        Some(self.render(PassKind::Scroll))
    }

    pub fn scroll_delta(&mut self, axis: Axis, delta: f64) -> Option<SessionReport> {
        let offset = self.dimension(axis).offset() + delta;
        self.scroll_to(axis, offset)
    }

    pub fn scrollbar_pointer_down(&mut self, axis: Axis, pointer: f64, now_ms: u64) -> Option<SessionReport> {
        let target = self.dimension_mut(axis).scrollbar_mut().pointer_down(pointer, now_ms)?;
        self.scroll_to(axis, target)
    }

    pub fn scrollbar_pointer_move(&mut self, axis: Axis, pointer: f64) -> Option<SessionReport> {
        let target = self.dimension_mut(axis).scrollbar_mut().pointer_move(pointer)?;
        self.scroll_to(axis, target)
    }

    pub fn scrollbar_pointer_up(&mut self, axis: Axis) {
        self.dimension_mut(axis).scrollbar_mut().pointer_up();
    }

    /// Drives press-and-hold auto-repeat.
    pub fn scrollbar_tick(&mut self, axis: Axis, now_ms: u64) -> Option<SessionReport> {
        let target = self.dimension_mut(axis).scrollbar_mut().tick(now_ms)?;
        self.scroll_to(axis, target)
    }

    pub fn scrollbar_wheel(&mut self, axis: Axis, lines: f64) -> Option<SessionReport> {
        let target = self.dimension(axis).scrollbar().wheel(lines)?;
        self.scroll_to(axis, target)
    }

    // ========================================================================
    // TOUCH
    // ========================================================================

    /// Starts a gesture; stops a running slide. False when the point is
    /// outside every touch region.
    pub fn touch_start(&mut self, x: f64, y: f64, now_ms: u64) -> bool {
        self.slide = None;
        self.touch.start(x, y, now_ms)
    }

    pub fn touch_move(&mut self, x: f64, y: f64, now_ms: u64) -> Option<SessionReport> {
        let sizes = self.item_sizes();
        let delta = self.touch.move_to(x, y, now_ms, sizes)?;
        self.apply_delta(delta)
    }

    /// Ends the gesture. Returns true when a slide started.
    pub fn touch_end(&mut self, now_ms: u64) -> bool {
        self.slide = self.touch.end(now_ms);
        self.slide.is_some()
    }

    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    /// Advances a running slide by one step. The slide ends when its steps
    /// run out or a step cannot move either offset any more.
    pub fn slide_frame(&mut self) -> Option<SessionReport> {
        let sizes = self.item_sizes();
        let step = self.slide.as_mut()?.next_step(sizes);
        let Some(delta) = step else {
            self.slide = None;
            return None;
        };
        let report = self.apply_delta(delta);
        if report.is_none() {
            log_debug!("TOUCH", "slide stopped at the data bounds");
            self.slide = None;
        }
        report
    }

    fn apply_delta(&mut self, delta: ScrollDelta) -> Option<SessionReport> {
        let row_offset = self.rows.offset() + delta.rows;
        let column_offset = self.columns.offset() + delta.columns;
        let rows_moved = self.rows.set_offset(row_offset);
        let columns_moved = self.columns.set_offset(column_offset);
        if !(rows_moved || columns_moved) {
            return None;
        }
        Some(self.render(PassKind::Scroll))
    }

    /// Live average item sizes, from the current frame when there is one.
    fn item_sizes(&self) -> ItemSizes {
        let realization = &self.options.realization;
        let average = |axis: Axis, fallback: f64| {
            self.view
                .as_ref()
                .and_then(|view| view.average_item_size(axis))
                .filter(|size| *size > 0.0)
                .unwrap_or(fallback)
        };
        ItemSizes {
            row: average(Axis::Row, realization.initial_row_height),
            column: average(Axis::Column, realization.initial_column_width),
        }
    }

    // ========================================================================
    // COLUMN WIDTHS
    // ========================================================================

    /// User resize of the column at `leaf_index`. Persists a delta for that
    /// column only and re-renders. `None` when nothing changed.
    pub fn resize_column(&mut self, leaf_index: usize, width: f64) -> Option<SessionReport> {
        if leaf_index >= self.columns.leaf_count() {
            return None;
        }
        let identity = self.column_identity(leaf_index);
        let change = self.column_widths.on_column_resized(&identity, width)?;
        self.persist(&[change]);
        Some(self.render(PassKind::Scroll))
    }

    /// Flips the global auto-size toggle. Turning it on clears every fixed
    /// width and re-renders from scratch; turning it off changes nothing.
    pub fn set_auto_size_columns(&mut self, enabled: bool) -> Option<SessionReport> {
        let changes = self.column_widths.set_auto_size_all(enabled);
        if changes.is_empty() {
            return None;
        }
        self.persist(&changes);
        Some(self.render(PassKind::Session))
    }

    fn persist(&mut self, changes: &[ColumnWidthChange]) {
        if changes.is_empty() {
            return;
        }
        log_debug!("WIDTH", "persisting {} column width changes", changes.len());
        if let Some(callback) = self.persistence.as_mut() {
            callback(changes);
        }
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    fn render(&mut self, kind: PassKind) -> SessionReport {
        let (mut report, moved) = self.run_pass(kind);
        // The new extent left the offset out of range; render the clamped
        // position.
        if moved && !report.is_aborted() {
            report = self.run_pass(PassKind::Scroll).0;
        }
        if report.is_aborted() {
            self.restore_offsets();
        }
        self.last_report = Some(report);
        report
    }

    /// Points both dimensions back at the frame still on screen, so the
    /// next relative scroll starts from what the user sees.
    fn restore_offsets(&mut self) {
        let Some((row_offset, column_offset)) =
            self.view.as_ref().map(|view| (view.row_offset, view.column_offset))
        else {
            return;
        };
        self.rows.set_offset(row_offset);
        self.columns.set_offset(column_offset);
        log_debug!(
            "SCROLL",
            "offsets restored to the current frame ({:.3}, {:.3})",
            self.rows.offset(),
            self.columns.offset()
        );
    }

    /// One pass. The flag reports whether accepting the new frame moved an
    /// offset.
    fn run_pass(&mut self, kind: PassKind) -> (SessionReport, bool) {
        let kind = if self.needs_session { PassKind::Session } else { kind };
        if kind == PassKind::Session {
            self.session += 1;
        }

        let pass = RenderingSession {
            navigator: &self.navigator,
            binder: &mut self.binder,
            grid: &mut self.grid,
            layout: &mut self.layout,
            row_realization: &mut self.row_realization,
            column_realization: &mut self.column_realization,
            column_widths: &mut self.column_widths,
            rows: &self.rows,
            columns: &self.columns,
            options: &self.options.realization,
            viewport: self.viewport,
            kind,
            session: self.session,
            cells_bound: 0,
        };

        match pass.run() {
            Ok(outcome) => {
                self.needs_session = false;
                let moved = self.accept(outcome.view);
                (outcome.report, moved)
            }
            Err(err) => {
                log_error!("TABLIX", "{:?} pass aborted, keeping the previous frame: {}", kind, err);
                if self.options.assert_contracts {
                    panic!("navigator contract violated: {}", err);
                }
                self.needs_session = true;
                (SessionReport::aborted(kind), false)
            }
        }
    }

    /// Makes `view` current and syncs scroll state with it. Returns whether
    /// an offset had to be clamped to the new extent.
    fn accept(&mut self, view: TablixView) -> bool {
        let body = view.body_rect();
        let mut moved = false;
        for axis in Axis::BOTH {
            let extent = view.visible_extent(axis) + view.unfilled_extent(axis);
            let track = match axis {
                Axis::Row => body.height,
                Axis::Column => body.width,
            };
            let dimension = self.dimension_mut(axis);
            moved |= dimension.set_visible_extent(extent);
            dimension.scrollbar_mut().set_track_length(track);
        }

        self.touch.clear_regions();
        let regions = [
            (TouchRegionKind::RowHeader, view.row_header_rect()),
            (TouchRegionKind::ColumnHeader, view.column_header_rect()),
            (TouchRegionKind::Body, body),
        ];
        for (kind, rect) in regions {
            if rect.is_empty() {
                continue;
            }
            if let Err(err) = self.touch.add_region(kind, rect) {
                log_warn!("TOUCH", "touch region skipped: {}", err);
            }
        }

        self.view = Some(view);
        moved
    }
}
