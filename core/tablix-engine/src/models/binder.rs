//! FILENAME: core/tablix-engine/src/models/binder.rs
//! Label Binder - Plain-text content for the matrix navigator.

use crate::binder::TablixBinder;
use crate::cell::CellBinding;
use crate::models::matrix::{AxisItem, CornerLabel, MatrixCell, MatrixNavigator};

/// Bind and unbind calls seen by a `LabelBinder`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindCounts {
    pub row_headers: usize,
    pub column_headers: usize,
    pub body_cells: usize,
    pub corner_cells: usize,
    pub unbound: usize,
}

impl BindCounts {
    pub fn bound(&self) -> usize {
        self.row_headers + self.column_headers + self.body_cells + self.corner_cells
    }
}

#[derive(Debug, Clone)]
pub struct LabelBinder {
    row_groups: bool,
    counts: BindCounts,
    sessions: usize,
}

impl LabelBinder {
    pub fn new() -> Self {
        LabelBinder {
            row_groups: true,
            counts: BindCounts::default(),
            sessions: 0,
        }
    }

    /// A binder for tables without a row header region.
    pub fn without_row_groups() -> Self {
        LabelBinder {
            row_groups: false,
            ..LabelBinder::new()
        }
    }

    pub fn counts(&self) -> BindCounts {
        self.counts
    }

    pub fn reset_counts(&mut self) {
        self.counts = BindCounts::default();
    }

    pub fn sessions(&self) -> usize {
        self.sessions
    }

    fn header_classes(cell: &mut CellBinding<'_>) {
        let context = *cell.context();
        if context.is_leaf {
            cell.add_class("leaf");
        }
        if context.is_first {
            cell.add_class("first");
        }
        if context.is_last {
            cell.add_class("last");
        }
    }
}

impl Default for LabelBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl TablixBinder<MatrixNavigator> for LabelBinder {
    fn on_start_rendering_session(&mut self) {
        self.sessions += 1;
    }

    fn has_row_groups(&self) -> bool {
        self.row_groups
    }

    fn bind_row_header(&mut self, navigator: &MatrixNavigator, item: &AxisItem, cell: &mut CellBinding<'_>) {
        self.counts.row_headers += 1;
        cell.set_text(navigator.label(item));
        cell.add_class("row-header");
        Self::header_classes(cell);
    }

    fn bind_column_header(&mut self, navigator: &MatrixNavigator, item: &AxisItem, cell: &mut CellBinding<'_>) {
        self.counts.column_headers += 1;
        cell.set_text(navigator.label(item));
        cell.add_class("column-header");
        Self::header_classes(cell);
    }

    fn bind_body_cell(&mut self, _navigator: &MatrixNavigator, item: &MatrixCell, cell: &mut CellBinding<'_>) {
        self.counts.body_cells += 1;
        cell.set_text(item.text.clone());
        if cell.context().is_last {
            cell.add_class("last-row");
        }
    }

    fn bind_corner_cell(&mut self, _navigator: &MatrixNavigator, item: &CornerLabel, cell: &mut CellBinding<'_>) {
        self.counts.corner_cells += 1;
        cell.set_text(item.text.clone());
        cell.add_class("corner");
    }

    fn unbind_row_header(&mut self, _navigator: &MatrixNavigator, _item: &AxisItem, _cell: &mut CellBinding<'_>) {
        self.counts.unbound += 1;
    }

    fn unbind_column_header(&mut self, _navigator: &MatrixNavigator, _item: &AxisItem, _cell: &mut CellBinding<'_>) {
        self.counts.unbound += 1;
    }

    fn unbind_body_cell(&mut self, _navigator: &MatrixNavigator, _item: &MatrixCell, _cell: &mut CellBinding<'_>) {
        self.counts.unbound += 1;
    }

    fn unbind_corner_cell(&mut self, _navigator: &MatrixNavigator, _item: &CornerLabel, _cell: &mut CellBinding<'_>) {
        self.counts.unbound += 1;
    }
}
