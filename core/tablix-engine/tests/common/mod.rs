//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for tablix-engine integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tablix_engine::models::{
    AxisItem, AxisItems, AxisTree, CornerLabel, LabelBinder, MatrixCell, MatrixNavigator,
};
use tablix_engine::{
    CellBinding, CellContent, CellContext, CellRole, ColumnWidthChange, HierarchyNavigator,
    Size, TablixBinder, TablixControl, TablixOptions, TablixView,
};

/// Every cell measures this size in the fixtures below.
pub const CELL_WIDTH: f64 = 60.0;
pub const CELL_HEIGHT: f64 = 20.0;

/// Options with contract assertions off, so violations abort the pass.
pub fn test_options() -> TablixOptions {
    TablixOptions {
        assert_contracts: false,
        ..TablixOptions::default()
    }
}

/// A measurer that counts its calls and returns a fixed size.
pub fn counting_measurer(calls: Rc<Cell<usize>>) -> impl FnMut(&CellContext, &CellContent) -> Size {
    move |_context: &CellContext, _content: &CellContent| {
        calls.set(calls.get() + 1);
        Size::new(CELL_WIDTH, CELL_HEIGHT)
    }
}

pub fn column_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("C{}", i)).collect()
}

/// A flat table with columns named C1..Cn.
pub fn table_navigator(rows: usize, columns: usize) -> MatrixNavigator {
    let names = column_names(columns);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    MatrixNavigator::table(rows, &names)
}

/// Year -> Quarter -> Month rows (2 years, 24 months) by product columns.
pub fn calendar_navigator(products: usize) -> MatrixNavigator {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let mut paths = Vec::new();
    for year in ["2023", "2024"] {
        for (month, name) in MONTHS.iter().enumerate() {
            let quarter = format!("Q{}", month / 3 + 1);
            paths.push(vec![year.to_string(), quarter, name.to_string()]);
        }
    }
    let levels = vec!["Year".to_string(), "Quarter".to_string(), "Month".to_string()];
    let rows = AxisTree::from_paths(levels, &paths);
    let products: Vec<String> = (1..=products).map(|i| format!("Product {}", i)).collect();
    let columns = AxisTree::flat("Product", &products);
    MatrixNavigator::new(rows, columns).with_values(|row, column| format!("{}", (row + 1) * (column + 1)))
}

// ============================================================================
// HARNESS
// ============================================================================

/// A control over the matrix navigator with a fixed-size measurer and a
/// recording persistence callback.
pub struct TestHarness {
    pub control: TablixControl<MatrixNavigator, LabelBinder>,
    pub measured: Rc<Cell<usize>>,
    pub persisted: Rc<RefCell<Vec<ColumnWidthChange>>>,
}

impl TestHarness {
    pub fn new(navigator: MatrixNavigator, binder: LabelBinder, options: TablixOptions) -> Self {
        let measured = Rc::new(Cell::new(0));
        let persisted = Rc::new(RefCell::new(Vec::new()));
        let mut control =
            TablixControl::measured(navigator, binder, counting_measurer(measured.clone()), options)
                .unwrap();
        let sink = persisted.clone();
        control.set_persistence_callback(move |changes: &[ColumnWidthChange]| {
            sink.borrow_mut().extend_from_slice(changes);
        });
        TestHarness {
            control,
            measured,
            persisted,
        }
    }

    /// 400x210 is 60 px of row headers plus 340 px of body, and 20 px of
    /// column headers plus 190 px (9.5 rows) of body.
    pub fn table(rows: usize, columns: usize) -> Self {
        let mut harness = Self::new(table_navigator(rows, columns), LabelBinder::new(), test_options());
        harness.control.update_viewport(400.0, 210.0).unwrap();
        harness
    }

    pub fn calendar(products: usize, width: f64, height: f64) -> Self {
        let mut harness = Self::new(calendar_navigator(products), LabelBinder::new(), test_options());
        harness.control.update_viewport(width, height).unwrap();
        harness
    }

    pub fn view(&self) -> &TablixView {
        self.control.view().unwrap()
    }

    pub fn take_persisted(&self) -> Vec<ColumnWidthChange> {
        std::mem::take(&mut *self.persisted.borrow_mut())
    }
}

/// Checks that every row header starts at a realized row, ends at a
/// realized row and covers exactly `row_span` rows.
pub fn assert_row_headers_aligned(view: &TablixView) {
    for header in view.cells_by_role(CellRole::RowHeader) {
        let top = header.rect.y;
        let bottom = header.rect.bottom();
        let covered: Vec<_> = view
            .rows
            .iter()
            .filter(|row| row.offset >= top - 1e-6 && row.end() <= bottom + 1e-6)
            .collect();
        assert!(!covered.is_empty(), "header {:?} covers no row", header.text);
        assert!((covered[0].offset - top).abs() < 1e-6, "header {:?} starts off-row", header.text);
        assert!(
            (covered[covered.len() - 1].end() - bottom).abs() < 1e-6,
            "header {:?} ends off-row",
            header.text
        );
        assert_eq!(covered.len(), header.row_span as usize, "span of {:?}", header.text);
    }
}

// ============================================================================
// FAULTY NAVIGATOR
// ============================================================================

/// Delegates to a matrix navigator but has no body cells for one row.
pub struct FaultyNavigator {
    pub inner: MatrixNavigator,
    pub missing_row: usize,
}

impl FaultyNavigator {
    pub fn table(rows: usize, columns: usize, missing_row: usize) -> Self {
        FaultyNavigator {
            inner: table_navigator(rows, columns),
            missing_row,
        }
    }
}

impl HierarchyNavigator for FaultyNavigator {
    type Item = AxisItem;
    type Items = AxisItems;
    type Intersection = MatrixCell;
    type Corner = CornerLabel;

    fn row_hierarchy(&self) -> AxisItems {
        self.inner.row_hierarchy()
    }

    fn column_hierarchy(&self) -> AxisItems {
        self.inner.column_hierarchy()
    }

    fn depth(&self, hierarchy: &AxisItems) -> usize {
        self.inner.depth(hierarchy)
    }

    fn leaf_count(&self, hierarchy: &AxisItems) -> usize {
        self.inner.leaf_count(hierarchy)
    }

    fn leaf_at(&self, hierarchy: &AxisItems, index: usize) -> Option<AxisItem> {
        self.inner.leaf_at(hierarchy, index)
    }

    fn leaf_index(&self, item: &AxisItem) -> Option<usize> {
        self.inner.leaf_index(item)
    }

    fn is_leaf(&self, item: &AxisItem) -> bool {
        self.inner.is_leaf(item)
    }

    fn children(&self, item: &AxisItem) -> Option<AxisItems> {
        self.inner.children(item)
    }

    fn parent(&self, item: &AxisItem) -> Option<AxisItem> {
        self.inner.parent(item)
    }

    fn level(&self, item: &AxisItem) -> usize {
        self.inner.level(item)
    }

    fn index(&self, item: &AxisItem) -> usize {
        self.inner.index(item)
    }

    fn count(&self, items: &AxisItems) -> usize {
        self.inner.count(items)
    }

    fn at(&self, items: &AxisItems, index: usize) -> Option<AxisItem> {
        self.inner.at(items, index)
    }

    fn are_all_parents_last(&self, item: &AxisItem) -> bool {
        self.inner.are_all_parents_last(item)
    }

    fn intersection(&self, row: &AxisItem, column: &AxisItem) -> Option<MatrixCell> {
        if self.inner.leaf_index(row) == Some(self.missing_row) {
            return None;
        }
        self.inner.intersection(row, column)
    }

    fn corner(&self, row_level: usize, column_level: usize) -> Option<CornerLabel> {
        self.inner.corner(row_level, column_level)
    }

    fn identity(&self, item: &AxisItem) -> Option<String> {
        self.inner.identity(item)
    }
}

/// Writes labels and counts sessions.
#[derive(Debug, Default)]
pub struct PlainBinder {
    pub sessions: usize,
}

impl TablixBinder<FaultyNavigator> for PlainBinder {
    fn on_start_rendering_session(&mut self) {
        self.sessions += 1;
    }

    fn bind_row_header(&mut self, navigator: &FaultyNavigator, item: &AxisItem, cell: &mut CellBinding<'_>) {
        cell.set_text(navigator.inner.label(item));
    }

    fn bind_column_header(&mut self, navigator: &FaultyNavigator, item: &AxisItem, cell: &mut CellBinding<'_>) {
        cell.set_text(navigator.inner.label(item));
    }

    fn bind_body_cell(&mut self, _navigator: &FaultyNavigator, item: &MatrixCell, cell: &mut CellBinding<'_>) {
        cell.set_text(item.text.clone());
    }

    fn bind_corner_cell(&mut self, _navigator: &FaultyNavigator, item: &CornerLabel, cell: &mut CellBinding<'_>) {
        cell.set_text(item.text.clone());
    }
}

pub fn faulty_control(missing_row: usize, assert_contracts: bool) -> TablixControl<FaultyNavigator, PlainBinder> {
    let options = TablixOptions {
        assert_contracts,
        ..TablixOptions::default()
    };
    let calls = Rc::new(Cell::new(0));
    TablixControl::measured(
        FaultyNavigator::table(100, 10, missing_row),
        PlainBinder::default(),
        counting_measurer(calls),
        options,
    )
    .unwrap()
}
