//! FILENAME: core/tablix-engine/src/cell.rs
//! Cells - Pooled records for realized headers, body cells and corners.
//!
//! Cells are owned exclusively by the `CellPool` arena. Binders only see a
//! `CellBinding`: read-only context plus the mutable content, so they can
//! never change a cell's layout state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::navigator::{Axis, HierarchyNavigator};

/// Sibling-index path from the root to a header item.
pub type HeaderPath = SmallVec<[u32; 4]>;

/// Index of a cell inside its pool.
pub type CellId = usize;

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// Extent along the axis: width for columns, height for rows.
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Row => self.height,
            Axis::Column => self.width,
        }
    }

    /// Extent across the axis: the header-level dimension.
    pub fn across(&self, axis: Axis) -> f64 {
        self.along(axis.other())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

// ============================================================================
// CELL IDENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellRole {
    RowHeader,
    ColumnHeader,
    Body,
    Corner,
}

impl CellRole {
    pub fn header(axis: Axis) -> CellRole {
        match axis {
            Axis::Row => CellRole::RowHeader,
            Axis::Column => CellRole::ColumnHeader,
        }
    }
}

/// Position-independent key of a realized cell. Keys are stable across
/// scroll passes, which is what lets a scroll reuse bound cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKey {
    RowHeader(HeaderPath),
    ColumnHeader(HeaderPath),
    Body { row: usize, column: usize },
    Corner { row_level: usize, column_level: usize },
}

impl CellKey {
    pub fn header(axis: Axis, path: HeaderPath) -> CellKey {
        match axis {
            Axis::Row => CellKey::RowHeader(path),
            Axis::Column => CellKey::ColumnHeader(path),
        }
    }

    pub fn role(&self) -> CellRole {
        match self {
            CellKey::RowHeader(_) => CellRole::RowHeader,
            CellKey::ColumnHeader(_) => CellRole::ColumnHeader,
            CellKey::Body { .. } => CellRole::Body,
            CellKey::Corner { .. } => CellRole::Corner,
        }
    }
}

/// What a binder may know about the cell it is filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellContext {
    pub role: CellRole,
    /// Header level; the row level for corners; 0 for body cells.
    pub level: usize,
    /// Header levels covered (more than one for ragged leaves).
    pub level_span: usize,
    pub is_leaf: bool,
    /// First item of the whole axis. For body cells this describes the row.
    pub is_first: bool,
    /// Last item of the whole axis. For body cells this describes the row.
    pub is_last: bool,
    pub row_leaf: Option<usize>,
    pub column_leaf: Option<usize>,
}

impl CellContext {
    pub fn body(row: usize, column: usize, is_first: bool, is_last: bool) -> Self {
        CellContext {
            role: CellRole::Body,
            level: 0,
            level_span: 1,
            is_leaf: true,
            is_first,
            is_last,
            row_leaf: Some(row),
            column_leaf: Some(column),
        }
    }

    pub fn corner(row_level: usize) -> Self {
        CellContext {
            role: CellRole::Corner,
            level: row_level,
            level_span: 1,
            is_leaf: false,
            is_first: false,
            is_last: false,
            row_leaf: None,
            column_leaf: None,
        }
    }
}

/// Content produced by the binder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellContent {
    pub text: String,
    pub classes: Vec<String>,
    pub indent: u8,
}

impl CellContent {
    pub fn clear(&mut self) {
        self.text.clear();
        self.classes.clear();
        self.indent = 0;
    }
}

/// The binder's view of a cell during bind/unbind.
pub struct CellBinding<'a> {
    context: CellContext,
    content: &'a mut CellContent,
}

impl<'a> CellBinding<'a> {
    pub(crate) fn new(context: CellContext, content: &'a mut CellContent) -> Self {
        CellBinding { context, content }
    }

    pub fn context(&self) -> &CellContext {
        &self.context
    }

    pub fn content(&self) -> &CellContent {
        &*self.content
    }

    pub fn content_mut(&mut self) -> &mut CellContent {
        &mut *self.content
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content.text = text.into();
    }

    pub fn add_class(&mut self, class: &str) {
        self.content.classes.push(class.to_string());
    }
}

// ============================================================================
// CELL RECORD
// ============================================================================

/// Opaque payload a cell was bound with.
pub enum CellPayload<N: HierarchyNavigator> {
    Header(N::Item),
    Body(N::Intersection),
    Corner(N::Corner),
}

/// A pooled cell. Layout state is written by the layout manager only.
pub struct TablixCell<N: HierarchyNavigator> {
    pub(crate) key: CellKey,
    pub(crate) payload: Option<CellPayload<N>>,
    pub(crate) context: CellContext,
    pub(crate) content: CellContent,
    /// Size the content wants, from measurement or estimation.
    pub(crate) content_size: Size,
    /// Size the layout assigned; never smaller along the axis than the
    /// content except for user-fixed columns.
    pub(crate) container: Size,
    pub(crate) row_span: u32,
    pub(crate) col_span: u32,
    pub(crate) resizable: bool,
    pub(crate) touched: u64,
    in_use: bool,
}

impl<N: HierarchyNavigator> TablixCell<N> {
    fn new(key: CellKey, context: CellContext, pass: u64) -> Self {
        TablixCell {
            key,
            payload: None,
            context,
            content: CellContent::default(),
            content_size: Size::ZERO,
            container: Size::ZERO,
            row_span: 1,
            col_span: 1,
            resizable: false,
            touched: pass,
            in_use: true,
        }
    }

    fn reuse(&mut self, key: CellKey, context: CellContext, pass: u64) {
        self.key = key;
        self.payload = None;
        self.context = context;
        self.content.clear();
        self.content_size = Size::ZERO;
        self.container = Size::ZERO;
        self.row_span = 1;
        self.col_span = 1;
        self.resizable = false;
        self.touched = pass;
        self.in_use = true;
    }

    pub fn key(&self) -> &CellKey {
        &self.key
    }

    pub fn role(&self) -> CellRole {
        self.context.role
    }

    pub fn context(&self) -> &CellContext {
        &self.context
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn spans(&self) -> (u32, u32) {
        (self.row_span, self.col_span)
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }
}

// ============================================================================
// CELL POOL
// ============================================================================

/// Arena of cells. Released slots go on a free list and are handed out
/// again before the arena grows.
pub struct CellPool<N: HierarchyNavigator> {
    cells: Vec<TablixCell<N>>,
    free: Vec<CellId>,
    live: usize,
}

impl<N: HierarchyNavigator> CellPool<N> {
    pub fn new() -> Self {
        CellPool {
            cells: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn acquire(&mut self, key: CellKey, context: CellContext, pass: u64) -> CellId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.cells[id].reuse(key, context, pass);
                id
            }
            None => {
                self.cells.push(TablixCell::new(key, context, pass));
                self.cells.len() - 1
            }
        }
    }

    /// Returns the slot to the free list. Releasing twice is a no-op.
    pub fn release(&mut self, id: CellId) {
        let cell = &mut self.cells[id];
        if !cell.in_use {
            return;
        }
        cell.in_use = false;
        cell.payload = None;
        cell.content.clear();
        self.free.push(id);
        self.live -= 1;
    }

    pub fn get(&self, id: CellId) -> &TablixCell<N> {
        &self.cells[id]
    }

    pub fn get_mut(&mut self, id: CellId) -> &mut TablixCell<N> {
        &mut self.cells[id]
    }

    /// Cells currently handed out.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Slots ever allocated.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }
}

impl<N: HierarchyNavigator> Default for CellPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
