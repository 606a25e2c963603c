//! FILENAME: core/tablix-engine/src/grid.rs
//! Tablix Grid - The in-memory matrix of realized cells.
//!
//! The grid owns the cell pool and the key -> cell index, plus one
//! realized window per axis: the leaves currently materialized and the
//! header cells covering them. Windows are rebuilt on every pass; cells
//! are reused by key, so a scroll only binds what is newly exposed.
//!
//! Pass bookkeeping: every cell obtained during a pass is stamped with the
//! pass number. `sweep` recycles everything left unstamped.

use rustc_hash::FxHashMap;

use crate::cell::{CellContext, CellId, CellKey, CellPool, HeaderPath, TablixCell};
use crate::navigator::{Axis, HierarchyNavigator};

// ============================================================================
// REALIZED WINDOWS
// ============================================================================

/// A realized leaf of one axis.
#[derive(Debug, Clone)]
pub struct RealizedLeaf<I> {
    pub leaf_index: usize,
    pub item: I,
    /// Stable identity, tracked for columns only.
    pub identity: Option<String>,
    /// The leaf's own header cell, if the axis shows headers.
    pub header: Option<CellId>,
}

/// A realized header cell and the run of realized leaves it covers.
#[derive(Debug, Clone)]
pub struct RealizedHeader {
    pub path: HeaderPath,
    pub level: usize,
    pub level_span: usize,
    /// Position (in the window) of the first covered leaf.
    pub first: usize,
    /// Number of realized leaves covered.
    pub span: usize,
    pub cell: CellId,
    pub is_leaf: bool,
}

#[derive(Debug, Clone)]
pub struct AxisWindow<I> {
    pub first_leaf: usize,
    pub leaves: Vec<RealizedLeaf<I>>,
    pub headers: Vec<RealizedHeader>,
    lookup: FxHashMap<HeaderPath, usize>,
}

impl<I> AxisWindow<I> {
    fn new() -> Self {
        AxisWindow {
            first_leaf: 0,
            leaves: Vec::new(),
            headers: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    fn reset(&mut self, first_leaf: usize) {
        self.first_leaf = first_leaf;
        self.leaves.clear();
        self.headers.clear();
        self.lookup.clear();
    }

    /// Leaf index the next realized leaf will have.
    pub fn next_leaf_index(&self) -> usize {
        self.first_leaf + self.leaves.len()
    }

    pub fn header_index(&self, path: &[u32]) -> Option<usize> {
        self.lookup.get(path).copied()
    }

    pub fn push_header(&mut self, header: RealizedHeader) -> usize {
        let index = self.headers.len();
        self.lookup.insert(header.path.clone(), index);
        self.headers.push(header);
        index
    }

    pub fn leaf_indices(&self) -> Vec<usize> {
        self.leaves.iter().map(|leaf| leaf.leaf_index).collect()
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for (index, header) in self.headers.iter().enumerate() {
            self.lookup.insert(header.path.clone(), index);
        }
    }
}

// ============================================================================
// TABLIX GRID
// ============================================================================

pub struct TablixGrid<N: HierarchyNavigator> {
    pool: CellPool<N>,
    index: FxHashMap<CellKey, CellId>,
    pass: u64,
    rows: AxisWindow<N::Item>,
    columns: AxisWindow<N::Item>,
    /// (row level, column level, cell)
    corners: Vec<(usize, usize, CellId)>,
}

impl<N: HierarchyNavigator> TablixGrid<N> {
    pub fn new() -> Self {
        TablixGrid {
            pool: CellPool::new(),
            index: FxHashMap::default(),
            pass: 0,
            rows: AxisWindow::new(),
            columns: AxisWindow::new(),
            corners: Vec::new(),
        }
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Starts a pass: windows are emptied, cells stay in the index until
    /// the pass sweeps.
    pub fn begin_pass(&mut self, first_row: usize, first_column: usize) {
        self.pass += 1;
        self.rows.reset(first_row);
        self.columns.reset(first_column);
        self.corners.clear();
    }

    pub fn window(&self, axis: Axis) -> &AxisWindow<N::Item> {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    pub fn window_mut(&mut self, axis: Axis) -> &mut AxisWindow<N::Item> {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        }
    }

    pub fn corners(&self) -> &[(usize, usize, CellId)] {
        &self.corners
    }

    pub fn push_corner(&mut self, row_level: usize, column_level: usize, cell: CellId) {
        self.corners.push((row_level, column_level, cell));
    }

    pub fn cell(&self, id: CellId) -> &TablixCell<N> {
        self.pool.get(id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut TablixCell<N> {
        self.pool.get_mut(id)
    }

    pub fn cell_id(&self, key: &CellKey) -> Option<CellId> {
        self.index.get(key).copied()
    }

    pub fn body_cell(&self, row: usize, column: usize) -> Option<&TablixCell<N>> {
        self.cell_id(&CellKey::Body { row, column })
            .map(|id| self.pool.get(id))
    }

    /// Stamps an existing cell for this pass.
    pub fn reuse(&mut self, key: &CellKey) -> Option<CellId> {
        let id = self.index.get(key).copied()?;
        self.pool.get_mut(id).touched = self.pass;
        Some(id)
    }

    /// Takes a fresh cell from the pool. The caller binds it.
    pub fn create(&mut self, key: CellKey, context: CellContext) -> CellId {
        let id = self.pool.acquire(key.clone(), context, self.pass);
        self.index.insert(key, id);
        id
    }

    /// Returns the cell for `key`, creating it when missing. The flag tells
    /// whether the cell is new and still needs binding.
    pub fn obtain(&mut self, key: CellKey, context: CellContext) -> (CellId, bool) {
        match self.reuse(&key) {
            Some(id) => (id, false),
            None => (self.create(key, context), true),
        }
    }

    /// Drops the realized leaves from position `keep` on. Headers that no
    /// longer cover a leaf, and body cells of dropped leaves, lose their
    /// pass stamp and are recycled by the next sweep.
    pub fn truncate(&mut self, axis: Axis, keep: usize) {
        let (window, other) = match axis {
            Axis::Row => (&mut self.rows, &self.columns),
            Axis::Column => (&mut self.columns, &self.rows),
        };
        if keep >= window.leaves.len() {
            return;
        }

        let dropped: Vec<usize> = window.leaves[keep..].iter().map(|l| l.leaf_index).collect();
        window.leaves.truncate(keep);

        let headers = std::mem::take(&mut window.headers);
        for mut header in headers {
            if header.first >= keep {
                self.pool.get_mut(header.cell).touched = 0;
            } else {
                header.span = header.span.min(keep - header.first);
                window.headers.push(header);
            }
        }
        window.rebuild_lookup();

        for leaf in dropped {
            for other_leaf in &other.leaves {
                let key = match axis {
                    Axis::Row => CellKey::Body {
                        row: leaf,
                        column: other_leaf.leaf_index,
                    },
                    Axis::Column => CellKey::Body {
                        row: other_leaf.leaf_index,
                        column: leaf,
                    },
                };
                if let Some(&id) = self.index.get(&key) {
                    self.pool.get_mut(id).touched = 0;
                }
            }
        }
    }

    /// Recycles every cell not stamped by the current pass.
    pub fn sweep(&mut self, mut unbind: impl FnMut(&mut TablixCell<N>)) -> usize {
        let pass = self.pass;
        let pool = &mut self.pool;
        let mut released = 0;
        self.index.retain(|_, id| {
            let cell = pool.get_mut(*id);
            if cell.touched == pass {
                return true;
            }
            unbind(cell);
            pool.release(*id);
            released += 1;
            false
        });
        released
    }

    /// Recycles every cell. Used at the start of a rendering session.
    pub fn release_all(&mut self, mut unbind: impl FnMut(&mut TablixCell<N>)) -> usize {
        let released = self.index.len();
        for (_, id) in self.index.drain() {
            unbind(self.pool.get_mut(id));
            self.pool.release(id);
        }
        self.rows.reset(0);
        self.columns.reset(0);
        self.corners.clear();
        released
    }

    /// Cells currently realized.
    pub fn live(&self) -> usize {
        self.pool.live()
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = &TablixCell<N>> + '_ {
        self.index.values().map(move |&id| self.pool.get(id))
    }
}

impl<N: HierarchyNavigator> Default for TablixGrid<N> {
    fn default() -> Self {
        Self::new()
    }
}
