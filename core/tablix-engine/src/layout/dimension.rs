//! FILENAME: core/tablix-engine/src/layout/dimension.rs
//! Dimension Layout Manager - Pixel sizes of one axis.
//!
//! Rows and columns are laid out by the same code under a 90 degree swap:
//! "along" is height for rows and width for columns, "across" is the
//! other one. Per pass the manager computes:
//! - level sizes: the across size of each header level (row header column
//!   widths, column header row heights)
//! - natural leaf sizes: the along size each realized leaf wants
//! - aligned sizes: natural sizes after composite headers pushed their
//!   overflow into their last realized child
//!
//! All sizes are whole pixels, so sums are exact.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::Size;
use crate::column_width::ColumnWidthManager;
use crate::grid::TablixGrid;
use crate::navigator::{Axis, HierarchyNavigator};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LeafSize {
    pub natural: f64,
    pub size: f64,
    pub user_fixed: bool,
}

#[derive(Debug, Clone)]
pub struct DimensionLayoutManager {
    axis: Axis,
    min_size: f64,
    min_level_size: f64,

    level_sizes: Vec<f64>,
    levels_locked: bool,
    /// Natural sizes locked by `fix_sizes`, by leaf index. Holds one entry
    /// per leaf realized since the session started; `reset` empties it.
    fixed_sizes: FxHashMap<usize, f64>,

    /// Leaves whose auto size is reported to the column width manager.
    /// Same per-session bound as `fixed_sizes`.
    tracked: FxHashSet<usize>,
    reported: FxHashSet<usize>,

    /// Parallel to the realized window of the last pass.
    leaves: Vec<LeafSize>,
    headers: Vec<f64>,
}

impl DimensionLayoutManager {
    pub fn new(axis: Axis, min_size: f64, min_level_size: f64) -> Self {
        DimensionLayoutManager {
            axis,
            min_size,
            min_level_size,
            level_sizes: Vec::new(),
            levels_locked: false,
            fixed_sizes: FxHashMap::default(),
            tracked: FxHashSet::default(),
            reported: FxHashSet::default(),
            leaves: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Forgets everything fixed by the previous session.
    pub fn reset(&mut self) {
        self.level_sizes.clear();
        self.levels_locked = false;
        self.fixed_sizes.clear();
        self.tracked.clear();
        self.reported.clear();
        self.leaves.clear();
        self.headers.clear();
    }

    pub fn track_leaf(&mut self, leaf_index: usize) {
        self.tracked.insert(leaf_index);
    }

    // ========================================================================
    // LEVEL SIZES
    // ========================================================================

    /// Header level sizes across the axis, from the realized headers and
    /// the given corner cells. A ragged leaf spanning several levels grows
    /// the last level it spans. Locked sizes are reused as is.
    pub fn calculate_sizes<N: HierarchyNavigator>(
        &mut self,
        grid: &TablixGrid<N>,
        headers_enabled: bool,
        depth: usize,
        corners: &[(usize, Size)],
    ) {
        if !headers_enabled {
            self.level_sizes.clear();
            return;
        }
        if self.levels_locked && self.level_sizes.len() == depth {
            return;
        }

        let axis = self.axis;
        let window = grid.window(axis);
        let mut sizes = vec![self.min_level_size; depth];

        for header in window.headers.iter().filter(|h| h.level_span == 1) {
            if let Some(slot) = sizes.get_mut(header.level) {
                let wanted = grid.cell(header.cell).content_size.across(axis);
                *slot = slot.max(wanted);
            }
        }
        for (level, size) in corners {
            if let Some(slot) = sizes.get_mut(*level) {
                *slot = slot.max(size.across(axis));
            }
        }

        for header in window.headers.iter().filter(|h| h.level_span > 1) {
            let last = header.level + header.level_span - 1;
            if last >= sizes.len() {
                continue;
            }
            let covered: f64 = sizes[header.level..last].iter().sum();
            let wanted = grid.cell(header.cell).content_size.across(axis);
            if wanted > covered + sizes[last] {
                sizes[last] = wanted - covered;
            }
        }

        self.level_sizes = sizes.into_iter().map(f64::ceil).collect();
    }

    pub fn level_sizes(&self) -> &[f64] {
        &self.level_sizes
    }

    pub fn level_size(&self, level: usize) -> f64 {
        self.level_sizes.get(level).copied().unwrap_or(0.0)
    }

    /// Offset of a level from the start of the header region.
    pub fn level_offset(&self, level: usize) -> f64 {
        self.level_sizes.iter().take(level).sum()
    }

    pub fn level_extent(&self, level: usize, span: usize) -> f64 {
        self.level_sizes.iter().skip(level).take(span).sum()
    }

    /// Total header size across the axis.
    pub fn levels_total(&self) -> f64 {
        self.level_sizes.iter().sum()
    }

    // ========================================================================
    // CONTEXTUAL (ALONG) SIZES
    // ========================================================================

    /// Natural size of every realized leaf: a user-fixed column width, a
    /// size fixed earlier in the session, or the largest of the leaf header
    /// and the leaf's body cells.
    pub fn calculate_contextual_widths<N: HierarchyNavigator>(
        &mut self,
        grid: &TablixGrid<N>,
        widths: Option<&ColumnWidthManager>,
    ) {
        let axis = self.axis;
        let window = grid.window(axis);
        let other = grid.window(axis.other());

        let mut leaves = Vec::with_capacity(window.leaves.len());
        for leaf in &window.leaves {
            let user_width = match (widths, leaf.identity.as_deref()) {
                (Some(widths), Some(identity)) => widths.fixed_width(identity),
                _ => None,
            };
            let natural = if let Some(width) = user_width {
                leaf_size(width.ceil(), true)
            } else if let Some(&fixed) = self.fixed_sizes.get(&leaf.leaf_index) {
                leaf_size(fixed, false)
            } else {
                let mut wanted = self.min_size;
                if let Some(header) = leaf.header {
                    wanted = wanted.max(grid.cell(header).content_size.along(axis));
                }
                for cross in &other.leaves {
                    let body = match axis {
                        Axis::Row => grid.body_cell(leaf.leaf_index, cross.leaf_index),
                        Axis::Column => grid.body_cell(cross.leaf_index, leaf.leaf_index),
                    };
                    if let Some(cell) = body {
                        wanted = wanted.max(cell.content_size.along(axis));
                    }
                }
                leaf_size(wanted.ceil(), false)
            };
            leaves.push(natural);
        }
        self.leaves = leaves;
        self.headers = vec![0.0; window.headers.len()];
    }

    pub fn leaves(&self) -> &[LeafSize] {
        &self.leaves
    }

    pub fn leaf_size(&self, position: usize) -> f64 {
        self.leaves.get(position).map(|l| l.size).unwrap_or(0.0)
    }

    pub fn natural(&self, position: usize) -> f64 {
        self.leaves.get(position).map(|l| l.natural).unwrap_or(0.0)
    }

    pub fn header_size(&self, index: usize) -> f64 {
        self.headers.get(index).copied().unwrap_or(0.0)
    }

    /// Pixels the realized leaves cover in the viewport, with `fraction`
    /// of the first leaf scrolled out.
    pub fn natural_extent(&self, fraction: f64) -> f64 {
        let total: f64 = self.leaves.iter().map(|l| l.natural).sum();
        total - fraction * self.natural(0)
    }

    /// Smallest number of leaves whose natural sizes cover `available`.
    pub fn leaves_to_fill(&self, available: f64, fraction: f64) -> usize {
        let mut consumed = 0.0;
        for (position, leaf) in self.leaves.iter().enumerate() {
            consumed += leaf.natural;
            if position == 0 {
                consumed -= fraction * leaf.natural;
            }
            if consumed >= available {
                return position + 1;
            }
        }
        self.leaves.len()
    }

    /// Drops sizes of leaves truncated from the window.
    pub fn truncate(&mut self, keep: usize) {
        self.leaves.truncate(keep);
    }

    // ========================================================================
    // SPANS
    // ========================================================================

    /// Aligns composite headers with their realized children. Deeper
    /// headers go first; a header whose content is larger than its children
    /// grows the last realized child, unless the user fixed that child.
    /// Every header container is then the exact sum of its leaves.
    pub fn calculate_spans<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) {
        let axis = self.axis;
        let window = grid.window(axis);
        for leaf in &mut self.leaves {
            leaf.size = leaf.natural;
        }

        let mut order: Vec<usize> = (0..window.headers.len())
            .filter(|&i| !window.headers[i].is_leaf)
            .collect();
        order.sort_by(|&a, &b| window.headers[b].level.cmp(&window.headers[a].level));

        for index in order {
            let header = &window.headers[index];
            let end = (header.first + header.span).min(self.leaves.len());
            if header.first >= end {
                continue;
            }
            let sum: f64 = self.leaves[header.first..end].iter().map(|l| l.size).sum();
            let wanted = grid.cell(header.cell).content_size.along(axis).ceil();
            let last = &mut self.leaves[end - 1];
            if wanted > sum && !last.user_fixed {
                last.size += wanted - sum;
            }
        }

        self.headers = window
            .headers
            .iter()
            .map(|header| {
                let end = (header.first + header.span).min(self.leaves.len());
                self.leaves
                    .get(header.first..end)
                    .map(|run| run.iter().map(|l| l.size).sum())
                    .unwrap_or(0.0)
            })
            .collect();
    }

    // ========================================================================
    // FIXING
    // ========================================================================

    /// Locks level sizes and natural leaf sizes for the following scroll
    /// passes. Sizes fixed earlier in the session are kept.
    pub fn fix_sizes<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) {
        let window = grid.window(self.axis);
        for (leaf, size) in window.leaves.iter().zip(&self.leaves) {
            if !size.user_fixed {
                self.fixed_sizes.entry(leaf.leaf_index).or_insert(size.natural);
            }
        }
        self.levels_locked = true;
    }

    pub fn is_fixed(&self, leaf_index: usize) -> bool {
        self.fixed_sizes.contains_key(&leaf_index)
    }

    /// Natural sizes of tracked leaves not reported yet, with identities.
    pub fn take_auto_sizes<N: HierarchyNavigator>(&mut self, grid: &TablixGrid<N>) -> Vec<(String, f64)> {
        let window = grid.window(self.axis);
        let mut sizes = Vec::new();
        for (leaf, size) in window.leaves.iter().zip(&self.leaves) {
            if size.user_fixed || !self.tracked.contains(&leaf.leaf_index) {
                continue;
            }
            if let Some(identity) = &leaf.identity {
                if self.reported.insert(leaf.leaf_index) {
                    sizes.push((identity.clone(), size.natural));
                }
            }
        }
        sizes
    }
}

fn leaf_size(natural: f64, user_fixed: bool) -> LeafSize {
    LeafSize {
        natural,
        size: natural,
        user_fixed,
    }
}
