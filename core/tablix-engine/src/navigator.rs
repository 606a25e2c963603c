//! FILENAME: core/tablix-engine/src/navigator.rs
//! Hierarchy Navigator - The contract with the data source.
//!
//! The engine never inspects hierarchy items. Everything it needs to know
//! about the shape of the data (flat table, grouped rows, N-level matrix)
//! it asks through this trait. Lookups return `Option`: a `None` where the
//! current snapshot must have a value is a contract violation and aborts
//! the rendering pass.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// One of the two scrollable dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Row, Axis::Column];

    pub fn other(self) -> Axis {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }
}

/// Walks a two-dimensional, possibly hierarchical data source.
///
/// `Items` is a collection handle (the root of a hierarchy or the children
/// of one item); `Item` is a single node. Leaves are numbered in document
/// order and leaves sharing a parent must be contiguous.
pub trait HierarchyNavigator {
    type Item: Clone + Debug;
    type Items: Clone + Debug;
    /// Payload of a body cell, the crossing of a row leaf and a column leaf.
    type Intersection: Clone + Debug;
    /// Payload of a corner cell.
    type Corner: Clone + Debug;

    fn row_hierarchy(&self) -> Self::Items;
    fn column_hierarchy(&self) -> Self::Items;

    fn hierarchy(&self, axis: Axis) -> Self::Items {
        match axis {
            Axis::Row => self.row_hierarchy(),
            Axis::Column => self.column_hierarchy(),
        }
    }

    /// Number of levels in the hierarchy.
    fn depth(&self, hierarchy: &Self::Items) -> usize;

    fn leaf_count(&self, hierarchy: &Self::Items) -> usize;

    /// Jumps straight to a leaf without walking the tree.
    fn leaf_at(&self, hierarchy: &Self::Items, index: usize) -> Option<Self::Item>;

    fn leaf_index(&self, item: &Self::Item) -> Option<usize>;

    fn is_leaf(&self, item: &Self::Item) -> bool;
    fn children(&self, item: &Self::Item) -> Option<Self::Items>;
    fn parent(&self, item: &Self::Item) -> Option<Self::Item>;

    /// Level of the item, 0 for top-level items.
    fn level(&self, item: &Self::Item) -> usize;

    /// Position of the item among its siblings.
    fn index(&self, item: &Self::Item) -> usize;

    fn count(&self, items: &Self::Items) -> usize;
    fn at(&self, items: &Self::Items, index: usize) -> Option<Self::Item>;

    fn is_first_item(&self, item: &Self::Item, _items: &Self::Items) -> bool {
        self.index(item) == 0
    }

    fn is_last_item(&self, item: &Self::Item, items: &Self::Items) -> bool {
        self.index(item) + 1 == self.count(items)
    }

    /// True when every ancestor of `item` is the first of its siblings.
    fn are_all_parents_first(&self, item: &Self::Item) -> bool {
        let mut current = self.parent(item);
        while let Some(parent) = current {
            if self.index(&parent) != 0 {
                return false;
            }
            current = self.parent(&parent);
        }
        true
    }

    /// True when every ancestor of `item` is the last of its siblings.
    fn are_all_parents_last(&self, item: &Self::Item) -> bool;

    fn intersection(&self, row: &Self::Item, column: &Self::Item) -> Option<Self::Intersection>;

    /// Corner payload for a row level / column level pair. `None` leaves
    /// that corner slot empty; it is not a violation.
    fn corner(&self, row_level: usize, column_level: usize) -> Option<Self::Corner>;

    /// Stable identity used to persist column widths across data refreshes.
    fn identity(&self, _item: &Self::Item) -> Option<String> {
        None
    }
}
