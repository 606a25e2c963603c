//! FILENAME: core/tablix-engine/src/models/matrix.rs
//! Matrix Navigator - A navigator over two axis trees.
//!
//! Serves both data shapes the control is built for: a table is a matrix
//! whose rows are one flat level, a matrix has grouped rows and/or columns.
//! Body values come from an optional value function; without one every
//! body cell shows its coordinates.

use std::fmt;

use crate::models::axis_tree::{AxisNode, AxisTree};
use crate::navigator::{Axis, HierarchyNavigator};

/// A node of either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisItem {
    pub axis: Axis,
    pub node: usize,
}

/// The roots of an axis (`parent == None`) or the children of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisItems {
    pub axis: Axis,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCell {
    pub row: usize,
    pub column: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CornerLabel {
    pub row_level: usize,
    pub column_level: usize,
    pub text: String,
}

type ValueFn = Box<dyn Fn(usize, usize) -> String>;

pub struct MatrixNavigator {
    rows: AxisTree,
    columns: AxisTree,
    values: Option<ValueFn>,
}

impl fmt::Debug for MatrixNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixNavigator")
            .field("rows", &self.rows.leaf_count())
            .field("columns", &self.columns.leaf_count())
            .finish()
    }
}

impl MatrixNavigator {
    pub fn new(rows: AxisTree, columns: AxisTree) -> Self {
        MatrixNavigator {
            rows,
            columns,
            values: None,
        }
    }

    /// A flat table: rows numbered from 1, one column per name.
    pub fn table(row_count: usize, columns: &[&str]) -> Self {
        let labels: Vec<String> = (1..=row_count).map(|i| i.to_string()).collect();
        MatrixNavigator::new(AxisTree::flat("Row", &labels), AxisTree::flat("Column", columns))
    }

    /// Body text by (row leaf, column leaf).
    pub fn with_values(mut self, values: impl Fn(usize, usize) -> String + 'static) -> Self {
        self.values = Some(Box::new(values));
        self
    }

    pub fn tree(&self, axis: Axis) -> &AxisTree {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    fn node(&self, item: &AxisItem) -> Option<&AxisNode> {
        self.tree(item.axis).node(item.node)
    }

    pub fn label(&self, item: &AxisItem) -> &str {
        self.node(item).map(|n| n.label.as_str()).unwrap_or("")
    }

    pub fn row_leaf(&self, index: usize) -> Option<AxisItem> {
        self.leaf_at(&self.row_hierarchy(), index)
    }

    pub fn column_leaf(&self, index: usize) -> Option<AxisItem> {
        self.leaf_at(&self.column_hierarchy(), index)
    }

    fn siblings(&self, items: &AxisItems) -> &[usize] {
        let tree = self.tree(items.axis);
        match items.parent {
            Some(parent) => tree.node(parent).map(|n| n.children.as_slice()).unwrap_or(&[]),
            None => tree.roots(),
        }
    }
}

impl HierarchyNavigator for MatrixNavigator {
    type Item = AxisItem;
    type Items = AxisItems;
    type Intersection = MatrixCell;
    type Corner = CornerLabel;

    fn row_hierarchy(&self) -> AxisItems {
        AxisItems {
            axis: Axis::Row,
            parent: None,
        }
    }

    fn column_hierarchy(&self) -> AxisItems {
        AxisItems {
            axis: Axis::Column,
            parent: None,
        }
    }

    fn depth(&self, hierarchy: &AxisItems) -> usize {
        self.tree(hierarchy.axis).depth()
    }

    fn leaf_count(&self, hierarchy: &AxisItems) -> usize {
        let tree = self.tree(hierarchy.axis);
        match hierarchy.parent {
            Some(parent) => tree.node(parent).map(|n| n.leaf_count).unwrap_or(0),
            None => tree.leaf_count(),
        }
    }

    fn leaf_at(&self, hierarchy: &AxisItems, index: usize) -> Option<AxisItem> {
        let tree = self.tree(hierarchy.axis);
        let first = match hierarchy.parent {
            Some(parent) => tree.node(parent)?.first_leaf,
            None => 0,
        };
        if index >= self.leaf_count(hierarchy) {
            return None;
        }
        tree.leaves().get(first + index).map(|&node| AxisItem {
            axis: hierarchy.axis,
            node,
        })
    }

    fn leaf_index(&self, item: &AxisItem) -> Option<usize> {
        self.node(item)?.leaf_index
    }

    fn is_leaf(&self, item: &AxisItem) -> bool {
        self.node(item).map(AxisNode::is_leaf).unwrap_or(false)
    }

    fn children(&self, item: &AxisItem) -> Option<AxisItems> {
        let node = self.node(item)?;
        if node.is_leaf() {
            return None;
        }
        Some(AxisItems {
            axis: item.axis,
            parent: Some(item.node),
        })
    }

    fn parent(&self, item: &AxisItem) -> Option<AxisItem> {
        self.node(item)?.parent.map(|node| AxisItem {
            axis: item.axis,
            node,
        })
    }

    fn level(&self, item: &AxisItem) -> usize {
        self.node(item).map(|n| n.level).unwrap_or(0)
    }

    fn index(&self, item: &AxisItem) -> usize {
        self.node(item).map(|n| n.index).unwrap_or(0)
    }

    fn count(&self, items: &AxisItems) -> usize {
        self.siblings(items).len()
    }

    fn at(&self, items: &AxisItems, index: usize) -> Option<AxisItem> {
        self.siblings(items).get(index).map(|&node| AxisItem {
            axis: items.axis,
            node,
        })
    }

    fn are_all_parents_last(&self, item: &AxisItem) -> bool {
        let tree = self.tree(item.axis);
        let mut current = self.parent(item);
        while let Some(parent) = current {
            let siblings = match tree.node(parent.node).and_then(|n| n.parent) {
                Some(grand) => tree.node(grand).map(|n| n.children.len()).unwrap_or(0),
                None => tree.roots().len(),
            };
            if self.index(&parent) + 1 != siblings {
                return false;
            }
            current = self.parent(&parent);
        }
        true
    }

    fn intersection(&self, row: &AxisItem, column: &AxisItem) -> Option<MatrixCell> {
        let row = self.leaf_index(row)?;
        let column = self.leaf_index(column)?;
        let text = match &self.values {
            Some(values) => values(row, column),
            None => format!("R{}C{}", row, column),
        };
        Some(MatrixCell { row, column, text })
    }

    /// The row level names sit on the last column header row, the column
    /// level names in the last row header column.
    fn corner(&self, row_level: usize, column_level: usize) -> Option<CornerLabel> {
        let last_row_level = self.rows.depth().checked_sub(1)?;
        let last_column_level = self.columns.depth().checked_sub(1)?;
        let text = if column_level == last_column_level {
            self.rows.level_names().get(row_level).cloned().unwrap_or_default()
        } else if row_level == last_row_level {
            self.columns.level_names().get(column_level).cloned().unwrap_or_default()
        } else {
            String::new()
        };
        Some(CornerLabel {
            row_level,
            column_level,
            text,
        })
    }

    fn identity(&self, item: &AxisItem) -> Option<String> {
        self.node(item)?;
        Some(self.tree(item.axis).label_path(item.node).join("/"))
    }
}
