//! FILENAME: core/tablix-engine/src/models/mod.rs
//! Reference data model: axis trees, a matrix navigator and a label binder.
//!
//! Hosts with their own data source implement `HierarchyNavigator`
//! directly; these types cover flat tables and label-path matrices.

pub mod axis_tree;
pub mod binder;
pub mod matrix;

pub use axis_tree::{AxisNode, AxisTree};
pub use binder::{BindCounts, LabelBinder};
pub use matrix::{AxisItem, AxisItems, CornerLabel, MatrixCell, MatrixNavigator};
