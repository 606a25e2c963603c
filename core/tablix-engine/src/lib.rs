//! FILENAME: core/tablix-engine/src/lib.rs
//! Tablix (Table/Matrix/List) virtualized grid engine.
//!
//! The engine realizes only the part of a hierarchical grid that fits the
//! viewport. Hosts describe their data through `HierarchyNavigator`, fill
//! cells through `TablixBinder`, and drive everything through
//! `TablixControl`.
//!
//! Layers:
//! - `navigator` / `binder`: Host contracts (WHAT the data is, HOW it looks)
//! - `definition`: Serializable options
//! - `realization` / `layout` / `column_width`: Sizing and prediction
//! - `grid` / `cell`: Realized cells and the pool behind them
//! - `engine`: One rendering pass (HOW we fill the viewport)
//! - `scroll` / `dimension`: Offsets, scrollbars and touch gestures
//! - `control`: The orchestrator hosts talk to
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `models`: Ready-made navigator and binder for label matrices

#[macro_use]
mod logging;

pub mod binder;
pub mod cell;
pub mod column_width;
pub mod control;
pub mod definition;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod models;
pub mod navigator;
pub mod realization;
pub mod scroll;
pub mod view;

pub use binder::TablixBinder;
pub use cell::{CellBinding, CellContent, CellContext, CellKey, CellRole, Rect, Size};
pub use column_width::{ColumnWidthChange, ColumnWidthManager, ColumnWidthObject};
pub use control::{PersistenceCallback, TablixControl};
pub use definition::*;
pub use dimension::TablixDimension;
pub use engine::{PassKind, SessionReport, SessionStatus};
pub use error::{Result, TablixError};
pub use layout::{CellSizer, ContentMeasurer, EstimatedSizer, LayoutKind, MeasuredSizer};
pub use navigator::{Axis, HierarchyNavigator};
pub use scroll::{ItemSizes, ScrollDelta, TouchRegionKind};
pub use view::{FrameLeaf, TablixView, TablixViewCell};
