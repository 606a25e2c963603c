//! FILENAME: core/tablix-engine/src/error.rs

use thiserror::Error;

use crate::scroll::TouchRegionKind;

#[derive(Error, Debug)]
pub enum TablixError {
    /// A navigator lookup returned nothing where the model guarantees a value.
    #[error("Navigator contract violated in {operation}: {detail}")]
    NavigatorContract {
        operation: &'static str,
        detail: String,
    },

    #[error("Touch region {kind:?} overlaps an existing region")]
    OverlappingTouchRegion { kind: TouchRegionKind },

    #[error("Invalid persisted column widths: {0}")]
    InvalidColumnWidths(#[from] serde_json::Error),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, TablixError>;

/// Shorthand for building a navigator contract violation.
pub(crate) fn contract_violation(operation: &'static str, detail: impl Into<String>) -> TablixError {
    TablixError::NavigatorContract {
        operation,
        detail: detail.into(),
    }
}
