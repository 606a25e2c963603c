//! FILENAME: core/tablix-engine/src/definition.rs
//! Tablix Options - The serializable configuration.
//!
//! This module contains every tunable of the control:
//! - Realization estimator constants and the iteration cap
//! - Sizing minimums and the text metrics used by estimated layout
//! - Scrollbar and touch gesture behavior
//!
//! Options are plain data: they can be loaded from JSON, and missing
//! fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TablixError};

// ============================================================================
// REALIZATION
// ============================================================================

/// Constants of the adaptive realization loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealizationOptions {
    /// Hard cap on realization iterations in one pass.
    pub max_iterations: usize,

    /// Row height assumed before any row was measured.
    pub initial_row_height: f64,

    /// Column width assumed before any column was measured.
    pub initial_column_width: f64,

    /// Upper bound on items realized by a single iteration.
    pub max_items_per_iteration: usize,

    /// Weight of the newest sample in the decaying average, in (0, 1].
    pub average_decay: f64,

    /// Lower bound of the per-iteration correction ratio.
    pub min_correction: f64,

    /// Upper bound of the per-iteration correction ratio.
    pub max_correction: f64,
}

impl Default for RealizationOptions {
    fn default() -> Self {
        RealizationOptions {
            max_iterations: 10,
            initial_row_height: 20.0,
            initial_column_width: 80.0,
            max_items_per_iteration: 500,
            average_decay: 0.5,
            min_correction: 0.5,
            max_correction: 2.0,
        }
    }
}

// ============================================================================
// SIZING
// ============================================================================

/// Character metrics used when sizes are estimated instead of measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    /// Padding on each side, horizontally.
    pub horizontal_padding: f64,
    /// Padding on each side, vertically.
    pub vertical_padding: f64,
    /// Width of one indent step.
    pub indent_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        TextMetrics {
            char_width: 7.0,
            line_height: 16.0,
            horizontal_padding: 4.0,
            vertical_padding: 2.0,
            indent_width: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingOptions {
    pub min_column_width: f64,
    pub min_row_height: f64,
    /// Minimum size of a header level (row header column or column header row).
    pub min_level_size: f64,
    pub metrics: TextMetrics,
}

impl Default for SizingOptions {
    fn default() -> Self {
        SizingOptions {
            min_column_width: 20.0,
            min_row_height: 12.0,
            min_level_size: 12.0,
            metrics: TextMetrics::default(),
        }
    }
}

// ============================================================================
// SCROLLBAR
// ============================================================================

/// What a click on the scrollbar track (outside the thumb) does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackClickMode {
    /// Center the thumb on the click point.
    Center,
    /// Step one extent toward the click point, auto-repeating while held.
    #[default]
    Page,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollbarOptions {
    pub track_click: TrackClickMode,
    /// Delay before press-and-hold starts repeating.
    pub initial_repeat_delay_ms: u64,
    /// Delay between repeats once repeating.
    pub repeat_delay_ms: u64,
    pub min_thumb_length: f64,
    /// Items scrolled per wheel line.
    pub wheel_step: f64,
}

impl Default for ScrollbarOptions {
    fn default() -> Self {
        ScrollbarOptions {
            track_click: TrackClickMode::Page,
            initial_repeat_delay_ms: 400,
            repeat_delay_ms: 50,
            min_thumb_length: 16.0,
            wheel_step: 3.0,
        }
    }
}

// ============================================================================
// TOUCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TouchOptions {
    /// Movement (px) needed before the gesture axis is decided.
    pub lock_distance: f64,
    /// How strongly one axis must dominate to lock onto it.
    pub lock_ratio: f64,
    /// Samples after which an undecided gesture scrolls freely.
    pub lock_samples: usize,
    /// Release speed (px/ms) that starts a slide.
    pub slide_velocity_threshold: f64,
    pub max_slide_steps: usize,
    /// Velocity multiplier applied after each slide step.
    pub slide_decay: f64,
    /// Duration of one slide step.
    pub slide_frame_ms: f64,
    /// Only moves this recent count toward the release velocity.
    pub velocity_window_ms: u64,
}

impl Default for TouchOptions {
    fn default() -> Self {
        TouchOptions {
            lock_distance: 8.0,
            lock_ratio: 2.0,
            lock_samples: 4,
            slide_velocity_threshold: 0.3,
            max_slide_steps: 10,
            slide_decay: 0.8,
            slide_frame_ms: 16.0,
            velocity_window_ms: 100,
        }
    }
}

// ============================================================================
// TABLIX OPTIONS
// ============================================================================

/// Complete configuration of a `TablixControl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TablixOptions {
    pub realization: RealizationOptions,
    pub sizing: SizingOptions,
    pub scrollbar: ScrollbarOptions,
    pub touch: TouchOptions,

    /// Initial state of the global "auto-size all columns" toggle.
    pub auto_size_columns: bool,

    /// Panic on navigator contract violations instead of aborting the pass.
    /// On by default in debug builds; never read from JSON.
    #[serde(skip, default = "default_assert_contracts")]
    pub assert_contracts: bool,
}

fn default_assert_contracts() -> bool {
    cfg!(debug_assertions)
}

impl Default for TablixOptions {
    fn default() -> Self {
        TablixOptions {
            realization: RealizationOptions::default(),
            sizing: SizingOptions::default(),
            scrollbar: ScrollbarOptions::default(),
            touch: TouchOptions::default(),
            auto_size_columns: false,
            assert_contracts: default_assert_contracts(),
        }
    }
}

impl TablixOptions {
    /// Parses and validates options from JSON. Missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: TablixOptions =
            serde_json::from_str(json).map_err(|e| TablixError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| TablixError::InvalidOptions(e.to_string()))
    }

    /// Rejects values the realization loop and layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        let r = &self.realization;
        if r.max_iterations == 0 {
            return Err(invalid("realization.maxIterations must be at least 1"));
        }
        if r.max_items_per_iteration == 0 {
            return Err(invalid("realization.maxItemsPerIteration must be at least 1"));
        }
        if !positive(r.initial_row_height) || !positive(r.initial_column_width) {
            return Err(invalid("initial item sizes must be positive"));
        }
        if !(r.average_decay > 0.0 && r.average_decay <= 1.0) {
            return Err(invalid("realization.averageDecay must be in (0, 1]"));
        }
        if !(r.min_correction > 0.0 && r.min_correction <= 1.0 && r.max_correction >= 1.0) {
            return Err(invalid("corrections must satisfy 0 < min <= 1 <= max"));
        }

        let m = &self.sizing.metrics;
        if !positive(m.char_width) || !positive(m.line_height) {
            return Err(invalid("text metrics must be positive"));
        }
        if self.sizing.min_column_width < 0.0
            || self.sizing.min_row_height < 0.0
            || self.sizing.min_level_size < 0.0
        {
            return Err(invalid("minimum sizes must not be negative"));
        }

        if self.scrollbar.min_thumb_length < 0.0 || !positive(self.scrollbar.wheel_step) {
            return Err(invalid("scrollbar sizes must be positive"));
        }

        let t = &self.touch;
        if t.lock_ratio < 1.0 || t.lock_samples == 0 {
            return Err(invalid("touch lock needs ratio >= 1 and at least one sample"));
        }
        if !(t.slide_decay > 0.0 && t.slide_decay < 1.0) || !positive(t.slide_frame_ms) {
            return Err(invalid("touch.slideDecay must be in (0, 1)"));
        }

        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(message: &str) -> TablixError {
    TablixError::InvalidOptions(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TablixOptions::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let options = TablixOptions::from_json(
            r#"{ "realization": { "maxIterations": 4 }, "scrollbar": { "trackClick": "center" } }"#,
        )
        .unwrap();
        assert_eq!(options.realization.max_iterations, 4);
        assert_eq!(options.realization.initial_row_height, 20.0);
        assert_eq!(options.scrollbar.track_click, TrackClickMode::Center);
        assert_eq!(options.assert_contracts, cfg!(debug_assertions));
    }

    #[test]
    fn test_from_json_rejects_bad_corrections() {
        let err = TablixOptions::from_json(r#"{ "realization": { "minCorrection": 1.5 } }"#);
        assert!(matches!(err, Err(TablixError::InvalidOptions(_))));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(TablixOptions::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut options = TablixOptions::default();
        options.touch.max_slide_steps = 3;
        let json = options.to_json().unwrap();
        let parsed = TablixOptions::from_json(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
