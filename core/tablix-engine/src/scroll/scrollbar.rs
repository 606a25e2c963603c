//! FILENAME: core/tablix-engine/src/scroll/scrollbar.rs
//! Scrollbar - Extent/position model of one dimension's scrollbar.
//!
//! The scrollbar works in items, not pixels: `total` is the leaf count,
//! `extent` the (fractional) number of visible leaves and `offset` the
//! dimension's scroll offset. Pointer input is in pixels along the track.
//! Time is passed in by the caller, so press-and-hold repeat is driven by
//! `tick` rather than by timers.

use crate::definition::{ScrollbarOptions, TrackClickMode};

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    pointer_start: f64,
    thumb_start: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RepeatState {
    pointer: f64,
    /// +1.0 toward the end, -1.0 toward the start.
    direction: f64,
    next_fire_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Scrollbar {
    options: ScrollbarOptions,
    track_length: f64,
    total: f64,
    extent: f64,
    offset: f64,
    drag: Option<DragState>,
    repeat: Option<RepeatState>,
}

impl Scrollbar {
    pub fn new(options: ScrollbarOptions) -> Self {
        Scrollbar {
            options,
            track_length: 0.0,
            total: 0.0,
            extent: 0.0,
            offset: 0.0,
            drag: None,
            repeat: None,
        }
    }

    pub fn update(&mut self, total: f64, extent: f64, offset: f64) {
        self.total = total.max(0.0);
        self.extent = extent.clamp(0.0, self.total);
        self.offset = offset.clamp(0.0, self.max_offset());
    }

    pub fn set_track_length(&mut self, length: f64) {
        self.track_length = length.max(0.0);
    }

    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn max_offset(&self) -> f64 {
        (self.total - self.extent).max(0.0)
    }

    /// Visible fraction of the total, in [0, 1].
    pub fn extent_fraction(&self) -> f64 {
        if self.total <= 0.0 {
            1.0
        } else {
            (self.extent / self.total).clamp(0.0, 1.0)
        }
    }

    /// Scalar position in [0, 1].
    pub fn position(&self) -> f64 {
        let max = self.max_offset();
        if max <= 0.0 {
            0.0
        } else {
            (self.offset / max).clamp(0.0, 1.0)
        }
    }

    pub fn is_visible(&self) -> bool {
        self.extent_fraction() < 1.0 && self.track_length > 0.0
    }

    /// Thumb start and length in track pixels.
    pub fn thumb(&self) -> (f64, f64) {
        let length = (self.track_length * self.extent_fraction())
            .max(self.options.min_thumb_length)
            .min(self.track_length);
        let start = self.position() * (self.track_length - length);
        (start, length)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    fn offset_for_thumb_start(&self, start: f64) -> f64 {
        let (_, length) = self.thumb();
        let room = self.track_length - length;
        if room <= 0.0 {
            return 0.0;
        }
        (start / room).clamp(0.0, 1.0) * self.max_offset()
    }

    fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Pointer pressed at `pointer` px along the track. Returns the new
    /// offset when the press scrolls.
    pub fn pointer_down(&mut self, pointer: f64, now_ms: u64) -> Option<f64> {
        self.drag = None;
        self.repeat = None;
        if !self.is_visible() {
            return None;
        }

        let (start, length) = self.thumb();
        if pointer >= start && pointer < start + length {
            self.drag = Some(DragState {
                pointer_start: pointer,
                thumb_start: start,
            });
            return None;
        }

        match self.options.track_click {
            TrackClickMode::Center => Some(self.offset_for_thumb_start(pointer - length / 2.0)),
            TrackClickMode::Page => {
                let direction = if pointer < start { -1.0 } else { 1.0 };
                self.repeat = Some(RepeatState {
                    pointer,
                    direction,
                    next_fire_ms: now_ms + self.options.initial_repeat_delay_ms,
                });
                Some(self.clamp(self.offset + direction * self.extent))
            }
        }
    }

    /// Dragging maps linearly from thumb pixels to offset.
    pub fn pointer_move(&mut self, pointer: f64) -> Option<f64> {
        let drag = self.drag?;
        let start = drag.thumb_start + (pointer - drag.pointer_start);
        Some(self.offset_for_thumb_start(start))
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
        self.repeat = None;
    }

    /// Fires press-and-hold steps that are due. Stops stepping once the
    /// thumb has reached the pointer.
    pub fn tick(&mut self, now_ms: u64) -> Option<f64> {
        let mut repeat = self.repeat?;
        if now_ms < repeat.next_fire_ms {
            return None;
        }

        let (start, length) = self.thumb();
        let reached = if repeat.direction < 0.0 {
            repeat.pointer >= start
        } else {
            repeat.pointer < start + length
        };
        if reached {
            return None;
        }

        repeat.next_fire_ms = now_ms + self.options.repeat_delay_ms;
        self.repeat = Some(repeat);
        let target = self.clamp(self.offset + repeat.direction * self.extent);
        if target == self.offset {
            return None;
        }
        Some(target)
    }

    /// Positive lines scroll toward the end.
    pub fn wheel(&self, lines: f64) -> Option<f64> {
        if lines == 0.0 || !lines.is_finite() {
            return None;
        }
        let target = self.clamp(self.offset + lines * self.options.wheel_step);
        if target == self.offset {
            None
        } else {
            Some(target)
        }
    }
}
