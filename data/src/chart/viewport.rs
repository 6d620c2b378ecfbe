use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::coords;

/// The visible horizontal window over the pixel-mapped content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset_px: f32,
    pub width_px: f32,
    pub step_px: f32,
}

impl Viewport {
    pub fn offset_units(&self) -> f32 {
        if self.step_px > 0.0 {
            self.offset_px / self.step_px
        } else {
            0.0
        }
    }

    pub fn width_units(&self) -> f32 {
        if self.step_px > 0.0 {
            self.width_px / self.step_px
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    /// Live preview while a drag or programmatic seek is in flight.
    Seeking(f32),
    /// Committed offset at the end of a drag.
    Seek(f32),
}

/// Owns the main chart's scroll position and zoom level.
///
/// Internally the position is a non-positive `shift` of the content; the
/// public offset is its negation. Every mutation clamps the shift to
/// `[min(0, -(content - width)), 0]` and reports whether it changed, so
/// callers only redraw on real movement.
#[derive(Debug, Clone)]
pub struct ViewportController {
    width_px: f32,
    step_px: f32,
    data_len: usize,
    end_padding_px: f32,
    max_step_px: f32,
    shift: f32,
    prev_shift: f32,
    drag_start_x: Option<f32>,
}

impl ViewportController {
    pub fn new(step_px: f32, end_padding_px: f32, max_step_px: f32) -> Self {
        Self {
            width_px: 0.0,
            step_px,
            data_len: 0,
            end_padding_px,
            max_step_px,
            shift: 0.0,
            prev_shift: 0.0,
            drag_start_x: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            offset_px: self.offset_px(),
            width_px: self.width_px,
            step_px: self.step_px,
        }
    }

    pub fn offset_px(&self) -> f32 {
        // avoid handing out -0.0
        if self.shift == 0.0 { 0.0 } else { -self.shift }
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start_x.is_some()
    }

    pub fn content_width(&self) -> f32 {
        self.data_len as f32 * self.step_px + self.end_padding_px
    }

    fn min_shift(&self) -> f32 {
        (self.width_px - self.content_width()).min(0.0)
    }

    fn apply_shift(&mut self, shift: f32) -> bool {
        let clamped = shift.clamp(self.min_shift(), 0.0);
        if clamped == self.shift {
            return false;
        }
        self.shift = clamped;
        true
    }

    fn reclamp(&mut self) -> bool {
        let changed = self.apply_shift(self.shift);
        if !self.is_dragging() {
            self.prev_shift = self.shift;
        }
        changed
    }

    pub fn set_data_len(&mut self, data_len: usize) -> bool {
        self.data_len = data_len;
        self.drag_start_x = None;
        self.reclamp()
    }

    pub fn resize(&mut self, width_px: f32) -> bool {
        if width_px <= 0.0 || width_px == self.width_px {
            return false;
        }
        self.width_px = width_px;
        self.reclamp();
        true
    }

    pub fn begin_drag(&mut self, x: f32) {
        self.drag_start_x = Some(x);
        self.prev_shift = self.shift;
    }

    pub fn drag_to(&mut self, x: f32) -> Option<ViewportEvent> {
        let start_x = self.drag_start_x?;

        self.apply_shift(self.prev_shift + (x - start_x))
            .then(|| ViewportEvent::Seeking(self.offset_px()))
    }

    pub fn end_drag(&mut self) -> Option<ViewportEvent> {
        self.drag_start_x.take()?;

        let moved = self.shift != self.prev_shift;
        self.prev_shift = self.shift;

        moved.then(|| ViewportEvent::Seek(self.offset_px()))
    }

    /// Jumps to `offset_px` without a drag, e.g. when syncing from the minimap.
    pub fn seek_px(&mut self, offset_px: f32) -> Option<ViewportEvent> {
        if !offset_px.is_finite() {
            return None;
        }
        let changed = self.apply_shift(-offset_px);
        self.prev_shift = self.shift;

        changed.then(|| ViewportEvent::Seeking(self.offset_px()))
    }

    /// Shows `width_units` samples starting at sample `offset_units`.
    pub fn show_range(&mut self, offset_units: f32, width_units: f32) -> bool {
        if self.width_px <= 0.0 || width_units <= 0.0 || !offset_units.is_finite() {
            return false;
        }

        let step_px = self.width_px / width_units;
        let step_changed = step_px != self.step_px;
        self.step_px = step_px;

        let shift_changed = self.apply_shift(-(offset_units * step_px));
        self.prev_shift = self.shift;

        step_changed || shift_changed
    }

    /// Scales the step by `factor`, keeping the sample under `anchor_x` in place.
    ///
    /// Never zooms in past `min_width_units` samples across the viewport.
    pub fn zoom_by(&mut self, factor: f32, anchor_x: f32, min_width_units: f32) -> bool {
        if self.data_len < 2 || self.width_px <= 0.0 || factor <= 0.0 || self.is_dragging() {
            return false;
        }

        let min_units = min_width_units.max(2.0);
        let min_step = self.width_px / self.data_len as f32;
        let max_step = self
            .max_step_px
            .min(self.width_px / min_units)
            .max(min_step);
        let step_px = (self.step_px * factor).clamp(min_step, max_step);
        if step_px == self.step_px {
            return false;
        }

        let anchor = coords::position_at(anchor_x, self.step_px, self.offset_px()) as f32;
        self.step_px = step_px;
        self.apply_shift(-(anchor * step_px - anchor_x));
        self.prev_shift = self.shift;

        true
    }

    /// Sample indices that intersect the viewport, with one sample of bleed
    /// on each side so lines reach the plot edges.
    pub fn visible_range(&self) -> Option<RangeInclusive<usize>> {
        if self.data_len == 0 || self.step_px <= 0.0 || self.width_px <= 0.0 {
            return None;
        }

        let offset = self.offset_px();
        let last_index = self.data_len - 1;

        let first = ((offset / self.step_px).floor() as usize)
            .saturating_sub(1)
            .min(last_index);
        let last = (((offset + self.width_px) / self.step_px).ceil() as usize + 1).min(last_index);

        Some(first..=last)
    }

    /// A drag in flight is persisted at its last committed offset.
    pub fn to_state(&self) -> Viewport {
        Viewport {
            offset_px: if self.prev_shift == 0.0 {
                0.0
            } else {
                -self.prev_shift
            },
            ..self.viewport()
        }
    }

    pub fn from_state(&mut self, state: Viewport) {
        if state.width_px > 0.0 {
            self.width_px = state.width_px;
        }
        if state.step_px > 0.0 {
            self.step_px = state.step_px;
        }
        self.drag_start_x = None;
        self.shift = -state.offset_px.max(0.0);
        self.reclamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(len: usize, step: f32, width: f32) -> ViewportController {
        let mut vc = ViewportController::new(step, 0.0, 64.0);
        vc.set_data_len(len);
        vc.resize(width);
        vc
    }

    fn assert_within_content(vc: &ViewportController) {
        let vp = vc.viewport();
        assert!(vp.offset_px >= 0.0);
        assert!(
            vp.offset_px + vp.width_px <= vc.content_width() + 1e-3,
            "{vp:?} exceeds {}",
            vc.content_width()
        );
    }

    #[test]
    fn drag_clamps_at_both_ends() {
        let mut vc = controller(100, 10.0, 300.0);

        vc.begin_drag(100.0);
        // dragging right at the start cannot move past the first sample
        assert_eq!(vc.drag_to(250.0), None);
        assert_eq!(vc.offset_px(), 0.0);

        // dragging left scrolls forward, capped at the last sample
        assert_eq!(vc.drag_to(-5000.0), Some(ViewportEvent::Seeking(700.0)));
        assert_within_content(&vc);
        assert_eq!(vc.end_drag(), Some(ViewportEvent::Seek(700.0)));
    }

    #[test]
    fn drag_accumulates_from_committed_shift() {
        let mut vc = controller(100, 10.0, 300.0);

        vc.begin_drag(200.0);
        vc.drag_to(150.0);
        vc.end_drag();
        assert_eq!(vc.offset_px(), 50.0);

        vc.begin_drag(10.0);
        assert_eq!(vc.drag_to(0.0), Some(ViewportEvent::Seeking(60.0)));
        assert_eq!(vc.drag_to(30.0), Some(ViewportEvent::Seeking(30.0)));
        assert_eq!(vc.end_drag(), Some(ViewportEvent::Seek(30.0)));
    }

    #[test]
    fn unchanged_shift_is_suppressed() {
        let mut vc = controller(100, 10.0, 300.0);

        vc.begin_drag(0.0);
        assert_eq!(vc.drag_to(0.0), None);
        assert_eq!(vc.end_drag(), None);

        assert_eq!(vc.seek_px(0.0), None);
        assert_eq!(vc.seek_px(-20.0), None);
        assert_eq!(vc.seek_px(120.0), Some(ViewportEvent::Seeking(120.0)));
        assert_eq!(vc.seek_px(120.0), None);
    }

    #[test]
    fn seek_uses_the_same_clamp() {
        let mut vc = controller(100, 10.0, 300.0);
        assert_eq!(vc.seek_px(10_000.0), Some(ViewportEvent::Seeking(700.0)));
        assert_within_content(&vc);
    }

    #[test]
    fn narrow_content_pins_to_start() {
        let mut vc = controller(10, 10.0, 300.0);
        assert_eq!(vc.seek_px(50.0), None);
        assert_eq!(vc.offset_px(), 0.0);
    }

    #[test]
    fn show_range_sets_step_and_offset() {
        let mut vc = controller(100, 10.0, 300.0);
        assert!(vc.show_range(40.0, 20.0));

        let vp = vc.viewport();
        assert_eq!(vp.step_px, 15.0);
        assert_eq!(vp.offset_px, 600.0);
        assert_eq!(vp.offset_units(), 40.0);
        assert_eq!(vp.width_units(), 20.0);
        assert_within_content(&vc);

        assert!(!vc.show_range(40.0, 20.0));
    }

    #[test]
    fn zoom_keeps_anchor_in_place() {
        let mut vc = controller(100, 10.0, 300.0);
        vc.seek_px(200.0);

        let before = coords::position_at(150.0, vc.viewport().step_px, vc.offset_px());
        assert!(vc.zoom_by(1.5, 150.0, 0.0));
        let after = coords::position_at(150.0, vc.viewport().step_px, vc.offset_px());

        assert!((before - after).abs() < 1e-3);
        assert_within_content(&vc);
    }

    #[test]
    fn zoom_is_bounded() {
        let mut vc = controller(100, 10.0, 300.0);

        assert!(vc.zoom_by(0.01, 0.0, 0.0));
        assert_eq!(vc.viewport().step_px, 3.0);
        assert!(!vc.zoom_by(0.5, 0.0, 0.0));

        assert!(vc.zoom_by(1000.0, 0.0, 0.0));
        assert_eq!(vc.viewport().step_px, 64.0);
        assert_within_content(&vc);
    }

    #[test]
    fn zoom_stops_at_minimum_width() {
        let mut vc = controller(100, 10.0, 300.0);

        assert!(vc.zoom_by(1000.0, 150.0, 12.0));
        assert_eq!(vc.viewport().step_px, 25.0);
        assert_eq!(vc.viewport().width_units(), 12.0);
        assert!(!vc.zoom_by(2.0, 150.0, 12.0));
        assert_within_content(&vc);
    }

    #[test]
    fn invariant_holds_across_mixed_mutations() {
        let mut vc = controller(57, 7.0, 230.0);
        let moves = [-40.0, 900.0, -3000.0, 12.0, 77.0];

        for (i, dx) in moves.iter().enumerate() {
            vc.begin_drag(0.0);
            vc.drag_to(*dx);
            vc.end_drag();
            assert_within_content(&vc);

            vc.zoom_by(if i % 2 == 0 { 1.3 } else { 0.6 }, 100.0, 0.0);
            assert_within_content(&vc);

            vc.seek_px(*dx * 2.0);
            assert_within_content(&vc);
        }
    }

    #[test]
    fn visible_range_bleeds_one_sample() {
        let mut vc = controller(100, 10.0, 300.0);
        vc.seek_px(105.0);
        assert_eq!(vc.visible_range(), Some(9..=42));

        vc.seek_px(10_000.0);
        assert_eq!(vc.visible_range(), Some(69..=99));

        let empty = controller(0, 10.0, 300.0);
        assert_eq!(empty.visible_range(), None);
    }

    #[test]
    fn state_round_trip() {
        let mut vc = controller(100, 10.0, 300.0);
        vc.show_range(12.0, 30.0);
        let saved = vc.to_state();

        let mut restored = controller(100, 10.0, 300.0);
        restored.from_state(saved);
        assert_eq!(restored.to_state(), saved);
    }
}
