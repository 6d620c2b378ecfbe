//! Minimap range selector.
//!
//! The selector is a draggable window over a track spanning the whole
//! dataset. The track is inset by a cap margin on both sides where the
//! window's grab handles are drawn.

use serde::{Deserialize, Serialize};

use super::coords;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorRegion {
    #[default]
    Unselected,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMetrics {
    /// Width of each handle cap, also the inset of the track.
    pub cap_px: f32,
    pub smallest_width_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayWindow {
    pub scroll_px: f32,
    pub width_px: f32,
}

/// A window expressed in samples, sent to the main chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCommand {
    pub offset: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    region: CursorRegion,
    start_x: f32,
    start: OverlayWindow,
}

#[derive(Debug, Clone)]
pub struct OverlaySelector {
    metrics: OverlayMetrics,
    total_width: f32,
    data_len: usize,
    step_px: f32,
    window: OverlayWindow,
    pending: Option<ViewportCommand>,
    drag: Option<Drag>,
    last_emitted: Option<ViewportCommand>,
}

impl OverlaySelector {
    pub fn new(metrics: OverlayMetrics) -> Self {
        Self {
            metrics,
            total_width: 0.0,
            data_len: 0,
            step_px: 0.0,
            window: OverlayWindow {
                scroll_px: metrics.cap_px,
                width_px: 0.0,
            },
            pending: None,
            drag: None,
            last_emitted: None,
        }
    }

    pub fn window(&self) -> OverlayWindow {
        self.window
    }

    pub fn step_px(&self) -> f32 {
        self.step_px
    }

    pub fn total_width(&self) -> f32 {
        self.total_width
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Samples covered by the narrowest window the track allows.
    pub fn min_width_units(&self) -> f32 {
        if !self.is_laid_out() {
            return 0.0;
        }
        self.metrics.smallest_width_px.min(self.track_width()) / self.step_px
    }

    fn track_width(&self) -> f32 {
        (self.total_width - 2.0 * self.metrics.cap_px).max(0.0)
    }

    fn is_laid_out(&self) -> bool {
        self.step_px > 0.0
    }

    /// Starts over on a new dataset, showing its trailing `fraction`.
    pub fn set_data_len(&mut self, data_len: usize, fraction: f32) -> Option<ViewportCommand> {
        self.data_len = data_len;
        self.drag = None;
        self.last_emitted = None;
        self.step_px = coords::step_for_width(self.track_width(), data_len);

        let len = data_len as f32;
        let fraction = fraction.clamp(0.0, 1.0);
        let units = ViewportCommand {
            offset: len * (1.0 - fraction),
            width: len * fraction,
        };

        if self.is_laid_out() {
            self.window = self.window_for(units);
            self.emit()
        } else {
            self.pending = Some(units);
            None
        }
    }

    /// Recomputes the step for a new width and re-emits the window, which
    /// keeps covering the same samples.
    pub fn resize(&mut self, total_width: f32) -> Option<ViewportCommand> {
        if total_width <= 0.0 {
            return None;
        }

        let units = self
            .pending
            .take()
            .or_else(|| self.is_laid_out().then(|| self.command()));

        self.total_width = total_width;
        self.step_px = coords::step_for_width(self.track_width(), self.data_len);
        self.drag = None;

        if !self.is_laid_out() {
            self.pending = units;
            return None;
        }

        self.window = match units {
            Some(units) => self.window_for(units),
            None => self.clamp_window(self.window),
        };

        let command = self.command();
        self.last_emitted = Some(command);
        Some(command)
    }

    /// Moves the window to follow the main chart without emitting.
    pub fn sync_units(&mut self, offset: f32, width: f32) {
        let units = ViewportCommand { offset, width };

        if self.is_laid_out() {
            if self.drag.is_none() {
                self.window = self.window_for(units);
                self.last_emitted = Some(self.command());
            }
        } else {
            self.pending = Some(units);
        }
    }

    pub fn hit_test(&self, x: f32) -> CursorRegion {
        let half = self.metrics.cap_px / 2.0;
        let OverlayWindow {
            scroll_px: scroll,
            width_px: width,
        } = self.window;

        if x > scroll + half && x < scroll + width - half {
            CursorRegion::Center
        } else if x < scroll + half {
            CursorRegion::Left
        } else if x > scroll + width - half {
            CursorRegion::Right
        } else {
            CursorRegion::Unselected
        }
    }

    pub fn press(&mut self, x: f32) -> CursorRegion {
        if !self.is_laid_out() {
            return CursorRegion::Unselected;
        }

        let region = self.hit_test(x);
        self.drag = (region != CursorRegion::Unselected).then_some(Drag {
            region,
            start_x: x,
            start: self.window,
        });
        region
    }

    pub fn drag_to(&mut self, x: f32) -> Option<ViewportCommand> {
        let drag = self.drag?;
        let dx = x - drag.start_x;

        let next = match drag.region {
            CursorRegion::Center => OverlayWindow {
                scroll_px: drag.start.scroll_px + dx,
                width_px: drag.start.width_px,
            },
            CursorRegion::Left => self.drag_left_edge(drag.start, dx),
            CursorRegion::Right => self.drag_right_edge(drag.start, dx),
            CursorRegion::Unselected => return None,
        };

        self.window = self.clamp_window(next);
        self.emit()
    }

    pub fn release(&mut self) -> bool {
        self.drag.take().is_some()
    }

    fn drag_left_edge(&self, start: OverlayWindow, dx: f32) -> OverlayWindow {
        let cap = self.metrics.cap_px;
        let right = start.scroll_px + start.width_px;

        let mut scroll = start.scroll_px + dx;
        let mut width = right - scroll;

        if width < self.metrics.smallest_width_px {
            width = self.metrics.smallest_width_px;
            scroll = right - width;
        }
        if scroll < cap {
            scroll = cap;
            width = right - cap;
        }
        if width > self.track_width() {
            width = self.track_width();
            scroll = start.scroll_px;
        }

        OverlayWindow {
            scroll_px: scroll,
            width_px: width,
        }
    }

    fn drag_right_edge(&self, start: OverlayWindow, dx: f32) -> OverlayWindow {
        let max_width = self.metrics.cap_px + self.track_width() - start.scroll_px;

        OverlayWindow {
            scroll_px: start.scroll_px,
            width_px: (start.width_px + dx)
                .max(self.metrics.smallest_width_px)
                .min(max_width),
        }
    }

    fn clamp_window(&self, window: OverlayWindow) -> OverlayWindow {
        let cap = self.metrics.cap_px;
        let track = self.track_width();

        let width = window
            .width_px
            .max(self.metrics.smallest_width_px.min(track))
            .min(track);
        let scroll = window.scroll_px.clamp(cap, cap + track - width);

        OverlayWindow {
            scroll_px: scroll,
            width_px: width,
        }
    }

    fn window_for(&self, units: ViewportCommand) -> OverlayWindow {
        self.clamp_window(OverlayWindow {
            scroll_px: self.metrics.cap_px + units.offset * self.step_px,
            width_px: units.width * self.step_px,
        })
    }

    pub fn command(&self) -> ViewportCommand {
        if !self.is_laid_out() {
            return ViewportCommand {
                offset: 0.0,
                width: 0.0,
            };
        }
        ViewportCommand {
            offset: (self.window.scroll_px - self.metrics.cap_px) / self.step_px,
            width: self.window.width_px / self.step_px,
        }
    }

    fn emit(&mut self) -> Option<ViewportCommand> {
        if !self.is_laid_out() {
            return None;
        }
        let command = self.command();
        if self.last_emitted == Some(command) {
            return None;
        }
        self.last_emitted = Some(command);
        Some(command)
    }

    /// X ranges left and right of the window (caps excluded) that are
    /// masked on the minimap.
    pub fn masks(&self) -> [(f32, f32); 2] {
        let cap = self.metrics.cap_px;
        let OverlayWindow {
            scroll_px,
            width_px,
        } = self.window;

        [
            (0.0, (scroll_px - cap).max(0.0)),
            ((scroll_px + width_px + cap).min(self.total_width), self.total_width),
        ]
    }

    pub fn to_state(&self) -> OverlayWindow {
        self.window
    }

    pub fn from_state(&mut self, window: OverlayWindow) {
        self.drag = None;
        self.pending = None;
        self.last_emitted = None;
        self.window = if self.is_laid_out() {
            self.clamp_window(window)
        } else {
            window
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(cap: f32, smallest: f32, width: f32, len: usize) -> OverlaySelector {
        let mut sel = OverlaySelector::new(OverlayMetrics {
            cap_px: cap,
            smallest_width_px: smallest,
        });
        sel.set_data_len(len, 0.25);
        sel.resize(width);
        sel
    }

    fn assert_in_track(sel: &OverlaySelector, cap: f32, smallest: f32) {
        let w = sel.window();
        assert!(w.width_px >= smallest - 1e-3, "{w:?} below floor");
        assert!(w.scroll_px >= cap - 1e-3, "{w:?} left of track");
        assert!(
            w.scroll_px + w.width_px <= sel.total_width() - cap + 1e-3,
            "{w:?} right of track"
        );
    }

    #[test]
    fn initial_window_covers_trailing_fraction() {
        let sel = selector(10.0, 20.0, 220.0, 100);
        assert_eq!(sel.step_px(), 2.0);
        assert_eq!(
            sel.window(),
            OverlayWindow {
                scroll_px: 160.0,
                width_px: 50.0
            }
        );
        assert_eq!(
            sel.command(),
            ViewportCommand {
                offset: 75.0,
                width: 25.0
            }
        );
    }

    #[test]
    fn hit_regions() {
        let mut sel = selector(10.0, 20.0, 220.0, 100);
        sel.from_state(OverlayWindow {
            scroll_px: 60.0,
            width_px: 80.0,
        });

        assert_eq!(sel.hit_test(100.0), CursorRegion::Center);
        assert_eq!(sel.hit_test(62.0), CursorRegion::Left);
        assert_eq!(sel.hit_test(5.0), CursorRegion::Left);
        assert_eq!(sel.hit_test(138.0), CursorRegion::Right);
        assert_eq!(sel.hit_test(65.0), CursorRegion::Unselected);
        assert_eq!(sel.hit_test(135.0), CursorRegion::Unselected);
    }

    #[test]
    fn center_drag_clamps_to_right_edge() {
        // 100 samples over a 300px track, no caps.
        let mut sel = selector(0.0, 30.0, 300.0, 100);
        sel.from_state(OverlayWindow {
            scroll_px: 0.0,
            width_px: 60.0,
        });

        assert_eq!(sel.press(30.0), CursorRegion::Center);
        sel.drag_to(430.0);
        assert_eq!(sel.window().scroll_px, 300.0 - 60.0);
        assert_eq!(sel.window().width_px, 60.0);
    }

    #[test]
    fn left_handle_respects_floor_and_track() {
        let (cap, smallest) = (8.0, 24.0);
        let mut sel = selector(cap, smallest, 316.0, 150);
        sel.from_state(OverlayWindow {
            scroll_px: 100.0,
            width_px: 90.0,
        });

        for dx in [40.0, 75.0, 300.0, -30.0, -500.0, 10.0, 66.0, -1000.0] {
            sel.press(100.0);
            assert!(sel.is_dragging());
            sel.drag_to(100.0 + dx);
            assert_in_track(&sel, cap, smallest);
            sel.release();
            sel.from_state(OverlayWindow {
                scroll_px: 100.0,
                width_px: 90.0,
            });
        }

        // squeezing past the floor pins the width and keeps the right edge
        sel.press(100.0);
        sel.drag_to(1000.0);
        assert_eq!(sel.window().width_px, smallest);
        assert_eq!(sel.window().scroll_px, 190.0 - smallest);

        // dragging far left stops at the track start, right edge fixed
        sel.drag_to(-1000.0);
        assert_eq!(sel.window().scroll_px, cap);
        assert_eq!(sel.window().width_px, 190.0 - cap);
    }

    #[test]
    fn right_handle_resizes_only() {
        let (cap, smallest) = (8.0, 24.0);
        let mut sel = selector(cap, smallest, 316.0, 150);
        sel.from_state(OverlayWindow {
            scroll_px: 100.0,
            width_px: 90.0,
        });

        assert_eq!(sel.press(190.0), CursorRegion::Right);
        sel.drag_to(1000.0);
        assert_eq!(sel.window().scroll_px, 100.0);
        assert_eq!(sel.window().width_px, 316.0 - cap - 100.0);

        sel.drag_to(-1000.0);
        assert_eq!(sel.window().width_px, smallest);
        assert_in_track(&sel, cap, smallest);
    }

    #[test]
    fn emission_is_deduplicated() {
        let mut sel = selector(0.0, 30.0, 300.0, 100);
        sel.from_state(OverlayWindow {
            scroll_px: 0.0,
            width_px: 60.0,
        });

        sel.press(30.0);
        let first = sel.drag_to(60.0);
        assert_eq!(
            first,
            Some(ViewportCommand {
                offset: 10.0,
                width: 20.0
            })
        );
        assert_eq!(sel.drag_to(60.0), None);

        // clamped at the edge: repeated overshoot yields nothing new
        assert!(sel.drag_to(1000.0).is_some());
        assert_eq!(sel.drag_to(2000.0), None);
    }

    #[test]
    fn resize_keeps_the_sample_window() {
        let mut sel = selector(10.0, 20.0, 220.0, 100);
        let before = sel.command();

        let after = sel.resize(420.0).expect("resize always re-emits");
        assert_eq!(after, before);
        assert_eq!(sel.step_px(), 4.0);
        assert_eq!(sel.window().scroll_px, 10.0 + 75.0 * 4.0);
    }

    #[test]
    fn pending_window_applies_on_first_layout() {
        let mut sel = OverlaySelector::new(OverlayMetrics {
            cap_px: 0.0,
            smallest_width_px: 10.0,
        });
        assert_eq!(sel.set_data_len(50, 0.5), None);
        sel.sync_units(5.0, 10.0);

        let command = sel.resize(100.0).expect("first layout emits");
        assert_eq!(
            command,
            ViewportCommand {
                offset: 5.0,
                width: 10.0
            }
        );
    }

    #[test]
    fn masks_exclude_caps() {
        let mut sel = selector(10.0, 20.0, 220.0, 100);
        sel.from_state(OverlayWindow {
            scroll_px: 60.0,
            width_px: 80.0,
        });
        assert_eq!(sel.masks(), [(0.0, 50.0), (150.0, 220.0)]);
    }

    #[test]
    fn unselected_press_does_not_drag() {
        let mut sel = selector(10.0, 20.0, 220.0, 100);
        sel.from_state(OverlayWindow {
            scroll_px: 60.0,
            width_px: 80.0,
        });
        assert_eq!(sel.press(65.0), CursorRegion::Unselected);
        assert_eq!(sel.drag_to(120.0), None);
    }
}
