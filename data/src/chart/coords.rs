//! Data-space <-> screen-space mapping.
//!
//! X positions are measured from the left edge of the plot, Y positions from
//! its top edge. Sample `i` sits at `i * step` in content space; the viewport
//! offset scrolls that content to the left.

use iced_core::Point;

pub fn x_for_index(index: usize, step_px: f32, offset_px: f32) -> f32 {
    index as f32 * step_px - offset_px
}

/// Fractional sample position under a plot-relative `x`.
pub fn position_at(x: f32, step_px: f32, offset_px: f32) -> f64 {
    if step_px <= 0.0 {
        return 0.0;
    }
    f64::from(offset_px + x) / f64::from(step_px)
}

pub fn y_for_value(value: f64, max_value: f64, height_px: f32, top_padding_px: f32) -> f32 {
    if max_value <= 0.0 {
        return 0.0;
    }
    let usable = f64::from(height_px - top_padding_px);
    (usable - value * usable / max_value) as f32
}

pub fn step_for_width(width_px: f32, data_len: usize) -> f32 {
    if data_len == 0 {
        return 0.0;
    }
    width_px / data_len as f32
}

/// `count` grid values, evenly spaced from zero up to (excluding) `max`.
pub fn grid_values(max_value: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|k| max_value * k as f64 / count as f64)
        .collect()
}

/// Per-frame mapping for one plot area.
#[derive(Debug, Clone, Copy)]
pub struct PlotMapper {
    pub origin: Point,
    pub step_px: f32,
    pub offset_px: f32,
    pub height_px: f32,
    pub top_padding_px: f32,
    pub max_value: f64,
}

impl PlotMapper {
    pub fn map_x(&self, index: usize) -> f32 {
        self.origin.x + x_for_index(index, self.step_px, self.offset_px)
    }

    pub fn map_y(&self, value: f64) -> f32 {
        // `y_for_value` measures from the top of the usable band, which
        // starts below the top padding.
        if self.max_value <= 0.0 {
            return self.origin.y + self.height_px;
        }
        self.origin.y
            + self.top_padding_px
            + y_for_value(value, self.max_value, self.height_px, self.top_padding_px)
    }

    pub fn map(&self, index: usize, value: f64) -> Point {
        Point::new(self.map_x(index), self.map_y(value))
    }

    pub fn position_at(&self, x: f32) -> f64 {
        position_at(x - self.origin.x, self.step_px, self.offset_px)
    }
}
