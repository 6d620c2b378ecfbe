pub mod state;
pub mod theme;
pub mod timezone;

use serde::{Deserialize, Serialize};

use crate::chart::FontSpec;
use crate::chart::overlay::OverlayMetrics;
use crate::chart::selection::PanelMetrics;

const MIN_SCALE: f32 = 0.5;
const MAX_SCALE: f32 = 4.0;

/// Converts density-independent units to physical pixels.
pub trait DensityConverter {
    fn dp_to_px(&self, dp: f32) -> f32;
}

/// Display density, clamped to a sane range on construction and on load.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct ScaleFactor(f32);

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f32> for ScaleFactor {
    fn from(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(MIN_SCALE, MAX_SCALE))
        } else {
            Self::default()
        }
    }
}

impl From<ScaleFactor> for f32 {
    fn from(value: ScaleFactor) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for ScaleFactor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Ok(Self::from(value))
    }
}

impl DensityConverter for ScaleFactor {
    fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.0
    }
}

/// Chart dimensions in dp, plus the unitless tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub side_padding: f32,
    pub plot_height: f32,
    pub plot_top_padding: f32,
    pub axis_height: f32,
    pub minimap_height: f32,
    pub minimap_spacing: f32,
    pub minimap_cap: f32,
    pub minimap_frame: f32,
    pub minimap_smallest_window: f32,
    pub line_width: f32,
    pub minimap_line_width: f32,
    pub grid_line_width: f32,
    pub scrubber_width: f32,
    pub highlight_radius: f32,
    pub text_size: f32,
    /// Free space kept between neighbouring date labels.
    pub label_gap: f32,
    pub end_padding: f32,
    pub max_step: f32,
    pub panel_margin: f32,
    pub panel_padding: f32,
    pub panel_item_spacing: f32,
    pub panel_line_gap: f32,
    pub panel_radius: f32,
    pub panel_date_size: f32,
    pub panel_value_size: f32,
    pub panel_name_size: f32,
    pub grid_lines: usize,
    /// Draw every n-th sample of a series polyline.
    pub decimation: usize,
    /// Share of the dataset shown on first layout, from the end.
    pub initial_window: f32,
    pub zoom_step: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            side_padding: 16.0,
            plot_height: 320.0,
            plot_top_padding: 20.0,
            axis_height: 24.0,
            minimap_height: 48.0,
            minimap_spacing: 12.0,
            minimap_cap: 8.0,
            minimap_frame: 2.0,
            minimap_smallest_window: 40.0,
            line_width: 2.0,
            minimap_line_width: 1.0,
            grid_line_width: 1.0,
            scrubber_width: 1.0,
            highlight_radius: 4.0,
            text_size: 11.0,
            label_gap: 16.0,
            end_padding: 16.0,
            max_step: 80.0,
            panel_margin: 12.0,
            panel_padding: 8.0,
            panel_item_spacing: 12.0,
            panel_line_gap: 6.0,
            panel_radius: 6.0,
            panel_date_size: 12.0,
            panel_value_size: 14.0,
            panel_name_size: 11.0,
            grid_lines: 6,
            decimation: 2,
            initial_window: 0.25,
            zoom_step: 1.1,
        }
    }
}

impl ChartConfig {
    pub fn resolve(&self, density: &dyn DensityConverter) -> Metrics {
        let px = |dp: f32| density.dp_to_px(dp);

        Metrics {
            side_padding: px(self.side_padding),
            plot_height: px(self.plot_height),
            plot_top_padding: px(self.plot_top_padding),
            axis_height: px(self.axis_height),
            minimap_height: px(self.minimap_height),
            minimap_spacing: px(self.minimap_spacing),
            minimap_cap: px(self.minimap_cap),
            minimap_frame: px(self.minimap_frame),
            minimap_smallest_window: px(self.minimap_smallest_window),
            line_width: px(self.line_width),
            minimap_line_width: px(self.minimap_line_width),
            grid_line_width: px(self.grid_line_width),
            scrubber_width: px(self.scrubber_width),
            highlight_radius: px(self.highlight_radius),
            text_size: px(self.text_size),
            label_gap: px(self.label_gap),
            end_padding: px(self.end_padding),
            max_step: px(self.max_step),
            panel_margin: px(self.panel_margin),
            panel_padding: px(self.panel_padding),
            panel_item_spacing: px(self.panel_item_spacing),
            panel_line_gap: px(self.panel_line_gap),
            panel_radius: px(self.panel_radius),
            panel_date_size: px(self.panel_date_size),
            panel_value_size: px(self.panel_value_size),
            panel_name_size: px(self.panel_name_size),
            grid_lines: self.grid_lines,
            decimation: self.decimation.max(1),
            initial_window: self.initial_window.clamp(0.0, 1.0),
            zoom_step: if self.zoom_step > 1.0 {
                self.zoom_step
            } else {
                1.1
            },
        }
    }
}

/// [`ChartConfig`] resolved to physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub side_padding: f32,
    pub plot_height: f32,
    pub plot_top_padding: f32,
    pub axis_height: f32,
    pub minimap_height: f32,
    pub minimap_spacing: f32,
    pub minimap_cap: f32,
    pub minimap_frame: f32,
    pub minimap_smallest_window: f32,
    pub line_width: f32,
    pub minimap_line_width: f32,
    pub grid_line_width: f32,
    pub scrubber_width: f32,
    pub highlight_radius: f32,
    pub text_size: f32,
    pub label_gap: f32,
    pub end_padding: f32,
    pub max_step: f32,
    pub panel_margin: f32,
    pub panel_padding: f32,
    pub panel_item_spacing: f32,
    pub panel_line_gap: f32,
    pub panel_radius: f32,
    pub panel_date_size: f32,
    pub panel_value_size: f32,
    pub panel_name_size: f32,
    pub grid_lines: usize,
    pub decimation: usize,
    pub initial_window: f32,
    pub zoom_step: f32,
}

impl Default for Metrics {
    fn default() -> Self {
        ChartConfig::default().resolve(&ScaleFactor::default())
    }
}

impl Metrics {
    /// Total height of plot, date axis, and minimap.
    pub fn total_height(&self) -> f32 {
        self.plot_height + self.axis_height + self.minimap_spacing + self.minimap_height
    }

    pub fn overlay(&self) -> OverlayMetrics {
        OverlayMetrics {
            cap_px: self.minimap_cap,
            smallest_width_px: self.minimap_smallest_window,
        }
    }

    pub fn panel(&self) -> PanelMetrics {
        PanelMetrics {
            margin_px: self.panel_margin,
            padding_px: self.panel_padding,
            item_spacing_px: self.panel_item_spacing,
            line_gap_px: self.panel_line_gap,
            date_font: FontSpec::bold(self.panel_date_size),
            value_font: FontSpec::bold(self.panel_value_size),
            name_font: FontSpec::regular(self.panel_name_size),
        }
    }

    pub fn axis_font(&self) -> FontSpec {
        FontSpec::regular(self.text_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factor_is_clamped() {
        assert_eq!(f32::from(ScaleFactor::from(10.0)), MAX_SCALE);
        assert_eq!(f32::from(ScaleFactor::from(0.1)), MIN_SCALE);
        assert_eq!(ScaleFactor::from(f32::NAN), ScaleFactor::default());

        let parsed: ScaleFactor = serde_json::from_str("12.0").unwrap();
        assert_eq!(f32::from(parsed), MAX_SCALE);
    }

    #[test]
    fn resolve_scales_lengths_only() {
        let config = ChartConfig::default();
        let metrics = config.resolve(&ScaleFactor::from(2.0));

        assert_eq!(metrics.plot_height, config.plot_height * 2.0);
        assert_eq!(metrics.minimap_cap, config.minimap_cap * 2.0);
        assert_eq!(metrics.grid_lines, config.grid_lines);
        assert_eq!(metrics.decimation, config.decimation);
        assert_eq!(metrics.initial_window, config.initial_window);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ChartConfig =
            serde_json::from_str(r#"{"plot_height": 200.0, "decimation": 0}"#).unwrap();
        assert_eq!(config.plot_height, 200.0);
        assert_eq!(config.minimap_height, ChartConfig::default().minimap_height);

        // a zero decimation would never advance
        assert_eq!(config.resolve(&ScaleFactor::default()).decimation, 1);
    }
}
