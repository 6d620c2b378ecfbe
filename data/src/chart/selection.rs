use iced_core::{Color, Point, Rectangle, Size};
use serde::{Deserialize, Serialize};

use super::viewport::Viewport;
use super::visibility::VisibilityStore;
use super::{Dataset, DateFormatter, FontSpec, TextMeasurer, coords};
use crate::util::format_value;

/// The scrubber position, relative to the plot's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub pixel_x: f32,
    pub data_index: Option<usize>,
}

impl Selection {
    pub fn at(pixel_x: f32, viewport: &Viewport, data_len: usize) -> Self {
        Self {
            pixel_x,
            data_index: index_under(pixel_x, viewport, data_len),
        }
    }

    pub fn is_active(&self) -> bool {
        self.data_index.is_some()
    }

    /// Re-resolves the data index after the viewport moved under the
    /// scrubber. Returns whether the index changed.
    pub fn refresh(&mut self, viewport: &Viewport, data_len: usize) -> bool {
        if self.data_index.is_none() {
            return false;
        }
        let index = index_under(self.pixel_x, viewport, data_len);
        let changed = index != self.data_index;
        self.data_index = index;
        changed
    }
}

fn index_under(pixel_x: f32, viewport: &Viewport, data_len: usize) -> Option<usize> {
    if data_len == 0 || viewport.step_px <= 0.0 {
        return None;
    }
    let position = coords::position_at(pixel_x, viewport.step_px, viewport.offset_px);
    Some((position.floor().max(0.0) as usize).min(data_len - 1))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedValue {
    pub series: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    /// Left bracketing sample, at most `len - 2`.
    pub index: usize,
    /// Fractional sample position under the scrubber.
    pub position: f64,
    pub timestamp: i64,
    pub values: Vec<SelectedValue>,
}

/// Linear interpolation between `index` and `index + 1` at `position`.
///
/// Falls back to the raw edge value when `position` lies outside the data.
fn sample_at(values: &[i64], index: usize, position: f64) -> f64 {
    let Some(last) = values.len().checked_sub(1) else {
        return 0.0;
    };
    if last == 0 || position >= last as f64 {
        return values[last] as f64;
    }
    if position <= 0.0 {
        return values[0] as f64;
    }

    let (x1, x2) = (index as f64, (index + 1) as f64);
    let (y1, y2) = (values[index] as f64, values[index + 1] as f64);

    (position - x2) * (y2 - y1) / (x2 - x1) + y2
}

pub fn interpolate(
    pixel_x: f32,
    viewport: &Viewport,
    dataset: &Dataset,
    visibility: &VisibilityStore,
) -> Option<Interpolation> {
    let len = dataset.len();
    if len == 0 || viewport.step_px <= 0.0 {
        return None;
    }

    let position = coords::position_at(pixel_x, viewport.step_px, viewport.offset_px);
    let index = (position.floor().max(0.0) as usize).min(len.saturating_sub(2));

    let values = visibility
        .visible_indices()
        .filter_map(|i| {
            dataset.series_at(i).map(|s| SelectedValue {
                series: i,
                value: sample_at(&s.values, index, position),
            })
        })
        .collect();

    Some(Interpolation {
        index,
        position,
        timestamp: sample_at(dataset.timestamps(), index, position).round() as i64,
        values,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelMetrics {
    pub margin_px: f32,
    pub padding_px: f32,
    pub item_spacing_px: f32,
    pub line_gap_px: f32,
    pub date_font: FontSpec,
    pub value_font: FontSpec,
    pub name_font: FontSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelText {
    pub content: String,
    pub bounds: Rectangle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelItem {
    pub series: usize,
    pub color: Color,
    pub value: PanelText,
    pub name: PanelText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub bounds: Rectangle,
    pub date: PanelText,
    pub items: Vec<PanelItem>,
}

/// Sizes the info panel from measured text and places it right of the
/// scrubber, shifted back inside `plot` when it would cross an edge.
pub fn layout_panel(
    interpolation: &Interpolation,
    dataset: &Dataset,
    pixel_x: f32,
    plot: Rectangle,
    metrics: &PanelMetrics,
    measurer: &dyn TextMeasurer,
    formatter: &dyn DateFormatter,
) -> PanelLayout {
    let padding = metrics.padding_px;

    let date = formatter.format(interpolation.timestamp);
    let date_size = measurer.measure(&date, metrics.date_font);

    struct Measured {
        series: usize,
        color: Color,
        value: (String, Size),
        name: (String, Size),
    }

    let measured: Vec<Measured> = interpolation
        .values
        .iter()
        .filter_map(|selected| {
            let series = dataset.series_at(selected.series)?;
            let value = format_value(selected.value);
            let value_size = measurer.measure(&value, metrics.value_font);
            let name_size = measurer.measure(&series.name, metrics.name_font);
            Some(Measured {
                series: selected.series,
                color: series.color,
                value: (value, value_size),
                name: (series.name.clone(), name_size),
            })
        })
        .collect();

    let (width, height) = if measured.is_empty() {
        (date_size.width + padding, date_size.height + padding * 2.0)
    } else {
        let items_w: f32 = measured
            .iter()
            .map(|m| m.value.1.width.max(m.name.1.width) + metrics.item_spacing_px)
            .sum();
        let value_h = measured.iter().map(|m| m.value.1.height).fold(0.0, f32::max);
        let name_h = measured.iter().map(|m| m.name.1.height).fold(0.0, f32::max);

        (
            date_size.width.max(items_w) + padding * 2.0,
            date_size.height + metrics.line_gap_px + value_h + name_h + padding * 2.0,
        )
    };

    let mut left = plot.x + pixel_x + metrics.margin_px;
    let overflow_right = left + width - (plot.x + plot.width);
    if overflow_right > 0.0 {
        left -= overflow_right;
    }
    if left < plot.x {
        left = plot.x;
    }
    let top = plot.y + metrics.margin_px;

    let date = PanelText {
        content: date,
        bounds: Rectangle::new(Point::new(left + padding, top + padding), date_size),
    };

    let items_top = top + padding + date_size.height + metrics.line_gap_px;
    let value_h = measured.iter().map(|m| m.value.1.height).fold(0.0, f32::max);

    let mut x = left + padding;
    let items = measured
        .into_iter()
        .map(|m| {
            let item_w = m.value.1.width.max(m.name.1.width);
            let item = PanelItem {
                series: m.series,
                color: m.color,
                value: PanelText {
                    content: m.value.0,
                    bounds: Rectangle::new(Point::new(x, items_top), m.value.1),
                },
                name: PanelText {
                    content: m.name.0,
                    bounds: Rectangle::new(Point::new(x, items_top + value_h), m.name.1),
                },
            };
            x += item_w + metrics.item_spacing_px;
            item
        })
        .collect();

    PanelLayout {
        bounds: Rectangle::new(Point::new(left, top), Size::new(width, height)),
        date,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures::{self, DAY_MS, FixedMeasurer, IndexFormatter};

    fn viewport(offset: f32, step: f32) -> Viewport {
        Viewport {
            offset_px: offset,
            width_px: 300.0,
            step_px: step,
        }
    }

    fn metrics() -> PanelMetrics {
        PanelMetrics {
            margin_px: 10.0,
            padding_px: 5.0,
            item_spacing_px: 8.0,
            line_gap_px: 4.0,
            date_font: FontSpec::bold(10.0),
            value_font: FontSpec::bold(12.0),
            name_font: FontSpec::regular(10.0),
        }
    }

    #[test]
    fn exact_on_sample_boundaries() {
        let ds = fixtures::dataset(&[("a", vec![3, 17, 8, 40, 22]), ("b", vec![1, 1, 9, 2, 5])]);
        let vis = VisibilityStore::new(&ds);
        let vp = viewport(20.0, 10.0);

        for i in 0..ds.len() {
            let x = coords::x_for_index(i, 10.0, 20.0);
            let interp = interpolate(x, &vp, &ds, &vis).unwrap();
            for selected in &interp.values {
                assert_eq!(
                    Some(selected.value),
                    ds.series()[selected.series].value(i),
                    "series {} at {i}",
                    selected.series
                );
            }
            assert_eq!(interp.timestamp, i as i64 * DAY_MS);
        }
    }

    #[test]
    fn interpolates_between_samples() {
        let ds = fixtures::dataset(&[("a", vec![10, 30, 0])]);
        let vis = VisibilityStore::new(&ds);
        let vp = viewport(0.0, 10.0);

        let interp = interpolate(2.5, &vp, &ds, &vis).unwrap();
        assert_eq!(interp.index, 0);
        assert_eq!(interp.values[0].value, 15.0);

        let interp = interpolate(17.5, &vp, &ds, &vis).unwrap();
        assert_eq!(interp.index, 1);
        assert_eq!(interp.values[0].value, 7.5);
    }

    #[test]
    fn clamps_past_either_end() {
        let ds = fixtures::dataset(&[("a", vec![10, 30, 50])]);
        let vis = VisibilityStore::new(&ds);
        let vp = viewport(0.0, 10.0);

        let past_end = interpolate(95.0, &vp, &ds, &vis).unwrap();
        assert_eq!(past_end.index, 1);
        assert_eq!(past_end.values[0].value, 50.0);

        let before_start = interpolate(-30.0, &vp, &ds, &vis).unwrap();
        assert_eq!(before_start.index, 0);
        assert_eq!(before_start.values[0].value, 10.0);
    }

    #[test]
    fn single_sample_uses_raw_value() {
        let ds = fixtures::dataset(&[("a", vec![42])]);
        let vis = VisibilityStore::new(&ds);
        let interp = interpolate(33.0, &viewport(0.0, 10.0), &ds, &vis).unwrap();
        assert_eq!(interp.index, 0);
        assert_eq!(interp.values[0].value, 42.0);
    }

    #[test]
    fn hidden_series_are_skipped() {
        let ds = fixtures::ramp(4);
        let mut vis = VisibilityStore::new(&ds);
        vis.set_visible(0, false);

        let interp = interpolate(10.0, &viewport(0.0, 10.0), &ds, &vis).unwrap();
        assert_eq!(interp.values.len(), 1);
        assert_eq!(interp.values[0].series, 1);
    }

    #[test]
    fn selection_index_stays_in_range() {
        let vp = viewport(0.0, 10.0);
        assert_eq!(Selection::at(5000.0, &vp, 20).data_index, Some(19));
        assert_eq!(Selection::at(-50.0, &vp, 20).data_index, Some(0));
        assert_eq!(Selection::at(35.0, &vp, 20).data_index, Some(3));
        assert_eq!(Selection::at(35.0, &vp, 0).data_index, None);

        let mut selection = Selection::at(35.0, &vp, 20);
        assert!(selection.refresh(&viewport(50.0, 10.0), 20));
        assert_eq!(selection.data_index, Some(8));
    }

    #[test]
    fn panel_sits_right_of_scrubber() {
        let ds = fixtures::dataset(&[("aa", vec![100, 200]), ("bbbb", vec![5, 7])]);
        let vis = VisibilityStore::new(&ds);
        let plot = Rectangle::new(Point::ORIGIN, Size::new(300.0, 200.0));
        let interp = interpolate(0.0, &viewport(0.0, 10.0), &ds, &vis).unwrap();

        let panel = layout_panel(
            &interp,
            &ds,
            0.0,
            plot,
            &metrics(),
            &FixedMeasurer,
            &IndexFormatter,
        );

        // "100" at 12px -> 18 wide, "aa" at 10px -> 10 wide; "5" -> 6, "bbbb" -> 20
        assert_eq!(panel.bounds.x, 10.0);
        assert_eq!(panel.bounds.width, (18.0 + 8.0) + (20.0 + 8.0) + 10.0);
        assert_eq!(panel.bounds.height, 10.0 + 4.0 + 12.0 + 10.0 + 10.0);
        assert_eq!(panel.items.len(), 2);
        assert_eq!(panel.items[1].value.bounds.x, 10.0 + 5.0 + 18.0 + 8.0);
        assert_eq!(panel.date.content, "d0");
    }

    #[test]
    fn panel_shifts_inside_right_edge() {
        let ds = fixtures::ramp(30);
        let vis = VisibilityStore::new(&ds);
        let plot = Rectangle::new(Point::new(20.0, 0.0), Size::new(300.0, 200.0));
        let interp = interpolate(295.0, &viewport(0.0, 10.0), &ds, &vis).unwrap();

        let panel = layout_panel(
            &interp,
            &ds,
            295.0,
            plot,
            &metrics(),
            &FixedMeasurer,
            &IndexFormatter,
        );

        assert_eq!(panel.bounds.x + panel.bounds.width, plot.x + plot.width);
    }

    #[test]
    fn panel_without_series_fits_the_date() {
        let ds = fixtures::ramp(30);
        let mut vis = VisibilityStore::new(&ds);
        vis.set_visible(0, false);
        vis.set_visible(1, false);
        let plot = Rectangle::new(Point::ORIGIN, Size::new(300.0, 200.0));
        let interp = interpolate(100.0, &viewport(0.0, 10.0), &ds, &vis).unwrap();

        let panel = layout_panel(
            &interp,
            &ds,
            100.0,
            plot,
            &metrics(),
            &FixedMeasurer,
            &IndexFormatter,
        );

        // "d10" in a 10px font
        assert_eq!(panel.bounds.width, 15.0 + 5.0);
        assert!(panel.items.is_empty());
    }
}
