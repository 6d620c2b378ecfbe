//! Turns a [`ChartView`] into a [`Scene`], back to front.

use super::ChartView;
use super::scene::{AlignX, AlignY, Primitive, Scene};

use data::chart::coords::{self, PlotMapper};
use data::chart::selection::{self, Interpolation};
use data::chart::{DateFormatter, TextMeasurer};
use data::config::theme::darken;
use data::util::abbr_large_numbers;
use data::{ColorRole, Metrics, Theme};

use iced::{Point, Rectangle, Size, Vector};

const GRID_LABEL_GAP: f32 = 4.0;
const PANEL_BORDER: f32 = 1.0;

/// Samples drawn out of `first..=last`: multiples of `every`, plus `last`.
///
/// Aligning to multiples keeps the picked samples stable while panning.
pub fn decimated(first: usize, last: usize, every: usize) -> Vec<usize> {
    let every = every.max(1);
    let start = first - first % every;

    let mut indices: Vec<usize> = (start..=last).step_by(every).collect();
    if indices.last() != Some(&last) {
        indices.push(last);
    }
    indices
}

/// Every how many samples a date label `label_px` wide fits.
pub fn label_cadence(label_px: f32, step_px: f32) -> usize {
    if step_px <= 0.0 {
        return 1;
    }
    ((label_px / step_px).ceil() as usize).max(1)
}

/// Cadence of the date axis, sized by the wider of the first and last
/// visible labels plus the configured gap.
pub fn date_label_cadence(
    view: &ChartView,
    measurer: &dyn TextMeasurer,
    formatter: &dyn DateFormatter,
) -> Option<usize> {
    let range = view.visible_range()?;
    let font = view.metrics().axis_font();

    let label_w = [*range.start(), *range.end()]
        .into_iter()
        .filter_map(|i| view.dataset().timestamp(i))
        .map(|ts| measurer.measure(&formatter.format_axis(ts), font).width)
        .fold(0.0, f32::max);

    Some(label_cadence(
        label_w + view.metrics().label_gap,
        view.viewport().step_px,
    ))
}

/// Cuts an x-ascending polyline to `min_x..=max_x`, interpolating the
/// crossing points.
pub fn clip_x(points: &[Point], min_x: f32, max_x: f32) -> Vec<Point> {
    fn at_x(a: Point, b: Point, x: f32) -> Point {
        let t = (x - a.x) / (b.x - a.x);
        Point::new(x, a.y + (b.y - a.y) * t)
    }

    let mut out = Vec::with_capacity(points.len());

    for (i, &point) in points.iter().enumerate() {
        if point.x < min_x {
            if let Some(&next) = points.get(i + 1)
                && next.x > min_x
            {
                out.push(at_x(point, next, min_x));
            }
            continue;
        }

        if point.x > max_x {
            if let Some(&prev) = i.checked_sub(1).and_then(|j| points.get(j))
                && prev.x < max_x
            {
                out.push(at_x(prev, point, max_x));
            }
            break;
        }

        out.push(point);
    }

    out
}

pub fn render(
    view: &ChartView,
    measurer: &dyn TextMeasurer,
    formatter: &dyn DateFormatter,
) -> Scene {
    let mut scene = Scene::default();

    let size = view.size();
    if size.width <= 0.0 || size.height <= 0.0 {
        return scene;
    }

    let theme = view.theme();
    let metrics = view.metrics();
    let plot = view.regions().plot;
    let vp = view.viewport();

    let mapper = PlotMapper {
        origin: plot.position(),
        step_px: vp.step_px,
        offset_px: vp.offset_px,
        height_px: plot.height,
        top_padding_px: metrics.plot_top_padding,
        max_value: view.visibility().max_y(),
    };

    let full = Rectangle::new(Point::ORIGIN, size);
    scene.push(Primitive::Rect {
        bounds: full,
        color: theme.color(ColorRole::Background),
        radius: 0.0,
    });

    grid(&mut scene, view, &mapper);
    series(&mut scene, view, &mapper);
    date_labels(&mut scene, view, &mapper, measurer, formatter);

    let interpolation = view.selection().and_then(|sel| {
        selection::interpolate(sel.pixel_x, &vp, view.dataset(), view.visibility())
            .map(|interp| (sel.pixel_x, interp))
    });

    if let Some((pixel_x, interp)) = &interpolation {
        scrubber(&mut scene, view, &mapper, *pixel_x, interp);
    }

    minimap(&mut scene, view);

    if let Some((pixel_x, interp)) = &interpolation {
        panel(&mut scene, view, *pixel_x, interp, measurer, formatter);
    }

    scene
}

fn grid(scene: &mut Scene, view: &ChartView, mapper: &PlotMapper) {
    let metrics = view.metrics();
    let theme = view.theme();
    let plot = view.regions().plot;

    let count = metrics.grid_lines;
    let usable = plot.height - metrics.plot_top_padding;

    for (k, value) in coords::grid_values(mapper.max_value, count)
        .into_iter()
        .enumerate()
    {
        let y = plot.y + plot.height - usable * k as f32 / count as f32;

        scene.push(Primitive::Line {
            from: Point::new(plot.x, y),
            to: Point::new(plot.x + plot.width, y),
            color: theme.color(ColorRole::GridLine),
            width: metrics.grid_line_width,
        });

        if k > 0 && mapper.max_value > 0.0 {
            scene.push(Primitive::Text {
                content: abbr_large_numbers(value),
                position: Point::new(plot.x, y - GRID_LABEL_GAP),
                color: theme.color(ColorRole::AxisText),
                size: metrics.text_size,
                bold: false,
                align_x: AlignX::Left,
                align_y: AlignY::Bottom,
            });
        }
    }
}

fn series(scene: &mut Scene, view: &ChartView, mapper: &PlotMapper) {
    let plot = view.regions().plot;
    let Some(range) = view.visible_range() else {
        return;
    };
    let indices = decimated(*range.start(), *range.end(), view.metrics().decimation);

    for index in view.visibility().visible_indices() {
        let Some(series) = view.dataset().series_at(index) else {
            continue;
        };

        let points: Vec<Point> = indices
            .iter()
            .filter_map(|&i| series.value(i).map(|v| mapper.map(i, v)))
            .collect();

        scene.push(Primitive::Polyline {
            points: clip_x(&points, plot.x, plot.x + plot.width),
            color: view.theme().series_color(series.color),
            width: view.metrics().line_width,
        });
    }
}

fn date_labels(
    scene: &mut Scene,
    view: &ChartView,
    mapper: &PlotMapper,
    measurer: &dyn TextMeasurer,
    formatter: &dyn DateFormatter,
) {
    let metrics = view.metrics();
    let plot = view.regions().plot;
    let axis = view.regions().axis;

    let (Some(range), Some(cadence)) = (
        view.visible_range(),
        date_label_cadence(view, measurer, formatter),
    ) else {
        return;
    };
    let first = range.start().div_ceil(cadence) * cadence;

    for index in (first..=*range.end()).step_by(cadence) {
        let x = mapper.map_x(index);
        if x < plot.x || x > plot.x + plot.width {
            continue;
        }
        let Some(timestamp) = view.dataset().timestamp(index) else {
            continue;
        };

        scene.push(Primitive::Text {
            content: formatter.format_axis(timestamp),
            position: Point::new(x, axis.center_y()),
            color: view.theme().color(ColorRole::AxisText),
            size: metrics.text_size,
            bold: false,
            align_x: AlignX::Center,
            align_y: AlignY::Center,
        });
    }
}

fn scrubber(
    scene: &mut Scene,
    view: &ChartView,
    mapper: &PlotMapper,
    pixel_x: f32,
    interp: &Interpolation,
) {
    let metrics = view.metrics();
    let theme = view.theme();
    let plot = view.regions().plot;
    let x = plot.x + pixel_x;

    scene.push(Primitive::Line {
        from: Point::new(x, plot.y + metrics.plot_top_padding),
        to: Point::new(x, plot.y + plot.height),
        color: theme.color(ColorRole::Scrubber),
        width: metrics.scrubber_width,
    });

    for selected in &interp.values {
        let Some(series) = view.dataset().series_at(selected.series) else {
            continue;
        };
        scene.push(Primitive::Circle {
            center: Point::new(x, mapper.map_y(selected.value)),
            radius: metrics.highlight_radius,
            fill: theme.color(ColorRole::Background),
            stroke: theme.series_color(series.color),
            width: metrics.line_width,
        });
    }
}

fn minimap(scene: &mut Scene, view: &ChartView) {
    let metrics = view.metrics();
    let theme = view.theme();
    let overlay = view.overlay();
    let area = view.regions().minimap;

    if overlay.step_px() <= 0.0 || view.dataset().is_empty() {
        return;
    }

    let cap = metrics.minimap_cap;
    let frame = metrics.minimap_frame;

    // same scale as the main plot so the two agree on what is "high"
    let mapper = PlotMapper {
        origin: Point::new(area.x + cap, area.y),
        step_px: overlay.step_px(),
        offset_px: 0.0,
        height_px: area.height,
        top_padding_px: frame * 2.0,
        max_value: view.visibility().max_y(),
    };

    let indices = decimated(0, view.dataset().len() - 1, metrics.decimation);
    for index in view.visibility().visible_indices() {
        let Some(series) = view.dataset().series_at(index) else {
            continue;
        };
        let points = indices
            .iter()
            .filter_map(|&i| series.value(i).map(|v| mapper.map(i, v)))
            .collect();

        scene.push(Primitive::Polyline {
            points,
            color: theme.series_color(series.color),
            width: metrics.minimap_line_width,
        });
    }

    for (from, to) in overlay.masks() {
        if to > from {
            scene.push(Primitive::Rect {
                bounds: Rectangle::new(
                    Point::new(area.x + from, area.y),
                    Size::new(to - from, area.height),
                ),
                color: theme.color(ColorRole::MinimapMask),
                radius: 0.0,
            });
        }
    }

    let window = overlay.window();
    let left = area.x + window.scroll_px;
    let frame_color = theme.color(ColorRole::MinimapFrame);

    for bounds in [
        Rectangle::new(Point::new(left - cap, area.y), Size::new(cap, area.height)),
        Rectangle::new(
            Point::new(left + window.width_px, area.y),
            Size::new(cap, area.height),
        ),
        Rectangle::new(Point::new(left, area.y), Size::new(window.width_px, frame)),
        Rectangle::new(
            Point::new(left, area.y + area.height - frame),
            Size::new(window.width_px, frame),
        ),
    ] {
        scene.push(Primitive::Rect {
            bounds,
            color: frame_color,
            radius: 0.0,
        });
    }
}

fn panel(
    scene: &mut Scene,
    view: &ChartView,
    pixel_x: f32,
    interp: &Interpolation,
    measurer: &dyn TextMeasurer,
    formatter: &dyn DateFormatter,
) {
    let metrics: &Metrics = view.metrics();
    let theme: &Theme = view.theme();
    let fonts = metrics.panel();

    let layout = selection::layout_panel(
        interp,
        view.dataset(),
        pixel_x,
        view.regions().plot,
        &fonts,
        measurer,
        formatter,
    );

    let border = theme.color(ColorRole::PanelBorder);

    scene.push(Primitive::Rect {
        bounds: layout.bounds + Vector::new(0.0, PANEL_BORDER),
        color: darken(border, 0.05),
        radius: metrics.panel_radius,
    });
    scene.push(Primitive::Rect {
        bounds: layout.bounds,
        color: theme.color(ColorRole::PanelBackground),
        radius: metrics.panel_radius,
    });
    scene.push(Primitive::RectStroke {
        bounds: layout.bounds,
        color: border,
        radius: metrics.panel_radius,
        width: PANEL_BORDER,
    });

    scene.push(Primitive::Text {
        content: layout.date.content,
        position: layout.date.bounds.position(),
        color: theme.color(ColorRole::PanelText),
        size: fonts.date_font.size,
        bold: fonts.date_font.bold,
        align_x: AlignX::Left,
        align_y: AlignY::Top,
    });

    for item in layout.items {
        let color = theme.series_color(item.color);

        scene.push(Primitive::Text {
            content: item.value.content,
            position: item.value.bounds.position(),
            color,
            size: fonts.value_font.size,
            bold: fonts.value_font.bold,
            align_x: AlignX::Left,
            align_y: AlignY::Top,
        });
        scene.push(Primitive::Text {
            content: item.name.content,
            position: item.name.bounds.position(),
            color,
            size: fonts.name_font.size,
            bold: fonts.name_font.bold,
            align_x: AlignX::Left,
            align_y: AlignY::Top,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::measure::EstimatedMeasurer;
    use crate::chart::{Gesture, Region};

    use data::chart::{Dataset, Series};
    use iced::Color;

    const DAY_MS: i64 = 86_400_000;

    struct IndexFormatter;

    impl DateFormatter for IndexFormatter {
        fn format(&self, timestamp_ms: i64) -> String {
            format!("d{}", timestamp_ms / DAY_MS)
        }
    }

    fn view(len: usize) -> ChartView {
        let timestamps = (0..len as i64).map(|i| i * DAY_MS).collect();
        let dataset = Dataset::new(
            timestamps,
            vec![
                Series::new("Joined", Color::BLACK, (0..len as i64).map(|i| i * 3).collect()),
                Series::new("Left", Color::WHITE, (0..len as i64).map(|i| 40 - i % 7).collect()),
            ],
        )
        .unwrap();

        let metrics = Metrics::default();
        let mut view = ChartView::new(dataset, metrics, Theme::default());
        view.resize(Size::new(300.0 + 2.0 * metrics.side_padding, metrics.total_height()));
        view
    }

    fn render_view(view: &ChartView) -> Scene {
        render(view, &EstimatedMeasurer, &IndexFormatter)
    }

    #[test]
    fn decimation_keeps_last_sample() {
        assert_eq!(decimated(3, 10, 2), vec![2, 4, 6, 8, 10]);
        assert_eq!(decimated(3, 9, 2), vec![2, 4, 6, 8, 9]);
        assert_eq!(decimated(0, 0, 2), vec![0]);
        assert_eq!(decimated(4, 6, 0), vec![4, 5, 6]);
    }

    #[test]
    fn cadence_rounds_up() {
        assert_eq!(label_cadence(64.0, 12.0), 6);
        assert_eq!(label_cadence(64.0, 64.0), 1);
        assert_eq!(label_cadence(64.0, 100.0), 1);
        assert_eq!(label_cadence(64.0, 0.0), 1);
    }

    #[test]
    fn clipping_interpolates_edges() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(30.0, 0.0),
        ];
        let clipped = clip_x(&points, 5.0, 25.0);

        assert_eq!(
            clipped,
            vec![
                Point::new(5.0, 5.0),
                Point::new(10.0, 10.0),
                Point::new(20.0, 20.0),
                Point::new(25.0, 10.0),
            ]
        );
        assert!(clip_x(&points, 40.0, 50.0).is_empty());
    }

    #[test]
    fn draws_every_visible_series_twice() {
        let view = view(100);
        // main plot and minimap
        assert_eq!(render_view(&view).polylines().count(), 4);
    }

    #[test]
    fn all_hidden_draws_grid_only() {
        let mut view = view(100);
        view.set_visible(0, false);
        view.set_visible(1, false);

        let scene = render_view(&view);
        assert_eq!(scene.polylines().count(), 0);

        let grid_lines = scene
            .primitives()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count();
        assert_eq!(grid_lines, view.metrics().grid_lines);

        // with nothing to scale by, no value labels either
        assert!(scene.texts().all(|t| t.starts_with('d')));
    }

    fn date_label_positions(scene: &Scene) -> Vec<(usize, f32)> {
        scene
            .primitives()
            .filter_map(|p| match p {
                Primitive::Text {
                    content, position, ..
                } => Some((content.strip_prefix('d')?.parse().ok()?, position.x)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn date_labels_follow_cadence() {
        let view = view(100);
        let cadence = date_label_cadence(&view, &EstimatedMeasurer, &IndexFormatter).unwrap();

        let labels = date_label_positions(&render_view(&view));

        assert!(!labels.is_empty());
        assert!(labels.iter().all(|(i, _)| i % cadence == 0));
        assert!(labels.windows(2).all(|w| w[1].0 - w[0].0 == cadence));
    }

    #[test]
    fn date_labels_do_not_overlap() {
        let mut view = view(100);
        let font = view.metrics().axis_font();

        for lines in [0.0, 4.0, 8.0, -20.0] {
            view.on_gesture(Gesture::Wheel {
                at: Point::new(view.regions().plot.center_x(), view.regions().plot.center_y()),
                lines,
            });

            let labels = date_label_positions(&render_view(&view));
            for pair in labels.windows(2) {
                let [(left, left_x), (right, right_x)] = [pair[0], pair[1]];
                let half_widths = (EstimatedMeasurer
                    .measure(&format!("d{left}"), font)
                    .width
                    + EstimatedMeasurer.measure(&format!("d{right}"), font).width)
                    / 2.0;
                assert!(right_x - left_x >= half_widths);
            }
        }
    }

    #[test]
    fn date_labels_stay_inside_plot() {
        let mut view = view(100);
        let plot = view.regions().plot;
        view.seek_to(333.0);

        let labels = date_label_positions(&render_view(&view));

        assert!(!labels.is_empty());
        assert!(
            labels
                .iter()
                .all(|(_, x)| *x >= plot.x && *x <= plot.x + plot.width)
        );
    }

    #[test]
    fn selection_adds_scrubber_and_panel() {
        let mut view = view(100);
        let plot = view.regions().plot;
        let at = Point::new(plot.x + 150.0, plot.center_y());
        assert_eq!(view.cursor_region(at).map(|(r, _)| r), Some(Region::Plot));

        view.on_gesture(Gesture::Down(at));
        view.on_gesture(Gesture::Up(at));

        let scene = render_view(&view);
        let circles = scene
            .primitives()
            .filter(|p| matches!(p, Primitive::Circle { .. }))
            .count();
        assert_eq!(circles, 2);
        assert!(scene.texts().any(|t| t == "Joined"));
        assert!(scene.texts().any(|t| t == "Left"));
    }

    #[test]
    fn panel_stays_inside_plot() {
        let mut view = view(100);
        let plot = view.regions().plot;
        let at = Point::new(plot.x + plot.width - 2.0, plot.center_y());

        view.on_gesture(Gesture::Down(at));
        view.on_gesture(Gesture::Up(at));

        let scene = render_view(&view);
        let panel = scene
            .primitives()
            .find_map(|p| match p {
                Primitive::RectStroke { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .unwrap();

        assert!(panel.x >= plot.x);
        assert!(panel.x + panel.width <= plot.x + plot.width + 1e-3);
    }
}
