use crate::chart::ChartView;
use crate::style;

use iced::Element;
use iced::widget::{checkbox, row};

/// One checkbox per series, tinted with the series color.
pub fn series_toggles<'a, Message: 'a>(
    view: &'a ChartView,
    on_toggle: impl Fn(usize, bool) -> Message + Copy + 'a,
) -> Element<'a, Message> {
    let theme = view.theme();
    let visibility = view.visibility();

    let boxes = view.dataset().series().iter().enumerate().map(|(index, series)| {
        checkbox(visibility.is_visible(index))
            .label(series.name.as_str())
            .on_toggle(move |is_checked| on_toggle(index, is_checked))
            .style(style::series_checkbox(theme.series_color(series.color)))
            .into()
    });

    row(boxes).spacing(16).wrap().into()
}
