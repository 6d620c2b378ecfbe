use iced::widget::{checkbox, container};
use iced::{Border, Color, Theme};

/// Checkbox tinted with the series' own color.
pub fn series_checkbox(color: Color) -> impl Fn(&Theme, checkbox::Status) -> checkbox::Style {
    move |theme, status| {
        let palette = theme.extended_palette();

        let (is_checked, alpha) = match status {
            checkbox::Status::Active { is_checked } => (is_checked, 1.0),
            checkbox::Status::Hovered { is_checked } => (is_checked, 0.8),
            checkbox::Status::Disabled { is_checked } => (is_checked, 0.4),
        };

        let color = color.scale_alpha(alpha);

        checkbox::Style {
            background: if is_checked {
                color.into()
            } else {
                palette.background.base.color.into()
            },
            icon_color: palette.background.base.color,
            border: Border {
                color,
                width: 1.5,
                radius: 4.0.into(),
            },
            text_color: Some(palette.background.base.text),
        }
    }
}

pub fn chart_container(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();

    container::Style {
        background: Some(palette.background.base.color.into()),
        border: Border {
            color: palette.background.strong.color.scale_alpha(0.4),
            width: 1.0,
            radius: 6.0.into(),
        },
        ..Default::default()
    }
}

pub fn status_text(theme: &Theme) -> iced::widget::text::Style {
    iced::widget::text::Style {
        color: Some(theme.extended_palette().background.weak.text),
    }
}
