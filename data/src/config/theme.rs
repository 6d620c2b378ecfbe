use enum_map::{Enum, EnumMap, enum_map};
use iced_core::{Color, theme::Custom};
use palette::{FromColor, Hsl, Hsva, RgbHue, Srgb, Srgba};
use serde::{Deserialize, Serialize};

/// Semantic slots the chart paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum ColorRole {
    Background,
    GridLine,
    AxisText,
    Scrubber,
    MinimapMask,
    MinimapFrame,
    PanelBackground,
    PanelBorder,
    PanelText,
}

pub trait ColorResolver {
    fn color_for(&self, role: ColorRole, night: bool) -> Color;
}

/// Day and night color tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    day: EnumMap<ColorRole, Color>,
    night: EnumMap<ColorRole, Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            day: enum_map! {
                ColorRole::Background => Color::WHITE,
                ColorRole::GridLine => Color::from_rgb8(242, 244, 245),
                ColorRole::AxisText => Color::from_rgb8(150, 162, 170),
                ColorRole::Scrubber => Color::from_rgb8(223, 230, 235),
                ColorRole::MinimapMask => Color::from_rgba8(242, 247, 249, 0.8),
                ColorRole::MinimapFrame => Color::from_rgba8(192, 209, 225, 0.7),
                ColorRole::PanelBackground => Color::WHITE,
                ColorRole::PanelBorder => Color::from_rgb8(227, 227, 227),
                ColorRole::PanelText => Color::from_rgb8(34, 34, 34),
            },
            night: enum_map! {
                ColorRole::Background => Color::from_rgb8(36, 47, 62),
                ColorRole::GridLine => Color::from_rgb8(41, 53, 68),
                ColorRole::AxisText => Color::from_rgb8(84, 103, 120),
                ColorRole::Scrubber => Color::from_rgb8(59, 74, 90),
                ColorRole::MinimapMask => Color::from_rgba8(25, 33, 43, 0.6),
                ColorRole::MinimapFrame => Color::from_rgba8(86, 98, 109, 0.7),
                ColorRole::PanelBackground => Color::from_rgb8(37, 50, 65),
                ColorRole::PanelBorder => Color::from_rgb8(32, 43, 56),
                ColorRole::PanelText => Color::WHITE,
            },
        }
    }
}

impl ColorResolver for Palette {
    fn color_for(&self, role: ColorRole, night: bool) -> Color {
        if night {
            self.night[role]
        } else {
            self.day[role]
        }
    }
}

/// The active look, handed to every chart view. Persists as `"day"` or `"night"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Theme {
    pub night: bool,
    pub palette: Palette,
}

impl Theme {
    pub fn day() -> Self {
        Self::default()
    }

    pub fn night() -> Self {
        Self {
            night: true,
            ..Self::default()
        }
    }

    pub fn toggled(&self) -> Self {
        Self {
            night: !self.night,
            palette: self.palette.clone(),
        }
    }

    pub fn color(&self, role: ColorRole) -> Color {
        self.palette.color_for(role, self.night)
    }

    /// Series colors are tuned for a light background; lift them a little at night.
    pub fn series_color(&self, base: Color) -> Color {
        if self.night {
            lighten(base, 0.06)
        } else {
            base
        }
    }

    pub fn name(&self) -> &'static str {
        if self.night { "night" } else { "day" }
    }
}

impl From<&Theme> for iced_core::Theme {
    fn from(theme: &Theme) -> Self {
        let background = theme.color(ColorRole::Background);
        let text = theme.color(ColorRole::PanelText);

        iced_core::Theme::Custom(
            Custom::new(
                theme.name().to_string(),
                iced_core::theme::Palette {
                    background,
                    text,
                    primary: Color::from_rgb8(61, 141, 222),
                    success: Color::from_rgb8(61, 194, 63),
                    danger: Color::from_rgb8(243, 76, 68),
                    warning: Color::from_rgb8(241, 196, 15),
                },
            )
            .into(),
        )
    }
}

impl Serialize for Theme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.to_lowercase().as_str() {
            "day" | "light" => Ok(Theme::day()),
            "night" | "dark" => Ok(Theme::night()),
            other => Err(serde::de::Error::custom(format!("Invalid theme: {other}"))),
        }
    }
}

pub fn hex_to_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if !(digits.len() == 6 || digits.len() == 8) {
        return None;
    }

    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
    };

    let [r, g, b] = [channel(0)?, channel(2)?, channel(4)?];
    let a = if digits.len() == 8 { channel(6)? } else { u8::MAX };

    Some(Color::from_rgba8(r, g, b, f32::from(a) / 255.0))
}

fn from_srgba(rgba: Srgba) -> Color {
    Color {
        r: rgba.color.red.clamp(0.0, 1.0),
        g: rgba.color.green.clamp(0.0, 1.0),
        b: rgba.color.blue.clamp(0.0, 1.0),
        a: rgba.alpha,
    }
}

fn shift_lightness(color: Color, amount: f32) -> Color {
    let mut hsl: Hsl = Hsl::from_color(Srgb::new(color.r, color.g, color.b));
    hsl.lightness = (hsl.lightness + amount).clamp(0.0, 1.0);

    let rgb = Srgb::from_color(hsl);
    from_srgba(Srgba::new(rgb.red, rgb.green, rgb.blue, color.a))
}

pub fn darken(color: Color, amount: f32) -> Color {
    shift_lightness(color, -amount)
}

pub fn lighten(color: Color, amount: f32) -> Color {
    shift_lightness(color, amount)
}

/// Hue in degrees, saturation and value in `[0, 1]`.
pub fn from_hsv_degrees(hue: f32, saturation: f32, value: f32) -> Color {
    let hsva = Hsva::new(RgbHue::from_degrees(hue), saturation, value, 1.0);
    from_srgba(Srgba::from_color(hsva))
}
