use data::chart::{FontSpec, TextMeasurer};
use iced::Size;

const CHAR_W: f32 = 0.64;
const CHAR_W_BOLD: f32 = 0.68;
const LINE_HEIGHT: f32 = 1.3;

/// Monospace-style width estimate, good enough for sizing the selection panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasurer;

impl TextMeasurer for EstimatedMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> Size {
        let per_char = if font.bold { CHAR_W_BOLD } else { CHAR_W };
        Size::new(
            text.chars().count() as f32 * font.size * per_char,
            font.size * LINE_HEIGHT,
        )
    }
}
