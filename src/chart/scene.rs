//! Backend-agnostic drawing output of the chart renderer.

use iced::{Color, Point, Rectangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignX {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignY {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        bounds: Rectangle,
        color: Color,
        radius: f32,
    },
    RectStroke {
        bounds: Rectangle,
        color: Color,
        radius: f32,
        width: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f32,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Color,
        stroke: Color,
        width: f32,
    },
    Text {
        content: String,
        position: Point,
        color: Color,
        size: f32,
        bold: bool,
        align_x: AlignX,
        align_y: AlignY,
    },
}

/// Primitives in back-to-front order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.primitives().filter_map(|p| match p {
            Primitive::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives().filter_map(|p| match p {
            Primitive::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}
