//! The interactive chart widget: turns pointer input into [`Gesture`]s and
//! paints the [`Scene`] rendered from a [`ChartView`].

use crate::chart::measure::EstimatedMeasurer;
use crate::chart::renderer::render;
use crate::chart::scene::{AlignX, AlignY, Primitive, Scene};
use crate::chart::{ChartView, Gesture, Region};

use data::UserTimezone;
use data::chart::overlay::CursorRegion;

use iced::advanced::widget::tree::{self, Tree};
use iced::advanced::{self, Clipboard, Layout, Shell, Widget, layout, renderer};
use iced::widget::canvas;
use iced::{Element, Event, Length, Rectangle, Renderer, Size, Theme, Vector, mouse, window};

/// Pixel wheel deltas per scroll "line".
const PIXELS_PER_LINE: f32 = 60.0;

const BOLD: iced::Font = iced::Font {
    weight: iced::font::Weight::Bold,
    ..iced::Font::DEFAULT
};

struct State {
    cache: canvas::Cache,
    last_revision: Option<u64>,
    last_timezone: Option<UserTimezone>,
    requested_size: Option<Size>,
    dragging: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            cache: canvas::Cache::new(),
            last_revision: None,
            last_timezone: None,
            requested_size: None,
            dragging: false,
        }
    }
}

pub struct Chart<'a, Message> {
    view: &'a ChartView,
    timezone: UserTimezone,
    on_gesture: Box<dyn Fn(Gesture) -> Message + 'a>,
    on_resize: Box<dyn Fn(Size) -> Message + 'a>,
}

impl<'a, Message> Chart<'a, Message> {
    pub fn new(
        view: &'a ChartView,
        on_gesture: impl Fn(Gesture) -> Message + 'a,
        on_resize: impl Fn(Size) -> Message + 'a,
    ) -> Self {
        Self {
            view,
            timezone: UserTimezone::default(),
            on_gesture: Box::new(on_gesture),
            on_resize: Box::new(on_resize),
        }
    }

    pub fn timezone(mut self, timezone: UserTimezone) -> Self {
        self.timezone = timezone;
        self
    }
}

pub fn chart<'a, Message>(
    view: &'a ChartView,
    on_gesture: impl Fn(Gesture) -> Message + 'a,
    on_resize: impl Fn(Size) -> Message + 'a,
) -> Chart<'a, Message> {
    Chart::new(view, on_gesture, on_resize)
}

impl<Message> Widget<Message, Theme, Renderer> for Chart<'_, Message> {
    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<State>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(State::default())
    }

    fn size(&self) -> Size<Length> {
        Size {
            width: Length::Fill,
            height: Length::Fixed(self.view.metrics().total_height()),
        }
    }

    fn layout(
        &mut self,
        _tree: &mut Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::atomic(limits, Length::Fill, self.view.metrics().total_height())
    }

    fn update(
        &mut self,
        tree: &mut Tree,
        event: &Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        _viewport: &Rectangle,
    ) {
        if shell.is_event_captured() {
            return;
        }

        let state = tree.state.downcast_mut::<State>();
        let bounds = layout.bounds();
        let origin = Vector::new(bounds.x, bounds.y);

        match event {
            Event::Mouse(mouse_event) => match mouse_event {
                mouse::Event::ButtonPressed(mouse::Button::Left) => {
                    let Some(position) = cursor.position_in(bounds) else {
                        return;
                    };
                    state.dragging = true;
                    shell.publish((self.on_gesture)(Gesture::Down(position)));
                    shell.capture_event();
                }
                mouse::Event::CursorMoved { position } => {
                    // drags keep tracking outside the widget
                    if state.dragging {
                        shell.publish((self.on_gesture)(Gesture::Move(*position - origin)));
                    }
                }
                mouse::Event::ButtonReleased(mouse::Button::Left) => {
                    if !state.dragging {
                        return;
                    }
                    state.dragging = false;

                    let gesture = match cursor.position() {
                        Some(position) => Gesture::Up(position - origin),
                        None => Gesture::Cancel,
                    };
                    shell.publish((self.on_gesture)(gesture));
                    shell.capture_event();
                }
                mouse::Event::WheelScrolled { delta } => {
                    let Some(at) = cursor.position_in(bounds) else {
                        return;
                    };
                    let lines = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => *y,
                        mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                    };
                    if lines != 0.0 {
                        shell.publish((self.on_gesture)(Gesture::Wheel { at, lines }));
                        shell.capture_event();
                    }
                }
                mouse::Event::CursorLeft => {
                    if state.dragging {
                        state.dragging = false;
                        shell.publish((self.on_gesture)(Gesture::Cancel));
                    }
                }
                _ => {}
            },
            Event::Window(window::Event::RedrawRequested(_)) => {
                let size = bounds.size();
                if size.width > 0.0
                    && size.height > 0.0
                    && size != self.view.size()
                    && state.requested_size != Some(size)
                {
                    state.requested_size = Some(size);
                    shell.publish((self.on_resize)(size));
                }

                let revision = self.view.revision();
                if state.last_revision != Some(revision)
                    || state.last_timezone != Some(self.timezone)
                {
                    state.cache.clear();
                    state.last_revision = Some(revision);
                    state.last_timezone = Some(self.timezone);
                }
            }
            _ => {}
        }
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        use advanced::Renderer as _;

        let state = tree.state.downcast_ref::<State>();
        let bounds = layout.bounds();

        renderer.with_translation(Vector::new(bounds.x, bounds.y), |r| {
            let geometry = state.cache.draw(r, bounds.size(), |frame| {
                let scene = render(self.view, &EstimatedMeasurer, &self.timezone);
                paint(frame, &scene);
            });

            use iced::advanced::graphics::geometry::Renderer as _;
            r.draw_geometry(geometry);
        });
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: Layout<'_>,
        cursor: advanced::mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> advanced::mouse::Interaction {
        let state = tree.state.downcast_ref::<State>();
        if state.dragging {
            return advanced::mouse::Interaction::Grabbing;
        }

        let Some(position) = cursor.position_in(layout.bounds()) else {
            return advanced::mouse::Interaction::default();
        };

        match self.view.cursor_region(position) {
            Some((Region::Plot, _)) => advanced::mouse::Interaction::Crosshair,
            Some((Region::Minimap, CursorRegion::Left | CursorRegion::Right)) => {
                advanced::mouse::Interaction::ResizingHorizontally
            }
            Some((Region::Minimap, CursorRegion::Center)) => advanced::mouse::Interaction::Grab,
            _ => advanced::mouse::Interaction::default(),
        }
    }
}

impl<'a, Message> From<Chart<'a, Message>> for Element<'a, Message, Theme, Renderer>
where
    Message: 'a,
{
    fn from(chart: Chart<'a, Message>) -> Self {
        Element::new(chart)
    }
}

fn alignment_x(align: AlignX) -> iced::Alignment {
    match align {
        AlignX::Left => iced::Alignment::Start,
        AlignX::Center => iced::Alignment::Center,
        AlignX::Right => iced::Alignment::End,
    }
}

fn alignment_y(align: AlignY) -> iced::Alignment {
    match align {
        AlignY::Top => iced::Alignment::Start,
        AlignY::Center => iced::Alignment::Center,
        AlignY::Bottom => iced::Alignment::End,
    }
}

fn rectangle_path(bounds: Rectangle, radius: f32) -> canvas::Path {
    if radius > 0.0 {
        canvas::Path::rounded_rectangle(bounds.position(), bounds.size(), radius.into())
    } else {
        canvas::Path::rectangle(bounds.position(), bounds.size())
    }
}

fn paint(frame: &mut canvas::Frame, scene: &Scene) {
    for primitive in scene.primitives() {
        match primitive {
            Primitive::Rect {
                bounds,
                color,
                radius,
            } => {
                if *radius > 0.0 {
                    frame.fill(&rectangle_path(*bounds, *radius), *color);
                } else {
                    frame.fill_rectangle(bounds.position(), bounds.size(), *color);
                }
            }
            Primitive::RectStroke {
                bounds,
                color,
                radius,
                width,
            } => {
                frame.stroke(
                    &rectangle_path(*bounds, *radius),
                    canvas::Stroke::default()
                        .with_color(*color)
                        .with_width(*width),
                );
            }
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => {
                frame.stroke(
                    &canvas::Path::line(*from, *to),
                    canvas::Stroke::default()
                        .with_color(*color)
                        .with_width(*width),
                );
            }
            Primitive::Polyline {
                points,
                color,
                width,
            } => {
                let [first, rest @ ..] = points.as_slice() else {
                    continue;
                };
                if rest.is_empty() {
                    continue;
                }

                let mut builder = canvas::path::Builder::new();
                builder.move_to(*first);
                for point in rest {
                    builder.line_to(*point);
                }

                frame.stroke(
                    &builder.build(),
                    canvas::Stroke::default()
                        .with_color(*color)
                        .with_width(*width),
                );
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                stroke,
                width,
            } => {
                let path = canvas::Path::circle(*center, *radius);
                frame.fill(&path, *fill);
                frame.stroke(
                    &path,
                    canvas::Stroke::default()
                        .with_color(*stroke)
                        .with_width(*width),
                );
            }
            Primitive::Text {
                content,
                position,
                color,
                size,
                bold,
                align_x,
                align_y,
            } => {
                frame.fill_text(canvas::Text {
                    content: content.clone(),
                    position: *position,
                    color: *color,
                    size: (*size).into(),
                    font: if *bold { BOLD } else { iced::Font::DEFAULT },
                    align_x: alignment_x(*align_x).into(),
                    align_y: alignment_y(*align_y).into(),
                    ..Default::default()
                });
            }
        }
    }
}
