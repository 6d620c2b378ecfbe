pub mod measure;
pub mod renderer;
pub mod scene;

use data::chart::Dataset;
use data::chart::overlay::{CursorRegion, OverlaySelector, ViewportCommand};
use data::chart::selection::Selection;
use data::chart::viewport::{Viewport, ViewportController, ViewportEvent};
use data::chart::visibility::VisibilityStore;
use data::{ChartState, Metrics, StateError, Theme};

use iced::{Point, Rectangle, Size};

/// Pointer travel below which a press-release counts as a tap.
const TAP_SLOP: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Visible window in samples.
    ViewportChanged { offset: f32, width: f32 },
    SeriesToggled {
        index: usize,
        name: String,
        visible: bool,
    },
    Seeking(f32),
    Seek(f32),
    SelectionChanged(Option<usize>),
}

/// Pointer input, in coordinates relative to the chart's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Down(Point),
    Move(Point),
    Up(Point),
    Wheel { at: Point, lines: f32 },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Plot,
    Minimap,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Regions {
    pub plot: Rectangle,
    pub axis: Rectangle,
    pub minimap: Rectangle,
}

impl Regions {
    fn new(size: Size, metrics: &Metrics) -> Self {
        let x = metrics.side_padding;
        let width = (size.width - 2.0 * metrics.side_padding).max(0.0);

        let plot = Rectangle::new(Point::new(x, 0.0), Size::new(width, metrics.plot_height));
        let axis = Rectangle::new(
            Point::new(x, plot.y + plot.height),
            Size::new(width, metrics.axis_height),
        );
        let minimap = Rectangle::new(
            Point::new(x, axis.y + axis.height + metrics.minimap_spacing),
            Size::new(width, metrics.minimap_height),
        );

        Self {
            plot,
            axis,
            minimap,
        }
    }

    pub fn hit_test(&self, point: Point) -> Option<Region> {
        if self.plot.contains(point) {
            Some(Region::Plot)
        } else if self.minimap.contains(point) {
            Some(Region::Minimap)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Drag {
    Plot { start: Point, moved: bool },
    Minimap,
}

/// One interactive chart: main plot, date axis and minimap over a dataset.
///
/// Every mutation returns the [`Event`]s it produced; an empty result means
/// nothing changed and no redraw is needed.
pub struct ChartView {
    dataset: Dataset,
    metrics: Metrics,
    theme: Theme,
    viewport: ViewportController,
    overlay: OverlaySelector,
    visibility: VisibilityStore,
    selection: Selection,
    size: Size,
    regions: Regions,
    drag: Option<Drag>,
    revision: u64,
}

impl ChartView {
    pub fn new(dataset: Dataset, metrics: Metrics, theme: Theme) -> Self {
        let mut view = Self {
            visibility: VisibilityStore::new(&dataset),
            dataset,
            viewport: ViewportController::new(metrics.max_step, metrics.end_padding, metrics.max_step),
            overlay: OverlaySelector::new(metrics.overlay()),
            metrics,
            theme,
            selection: Selection::default(),
            size: Size::ZERO,
            regions: Regions::default(),
            drag: None,
            revision: 0,
        };
        view.reset_view(view.metrics.initial_window);
        view
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn visible_range(&self) -> Option<std::ops::RangeInclusive<usize>> {
        self.viewport.visible_range()
    }

    pub fn overlay(&self) -> &OverlaySelector {
        &self.overlay
    }

    pub fn visibility(&self) -> &VisibilityStore {
        &self.visibility
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.is_active().then_some(self.selection)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Bumped on every visible change; drawing caches key off it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Which part of the chart, and which minimap handle, sits under `point`.
    pub fn cursor_region(&self, point: Point) -> Option<(Region, CursorRegion)> {
        match self.regions.hit_test(point)? {
            Region::Plot => Some((Region::Plot, CursorRegion::Unselected)),
            Region::Minimap => Some((
                Region::Minimap,
                self.overlay.hit_test(point.x - self.regions.minimap.x),
            )),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn reset_view(&mut self, fraction: f32) -> Vec<Event> {
        let len = self.dataset.len();

        self.visibility = VisibilityStore::new(&self.dataset);
        self.selection = Selection::default();
        self.drag = None;
        self.viewport.set_data_len(len);

        let mut events = Vec::new();
        if let Some(command) = self.overlay.set_data_len(len, fraction) {
            self.apply_command(command, true, &mut events);
        }
        self.touch();
        events
    }

    /// Replaces the data wholesale; view state starts over.
    pub fn set_dataset(&mut self, dataset: Dataset) -> Vec<Event> {
        log::debug!(
            "Chart dataset replaced: {} samples, {} series",
            dataset.len(),
            dataset.series().len()
        );
        self.dataset = dataset;
        self.reset_view(self.metrics.initial_window)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.touch();
        }
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Option<Event> {
        if !self.visibility.set_visible(index, visible) {
            return None;
        }
        self.visibility.recompute_max_y(&self.dataset);
        self.touch();

        let name = self
            .dataset
            .series_at(index)
            .map(|s| s.name.clone())
            .unwrap_or_default();

        Some(Event::SeriesToggled {
            index,
            name,
            visible,
        })
    }

    /// Scrolls the main plot so its left edge sits `offset_px` into the content.
    pub fn seek_to(&mut self, offset_px: f32) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(event) = self.viewport.seek_px(offset_px) {
            events.push(event.into());
            self.viewport_moved(&mut events);
        }
        events
    }

    pub fn resize(&mut self, size: Size) -> Vec<Event> {
        if size == self.size || size.width <= 0.0 || size.height <= 0.0 {
            return Vec::new();
        }

        let mut events = self.on_gesture(Gesture::Cancel);

        self.size = size;
        self.regions = Regions::new(size, &self.metrics);

        let width = self.regions.plot.width;
        self.viewport.resize(width);

        if let Some(command) = self.overlay.resize(width) {
            self.apply_command(command, true, &mut events);
        }

        if self.selection.pixel_x > width {
            self.selection = Selection::default();
            events.push(Event::SelectionChanged(None));
        }

        self.touch();
        events
    }

    pub fn on_gesture(&mut self, gesture: Gesture) -> Vec<Event> {
        let mut events = Vec::new();

        match gesture {
            Gesture::Down(point) => {
                // a press without a release ends whatever was in flight
                if self.drag.is_some() {
                    events = self.on_gesture(Gesture::Cancel);
                }
                self.press(point);
            }
            Gesture::Move(point) => match self.drag {
                Some(Drag::Plot { start, moved }) => {
                    let moved = moved || (point.x - start.x).abs() > TAP_SLOP;
                    self.drag = Some(Drag::Plot { start, moved });

                    if moved && let Some(event) = self.viewport.drag_to(point.x) {
                        events.push(event.into());
                        self.viewport_moved(&mut events);
                    }
                }
                Some(Drag::Minimap) => {
                    if let Some(command) =
                        self.overlay.drag_to(point.x - self.regions.minimap.x)
                    {
                        self.apply_command(command, false, &mut events);
                    }
                }
                None => {}
            },
            Gesture::Up(point) => match self.drag.take() {
                Some(Drag::Plot { moved, .. }) => {
                    if let Some(event) = self.viewport.end_drag() {
                        events.push(event.into());
                    }
                    if !moved {
                        self.select_at(point.x - self.regions.plot.x, &mut events);
                    }
                }
                Some(Drag::Minimap) => self.release_minimap(),
                None => {}
            },
            Gesture::Wheel { at, lines } => {
                if self.drag.is_none() && self.regions.hit_test(at) == Some(Region::Plot) {
                    let factor = self.metrics.zoom_step.powf(lines);
                    let min_units = self.overlay.min_width_units();
                    if self.viewport.zoom_by(factor, at.x - self.regions.plot.x, min_units) {
                        self.viewport_moved(&mut events);
                    }
                }
            }
            Gesture::Cancel => match self.drag.take() {
                Some(Drag::Plot { .. }) => {
                    if let Some(event) = self.viewport.end_drag() {
                        events.push(event.into());
                    }
                }
                Some(Drag::Minimap) => self.release_minimap(),
                None => {}
            },
        }

        events
    }

    fn press(&mut self, point: Point) {
        match self.regions.hit_test(point) {
            Some(Region::Plot) => {
                self.viewport.begin_drag(point.x);
                self.drag = Some(Drag::Plot {
                    start: point,
                    moved: false,
                });
            }
            Some(Region::Minimap) => {
                let region = self.overlay.press(point.x - self.regions.minimap.x);
                if region != CursorRegion::Unselected {
                    self.drag = Some(Drag::Minimap);
                }
            }
            None => {}
        }
    }

    /// The main plot may have moved while the minimap was held.
    fn release_minimap(&mut self) {
        if self.overlay.release() {
            let vp = self.viewport.viewport();
            self.overlay.sync_units(vp.offset_units(), vp.width_units());
            self.touch();
        }
    }

    fn select_at(&mut self, pixel_x: f32, events: &mut Vec<Event>) {
        let selection = Selection::at(pixel_x, &self.viewport.viewport(), self.dataset.len());
        let changed = selection.data_index != self.selection.data_index;

        self.selection = selection;
        self.touch();

        if changed {
            events.push(Event::SelectionChanged(selection.data_index));
        }
    }

    fn refresh_selection(&mut self, events: &mut Vec<Event>) {
        if self
            .selection
            .refresh(&self.viewport.viewport(), self.dataset.len())
        {
            events.push(Event::SelectionChanged(self.selection.data_index));
        }
    }

    /// The main plot moved on its own; bring the minimap along.
    fn viewport_moved(&mut self, events: &mut Vec<Event>) {
        let vp = self.viewport.viewport();
        self.overlay.sync_units(vp.offset_units(), vp.width_units());

        events.push(Event::ViewportChanged {
            offset: vp.offset_units(),
            width: vp.width_units(),
        });
        self.refresh_selection(events);
        self.touch();
    }

    fn apply_command(&mut self, command: ViewportCommand, force: bool, events: &mut Vec<Event>) {
        let changed = self.viewport.show_range(command.offset, command.width);

        if changed || force {
            let vp = self.viewport.viewport();
            events.push(Event::ViewportChanged {
                offset: vp.offset_units(),
                width: vp.width_units(),
            });
            self.refresh_selection(events);
            self.touch();
        }
    }

    pub fn to_state(&self) -> ChartState {
        ChartState {
            fingerprint: self.dataset.fingerprint(),
            viewport: (self.viewport.viewport().width_px > 0.0).then(|| self.viewport.to_state()),
            visibility: self.visibility.to_state(),
            selection: self.selection(),
            overlay: (self.overlay.step_px() > 0.0).then(|| self.overlay.to_state()),
        }
    }

    pub fn serialize_state(&self) -> Result<String, StateError> {
        self.to_state().to_blob()
    }

    /// Applies a blob from [`Self::serialize_state`]. A blob that does not
    /// fit the current dataset is discarded for the default view.
    ///
    /// Restoring is silent: the view is replaced as a whole, so no events are
    /// reported, not even the `Seek` of a drag it cuts short.
    pub fn restore_state(&mut self, blob: &str) -> bool {
        let state = ChartState::from_blob(blob).and_then(|state| {
            state.validate(&self.dataset)?;
            Ok(state)
        });

        match state {
            Ok(state) => {
                self.apply_state(state);
                true
            }
            Err(error) => {
                log::warn!("Discarding saved chart state: {error}");
                self.reset_view(1.0);
                false
            }
        }
    }

    fn apply_state(&mut self, state: ChartState) {
        let _ = self.on_gesture(Gesture::Cancel);
        self.visibility.from_state(state.visibility, &self.dataset);

        let saved_width = state.viewport.map(|vp| vp.width_px);
        if let Some(vp) = state.viewport {
            self.viewport.from_state(vp);
        }

        let plot_width = self.regions.plot.width;
        if plot_width > 0.0 {
            self.viewport.resize(plot_width);
        }

        let vp = self.viewport.viewport();
        match state.overlay {
            Some(window) if self.overlay.step_px() > 0.0 && saved_width == Some(plot_width) => {
                self.overlay.from_state(window);
            }
            _ => self.overlay.sync_units(vp.offset_units(), vp.width_units()),
        }

        self.selection = state
            .selection
            .map(|s| Selection::at(s.pixel_x, &vp, self.dataset.len()))
            .unwrap_or_default();

        self.touch();
    }
}

impl From<ViewportEvent> for Event {
    fn from(event: ViewportEvent) -> Self {
        match event {
            ViewportEvent::Seeking(px) => Event::Seeking(px),
            ViewportEvent::Seek(px) => Event::Seek(px),
        }
    }
}
