mod chart;
mod demo;
mod logger;
mod style;
mod widget;

use chart::{ChartView, Event, Gesture};
use demo::Demo;

use data::chart::DateFormatter;
use data::{ChartConfig, Dataset, ScaleFactor, UserTimezone};

use iced::widget::{button, column, container, row, space, text};
use iced::{Alignment, Element, Size};
use rustc_hash::FxHashMap;

fn main() -> iced::Result {
    if let Err(e) = logger::setup(cfg!(debug_assertions)) {
        eprintln!("Failed to initialize logger: {e}");
    }

    iced::application(Trendline::new, Trendline::update, Trendline::view)
        .title(Trendline::title)
        .theme(Trendline::theme)
        .window_size((760.0, 560.0))
        .antialiasing(true)
        .run()
}

struct Trendline {
    demos: Vec<Demo>,
    active: usize,
    view: ChartView,
    /// View state of datasets that are not on screen, by demo index.
    saved: FxHashMap<usize, String>,
    theme: data::Theme,
    timezone: UserTimezone,
}

#[derive(Debug, Clone)]
enum Message {
    Chart(Gesture),
    Resized(Size),
    ToggleSeries(usize, bool),
    ShowDataset(usize),
    ToggleNight,
    SetTimezone(UserTimezone),
}

impl Trendline {
    fn new() -> Self {
        let demos = demo::datasets();
        let theme = data::Theme::day();

        // iced scales the whole window, so chart metrics stay in logical pixels
        let metrics = ChartConfig::default().resolve(&ScaleFactor::default());

        let dataset = demos
            .first()
            .map(|demo| demo.dataset.clone())
            .unwrap_or_else(Dataset::default);

        Self {
            view: ChartView::new(dataset, metrics, theme.clone()),
            demos,
            active: 0,
            saved: FxHashMap::default(),
            theme,
            timezone: UserTimezone::default(),
        }
    }

    fn update(&mut self, message: Message) {
        let events = match message {
            Message::Chart(gesture) => self.view.on_gesture(gesture),
            Message::Resized(size) => self.view.resize(size),
            Message::ToggleSeries(index, visible) => {
                self.view.set_visible(index, visible).into_iter().collect()
            }
            Message::ShowDataset(index) => self.show_dataset(index),
            Message::ToggleNight => {
                self.theme = self.theme.toggled();
                self.view.set_theme(self.theme.clone());
                Vec::new()
            }
            Message::SetTimezone(timezone) => {
                self.timezone = timezone;
                Vec::new()
            }
        };

        for event in events {
            self.on_chart_event(event);
        }
    }

    /// Parks the current view state and brings `index` back as it was left.
    fn show_dataset(&mut self, index: usize) -> Vec<Event> {
        let Some(demo) = self.demos.get(index) else {
            return Vec::new();
        };
        if index == self.active {
            return Vec::new();
        }

        match self.view.serialize_state() {
            Ok(blob) => {
                self.saved.insert(self.active, blob);
            }
            Err(e) => log::warn!("Dropping view state of '{}': {e}", self.active_name()),
        }

        self.active = index;
        let mut events = self.view.set_dataset(demo.dataset.clone());

        if let Some(blob) = self.saved.get(&index) {
            if self.view.restore_state(blob) {
                log::debug!("Restored view state of '{}'", demo.name);
            }
            events.clear();
        }

        events
    }

    fn on_chart_event(&self, event: Event) {
        match event {
            Event::SeriesToggled {
                index,
                name,
                visible,
            } => log::info!("Series {index} '{name}' visible: {visible}"),
            event => log::debug!("{event:?}"),
        }
    }

    fn active_name(&self) -> &'static str {
        self.demos.get(self.active).map_or("", |demo| demo.name)
    }

    fn title(&self) -> String {
        format!("Trendline [{}]", self.active_name())
    }

    fn theme(&self) -> iced::Theme {
        (&self.theme).into()
    }

    fn status(&self) -> String {
        let date = |index: usize| {
            self.view
                .dataset()
                .timestamp(index)
                .map(|ts| self.timezone.format(ts))
                .unwrap_or_default()
        };

        let Some(range) = self.view.visible_range() else {
            return "No data".to_string();
        };

        let mut status = format!("{} to {}", date(*range.start()), date(*range.end()));

        if let Some(index) = self.view.selection().and_then(|s| s.data_index) {
            status.push_str(&format!(", selected {}", date(index)));
        }
        status
    }

    fn view(&self) -> Element<'_, Message> {
        let switcher = row(self.demos.iter().enumerate().map(|(index, demo)| {
            button(text(demo.name))
                .style(if index == self.active {
                    button::primary
                } else {
                    button::secondary
                })
                .on_press(Message::ShowDataset(index))
                .into()
        }))
        .spacing(8);

        let next_timezone = match self.timezone {
            UserTimezone::Utc => UserTimezone::Local,
            UserTimezone::Local => UserTimezone::Utc,
        };

        let header = row![
            switcher,
            space::horizontal(),
            button(text(self.timezone.to_string()))
                .style(button::text)
                .on_press(Message::SetTimezone(next_timezone)),
            button(text(if self.theme.night { "Day" } else { "Night" }))
                .style(button::secondary)
                .on_press(Message::ToggleNight),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let chart = container(
            widget::chart::chart(&self.view, Message::Chart, Message::Resized)
                .timezone(self.timezone),
        )
        .padding([8, 0])
        .style(style::chart_container);

        let toggles = widget::toggles::series_toggles(&self.view, Message::ToggleSeries);

        column![
            header,
            chart,
            toggles,
            text(self.status()).size(12).style(style::status_text),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }
}
