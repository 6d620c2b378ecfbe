pub mod chart;
pub mod config;
pub mod util;

pub use chart::{Dataset, DatasetError, Fingerprint, Series, SeriesKind};
pub use config::state::{ChartState, StateError};
pub use config::theme::{ColorResolver, ColorRole, Palette, Theme};
pub use config::timezone::UserTimezone;
pub use config::{ChartConfig, DensityConverter, Metrics, ScaleFactor};
