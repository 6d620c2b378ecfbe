pub mod coords;
pub mod overlay;
pub mod selection;
pub mod viewport;
pub mod visibility;

use iced_core::{Color, Size};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Series '{name}' has {found} samples, time axis has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Timestamps must be ascending and unique (index {0})")]
    UnorderedTimestamps(usize),
    #[error("Unsupported series kind: {0}")]
    UnsupportedKind(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Line,
}

impl std::str::FromStr for SeriesKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(SeriesKind::Line),
            other => Err(DatasetError::UnsupportedKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesKind::Line => write!(f, "line"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub color: Color,
    pub kind: SeriesKind,
    pub values: Vec<i64>,
}

impl Series {
    pub fn new(name: impl Into<String>, color: Color, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            color,
            kind: SeriesKind::Line,
            values,
        }
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).map(|v| *v as f64)
    }

    pub fn max_value(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Identity of a dataset as far as persisted view state is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fingerprint {
    pub len: usize,
    pub series_count: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

/// A shared time axis plus the series sampled on it.
///
/// Immutable once built; a new data load replaces the whole value.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    timestamps: Vec<i64>,
    series: Vec<Series>,
}

impl Dataset {
    pub fn new(timestamps: Vec<i64>, series: Vec<Series>) -> Result<Self, DatasetError> {
        if let Some(i) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DatasetError::UnorderedTimestamps(i + 1));
        }

        for s in &series {
            if s.values.len() != timestamps.len() {
                return Err(DatasetError::LengthMismatch {
                    name: s.name.clone(),
                    expected: timestamps.len(),
                    found: s.values.len(),
                });
            }
        }

        Ok(Self { timestamps, series })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn timestamp(&self, index: usize) -> Option<i64> {
        self.timestamps.get(index).copied()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_at(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            len: self.len(),
            series_count: self.series.len(),
            first_timestamp: self.timestamps.first().copied(),
            last_timestamp: self.timestamps.last().copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// Measures rendered text, supplied by whatever draws the chart.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> Size;
}

pub trait DateFormatter {
    /// Long form, shown in the selection panel.
    fn format(&self, timestamp_ms: i64) -> String;

    /// Short form for the date axis.
    fn format_axis(&self, timestamp_ms: i64) -> String {
        self.format(timestamp_ms)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_series_length_mismatch() {
        let err = Dataset::new(
            vec![0, 1, 2],
            vec![Series::new("a", Color::BLACK, vec![1, 2])],
        )
        .unwrap_err();

        assert_eq!(
            err,
            DatasetError::LengthMismatch {
                name: "a".to_string(),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let err = Dataset::new(vec![0, 5, 5], vec![]).unwrap_err();
        assert_eq!(err, DatasetError::UnorderedTimestamps(2));
    }

    #[test]
    fn parses_kind_tags() {
        assert_eq!("line".parse::<SeriesKind>(), Ok(SeriesKind::Line));
        assert!("bar".parse::<SeriesKind>().is_err());
    }

    #[test]
    fn fingerprint_tracks_axis_bounds() {
        let ds = fixtures::ramp(4);
        let fp = ds.fingerprint();
        assert_eq!(fp.len, 4);
        assert_eq!(fp.series_count, 2);
        assert_eq!(fp.first_timestamp, Some(0));
        assert_eq!(fp.last_timestamp, Some(3 * fixtures::DAY_MS));
    }
}
