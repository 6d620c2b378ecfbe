use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chart::DateFormatter;

const FMT_AXIS: &str = "%b %-d";
const FMT_PANEL: &str = "%a, %b %-d";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum UserTimezone {
    #[default]
    Utc,
    Local,
}

impl UserTimezone {
    /// Formats a Unix timestamp (milliseconds) with `fmt` in the selected timezone.
    ///
    /// Returns `None` when the timestamp is out of chrono's range.
    pub fn format_timestamp(&self, timestamp_ms: i64, fmt: &str) -> Option<String> {
        DateTime::from_timestamp_millis(timestamp_ms).map(|datetime| {
            self.with_user_timezone(datetime, |time_with_zone| {
                time_with_zone.format(fmt).to_string()
            })
        })
    }

    fn with_user_timezone<T>(
        &self,
        datetime: DateTime<chrono::Utc>,
        formatter: impl FnOnce(DateTime<chrono::FixedOffset>) -> T,
    ) -> T {
        let time_with_zone = match self {
            UserTimezone::Local => datetime.with_timezone(&chrono::Local).fixed_offset(),
            UserTimezone::Utc => datetime.fixed_offset(),
        };

        formatter(time_with_zone)
    }
}

impl DateFormatter for UserTimezone {
    fn format(&self, timestamp_ms: i64) -> String {
        self.format_timestamp(timestamp_ms, FMT_PANEL)
            .unwrap_or_default()
    }

    fn format_axis(&self, timestamp_ms: i64) -> String {
        self.format_timestamp(timestamp_ms, FMT_AXIS)
            .unwrap_or_default()
    }
}

impl fmt::Display for UserTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserTimezone::Utc => write!(f, "UTC"),
            UserTimezone::Local => {
                let local_offset = chrono::Local::now().offset().local_minus_utc();
                let hours = local_offset / 3600;
                let minutes = (local_offset % 3600) / 60;
                write!(f, "Local (UTC {hours:+03}:{minutes:02})")
            }
        }
    }
}

impl<'de> Deserialize<'de> for UserTimezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let timezone_str = String::deserialize(deserializer)?;
        match timezone_str.to_lowercase().as_str() {
            "utc" => Ok(UserTimezone::Utc),
            "local" => Ok(UserTimezone::Local),
            _ => Err(serde::de::Error::custom("Invalid UserTimezone")),
        }
    }
}

impl Serialize for UserTimezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            UserTimezone::Utc => serializer.serialize_str("UTC"),
            UserTimezone::Local => serializer.serialize_str("Local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2019-03-14T00:00:00Z, a Thursday
    const PI_DAY: i64 = 1_552_521_600_000;

    #[test]
    fn utc_axis_and_panel_formats() {
        let tz = UserTimezone::Utc;
        assert_eq!(tz.format_axis(PI_DAY), "Mar 14");
        assert_eq!(tz.format(PI_DAY), "Thu, Mar 14");
    }

    #[test]
    fn out_of_range_timestamp_formats_empty() {
        assert_eq!(UserTimezone::Utc.format(i64::MAX), "");
    }

    #[test]
    fn serializes_by_name() {
        assert_eq!(
            serde_json::to_string(&UserTimezone::Local).unwrap(),
            r#""Local""#
        );
        let tz: UserTimezone = serde_json::from_str(r#""utc""#).unwrap();
        assert_eq!(tz, UserTimezone::Utc);
    }
}
