use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::bucket::{DayOfWeek, TimeOfDay};
use super::sentiment::Sentiment;

/// On-disk timestamp layout, local clock, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One journaling event. Column names match the log header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRecord {
    #[serde(rename = "Timestamp", with = "log_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Mood")]
    pub raw_text: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
}

impl MoodRecord {
    /// Create a record stamped with the current local time.
    pub fn new(raw_text: impl Into<String>, sentiment: Sentiment) -> Self {
        let now = Local::now().naive_local();
        Self::at(now, raw_text, sentiment)
    }

    /// Create a record at a given time (sub-second part is dropped).
    pub fn at(timestamp: NaiveDateTime, raw_text: impl Into<String>, sentiment: Sentiment) -> Self {
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        Self {
            timestamp,
            raw_text: raw_text.into(),
            sentiment,
        }
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from(self.timestamp.weekday())
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.timestamp.hour())
    }
}

mod log_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}
