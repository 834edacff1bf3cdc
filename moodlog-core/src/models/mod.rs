pub mod bucket;
pub mod record;
pub mod sentiment;

pub use bucket::{DayOfWeek, TimeOfDay};
pub use record::{MoodRecord, TIMESTAMP_FORMAT};
pub use sentiment::Sentiment;
