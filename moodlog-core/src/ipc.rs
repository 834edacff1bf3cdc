//! Presentation boundary: commands in, display events out.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisError, PatternReport};
use crate::error::MoodError;
use crate::journal::{JournalError, Submission};
use crate::models::MoodRecord;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MoodCommand {
    Submit { text: String },
    Analyze,
    History { limit: Option<usize> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MoodEvent {
    ResultDisplay(Submission),
    AnalysisDisplay(PatternReport),
    HistoryDisplay { records: Vec<MoodRecord> },
    Info { message: String },
    Error { message: String },
}

impl MoodEvent {
    pub fn info(msg: impl Into<String>) -> Self {
        MoodEvent::Info {
            message: msg.into(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        MoodEvent::Error {
            message: msg.into(),
        }
    }

    /// Informational conditions become `Info`, everything else `Error`.
    pub fn from_error(err: &MoodError) -> Self {
        match err {
            MoodError::Analysis(AnalysisError::NoData) => {
                Self::info("No mood data available for analysis.")
            }
            MoodError::Journal(JournalError::EmptyEntry) => {
                Self::info("Please enter your mood first!")
            }
            other if other.is_informational() => Self::info(other.to_string()),
            other => Self::error(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MoodEvent::Error { .. })
    }
}
