use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse emotional category assigned to a mood entry.
///
/// Deserialization never fails: any label outside the vocabulary becomes
/// `Unknown`, so older logs with free-form labels still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Sentiment {
    Happy,
    Sad,
    Neutral,
    Unknown,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Happy,
        Sentiment::Sad,
        Sentiment::Neutral,
        Sentiment::Unknown,
    ];

    /// Reduce a model reply (or a stored label) to the fixed vocabulary.
    ///
    /// Whitespace, wrapping quotes and a trailing full stop are ignored and the
    /// match is case-insensitive. Everything else maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let cleaned = label
            .trim()
            .trim_end_matches('.')
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .trim();

        match cleaned.to_ascii_lowercase().as_str() {
            "happy" => Sentiment::Happy,
            "sad" => Sentiment::Sad,
            "neutral" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Happy => "happy",
            Sentiment::Sad => "sad",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Sentiment::Unknown
    }
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        Sentiment::from_label(&label)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
