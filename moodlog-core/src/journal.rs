//! Journal — the submit flow tying classifier and store together.
//!
//! A submission is classified, then recorded. Classification problems never
//! stop the entry from being saved: the record falls back to `unknown` and the
//! submission carries a notice for the user. Storage problems abort.

use serde::Serialize;
use thiserror::Error;

use crate::analysis::{self, AnalysisError, PatternReport};
use crate::classifier::{Classification, Classifier};
use crate::models::{MoodRecord, Sentiment};
use crate::store::{MoodStore, StoreError};

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Mood entry is empty")]
    EmptyEntry,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Outcome of one accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub record: MoodRecord,
    /// `None` when the classification service failed or is not configured.
    pub classification: Option<Classification>,
    /// User-facing note explaining a degraded record.
    pub notice: Option<String>,
}

impl Submission {
    pub fn is_degraded(&self) -> bool {
        self.classification.is_none()
    }
}

pub struct Journal {
    store: MoodStore,
    classifier: Option<Box<dyn Classifier>>,
}

impl Journal {
    pub fn new(store: MoodStore, classifier: Option<Box<dyn Classifier>>) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &MoodStore {
        &self.store
    }

    /// Classify and record one mood statement.
    pub async fn submit(&self, text: &str) -> Result<Submission, JournalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::EmptyEntry);
        }

        let (classification, notice) = match &self.classifier {
            Some(classifier) => match classifier.classify(text).await {
                Ok(c) => {
                    tracing::info!(
                        classifier = classifier.name(),
                        sentiment = %c.sentiment,
                        suggestions = c.activity_suggestions.len(),
                        "Mood classified"
                    );
                    (Some(c), None)
                }
                Err(e) => {
                    tracing::warn!(
                        classifier = classifier.name(),
                        error = %e,
                        "Classification failed, saving entry without a mood label"
                    );
                    (
                        None,
                        Some(format!(
                            "Mood analysis is temporarily unavailable ({}). Your entry was saved.",
                            e
                        )),
                    )
                }
            },
            None => (
                None,
                Some(
                    "Mood analysis is not configured (no API key). Your entry was saved."
                        .to_string(),
                ),
            ),
        };

        let sentiment = classification
            .as_ref()
            .map(|c| c.sentiment)
            .unwrap_or(Sentiment::Unknown);
        let record = MoodRecord::new(text, sentiment);
        self.store.append(&record)?;

        Ok(Submission {
            record,
            classification,
            notice,
        })
    }

    pub fn analyze(&self) -> Result<PatternReport, AnalysisError> {
        analysis::analyze(&self.store)
    }

    /// The most recent `limit` records, oldest first. A missing log is empty.
    pub fn history(&self, limit: usize) -> Result<Vec<MoodRecord>, StoreError> {
        let mut records = match self.store.load_all() {
            Ok(records) => records,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }
}
