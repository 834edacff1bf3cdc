use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::journal::JournalError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum MoodError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid path {path}: {message}")]
    Path { path: String, message: String },
}

impl MoodError {
    /// Conditions the user should be told about, not warned about.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            MoodError::Analysis(AnalysisError::NoData)
                | MoodError::Journal(JournalError::EmptyEntry)
        )
    }
}
