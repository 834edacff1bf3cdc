pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ipc;
pub mod journal;
pub mod models;
pub mod router;
pub mod store;

pub use analysis::{analyze, analyze_records, AnalysisError, DistributionTable, Peak, PatternReport};
pub use classifier::{
    create_classifier, ChatClassifier, Classification, Classifier, ClassifierConfig,
    ClassifierError,
};
pub use config::MoodConfig;
pub use error::MoodError;
pub use journal::{Journal, JournalError, Submission};
pub use models::{DayOfWeek, MoodRecord, Sentiment, TimeOfDay};
pub use store::{MoodStore, StoreError};
