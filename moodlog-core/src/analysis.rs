//! Pattern aggregator — when does the user feel happiest or saddest?
//!
//! Reads the full mood log, buckets every record by day of week and time of
//! day, cross-tabulates bucket × sentiment and picks the peak bucket for
//! `happy` (per day and per time of day) and `sad` (per time of day).
//!
//! Ties go to the first bucket in canonical order (Monday..Sunday,
//! Morning..Night). A sentiment with no records yields "Not enough data".

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{DayOfWeek, MoodRecord, Sentiment, TimeOfDay};
use crate::store::{MoodStore, StoreError};

/// Label used when no record carries the sentiment being ranked.
pub const NOT_ENOUGH_DATA: &str = "Not enough data";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No mood data available for analysis")]
    NoData,

    #[error("Failed to read mood log: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AnalysisError::NoData,
            other => AnalysisError::Storage(other),
        }
    }
}

// ============================================================================
// Distribution table
// ============================================================================

/// Count of records per (bucket, sentiment). Only observed buckets have rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DistributionTable<K: Ord> {
    rows: BTreeMap<K, BTreeMap<Sentiment, u32>>,
}

impl<K: Ord + Copy> DistributionTable<K> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    fn add(&mut self, bucket: K, sentiment: Sentiment) {
        *self
            .rows
            .entry(bucket)
            .or_default()
            .entry(sentiment)
            .or_insert(0) += 1;
    }

    pub fn count(&self, bucket: K, sentiment: Sentiment) -> u32 {
        self.rows
            .get(&bucket)
            .and_then(|row| row.get(&sentiment))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, bucket: K) -> u32 {
        self.rows
            .get(&bucket)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    /// Observed buckets in canonical order.
    pub fn buckets(&self) -> Vec<K> {
        self.rows.keys().copied().collect()
    }

    /// Sentiments that appear anywhere in the table, in canonical order.
    pub fn sentiments(&self) -> Vec<Sentiment> {
        Sentiment::ALL
            .into_iter()
            .filter(|s| self.rows.values().any(|row| row.contains_key(s)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bucket with the highest count for `sentiment`; first wins on ties.
    pub fn peak(&self, sentiment: Sentiment) -> Peak<K> {
        let mut best = Peak::none();
        for bucket in self.rows.keys() {
            let count = self.count(*bucket, sentiment);
            if count > best.count {
                best = Peak {
                    bucket: Some(*bucket),
                    count,
                };
            }
        }
        best
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Peak<K> {
    pub bucket: Option<K>,
    pub count: u32,
}

impl<K> Peak<K> {
    fn none() -> Self {
        Self {
            bucket: None,
            count: 0,
        }
    }
}

impl<K: fmt::Display> fmt::Display for Peak<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bucket {
            Some(bucket) => write!(f, "{}", bucket),
            None => f.write_str(NOT_ENOUGH_DATA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternReport {
    pub total_records: usize,
    pub happiest_day: Peak<DayOfWeek>,
    pub happiest_time: Peak<TimeOfDay>,
    pub saddest_time: Peak<TimeOfDay>,
    pub day_distribution: DistributionTable<DayOfWeek>,
    pub time_distribution: DistributionTable<TimeOfDay>,
}

/// Load the whole log and aggregate it.
pub fn analyze(store: &MoodStore) -> Result<PatternReport, AnalysisError> {
    let records = store.load_all()?;
    let report = analyze_records(&records)?;

    tracing::info!(
        records = report.total_records,
        happiest_day = %report.happiest_day,
        happiest_time = %report.happiest_time,
        saddest_time = %report.saddest_time,
        "Mood pattern analysis complete"
    );

    Ok(report)
}

/// Pure aggregation over an already-loaded log.
pub fn analyze_records(records: &[MoodRecord]) -> Result<PatternReport, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let mut day_distribution = DistributionTable::new();
    let mut time_distribution = DistributionTable::new();
    for record in records {
        day_distribution.add(record.day_of_week(), record.sentiment);
        time_distribution.add(record.time_of_day(), record.sentiment);
    }

    Ok(PatternReport {
        total_records: records.len(),
        happiest_day: day_distribution.peak(Sentiment::Happy),
        happiest_time: time_distribution.peak(Sentiment::Happy),
        saddest_time: time_distribution.peak(Sentiment::Sad),
        day_distribution,
        time_distribution,
    })
}
