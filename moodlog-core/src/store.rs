//! Mood record store — append-only CSV log
//!
//! The log is a single CSV file with the header `Timestamp,Mood,Sentiment`.
//! Appending is a read-modify-write of the whole file: existing rows are
//! parsed, the new row is added, and the full log is written to a temporary
//! file in the same directory which then atomically replaces the old one.
//! A corrupt or unreadable log aborts the append without touching the file.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::MoodRecord;

/// Required log columns, in write order.
pub const LOG_COLUMNS: [&str; 3] = ["Timestamp", "Mood", "Sentiment"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No mood log found at {0}")]
    NotFound(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt mood log at line {line}: {message}")]
    Corrupt { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace mood log: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// File-backed, append-only mood log.
#[derive(Debug)]
pub struct MoodStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MoodStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. A missing log is created (with header) on first use.
    pub fn append(&self, record: &MoodRecord) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut records = match self.load_all() {
            Ok(records) => records,
            Err(StoreError::NotFound(_)) => {
                tracing::info!(path = %self.path.display(), "No mood log yet, creating one");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Refusing to append to unreadable mood log");
                return Err(e);
            }
        };

        records.push(record.clone());
        self.write_all(&records)?;

        tracing::debug!(
            path = %self.path.display(),
            total = records.len(),
            sentiment = %record.sentiment,
            "Appended mood record"
        );
        Ok(())
    }

    /// Read every record in append order.
    ///
    /// `NotFound` if the log has never been created; an existing log with no
    /// rows yields an empty vector.
    pub fn load_all(&self) -> Result<Vec<MoodRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        read_records(file)
    }

    fn write_all(&self, records: &[MoodRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file());
            writer.write_record(LOG_COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush().map_err(|e| self.io_error(e))?;
        }
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path)?;

        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn read_records<R: Read>(reader: R) -> Result<Vec<MoodRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        // zero-byte file
        return Ok(Vec::new());
    }
    for column in LOG_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(StoreError::Corrupt {
                line: 1,
                message: format!("missing column '{}'", column),
            });
        }
    }

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<MoodRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(StoreError::Csv(e)),
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(idx as u64 + 2);
                return Err(StoreError::Corrupt {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(records)
}
