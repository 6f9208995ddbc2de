//! User feedback log
//!
//! Feedback is kept as a flat JSON array of records in a single file. Each
//! append reads the whole list, pushes the new record and rewrites the file
//! through a temporary sibling. There is no locking; concurrent writers can
//! lose records.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{Result, SunpathError};

/// One submitted piece of feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Build a record, rejecting an empty name or text
    pub fn new(name: &str, text: &str, timestamp: DateTime<Utc>) -> Result<Self> {
        let name = name.trim();
        let text = text.trim();
        if name.is_empty() {
            return Err(SunpathError::InvalidInput("Feedback name is empty".to_string()));
        }
        if text.is_empty() {
            return Err(SunpathError::InvalidInput("Feedback text is empty".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
            timestamp,
        })
    }
}

/// Append-only feedback file
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in submission order; a missing file is an empty log
    pub fn records(&self) -> Result<Vec<FeedbackRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SunpathError::IoError(e)),
        };
        let records = serde_json::from_reader(BufReader::new(file))?;
        Ok(records)
    }

    /// Append a record now
    pub fn submit(&self, name: &str, text: &str) -> Result<FeedbackRecord> {
        let record = FeedbackRecord::new(name, text, Utc::now())?;
        self.append(record.clone())?;
        Ok(record)
    }

    /// Append a record and rewrite the file; returns the new record count
    pub fn append(&self, record: FeedbackRecord) -> Result<usize> {
        let mut records = self.records()?;
        records.push(record);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write a sibling file, then rename it over the log
        let temp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, &records)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&temp_path, &self.path)?;

        info!(
            "Saved feedback #{} to {}",
            records.len(),
            self.path.display()
        );
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.json"));
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("nested").join("feedback.json"));

        let first = FeedbackRecord::new("Ada", "Lovely arcs", at(9)).unwrap();
        let second = FeedbackRecord::new(" Bo ", " Add moon? ", at(10)).unwrap();
        assert_eq!(log.append(first.clone()).unwrap(), 1);
        assert_eq!(log.append(second.clone()).unwrap(), 2);

        let records = log.records().unwrap();
        assert_eq!(records, vec![first, second]);
        assert_eq!(records[1].name, "Bo");
        assert_eq!(records[1].text, "Add moon?");
        assert!(!log.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_file_is_a_json_array() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.json"));
        log.submit("Cy", "Works offline").unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "Cy");
        assert!(entries[0]["timestamp"].is_string());
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        assert!(FeedbackRecord::new("", "text", at(9)).is_err());
        assert!(FeedbackRecord::new("name", "   ", at(9)).is_err());

        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.json"));
        assert!(log.submit("name", "").is_err());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_corrupt_log_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FeedbackLog::new(&path).records(),
            Err(SunpathError::JsonError(_))
        ));
    }
}
