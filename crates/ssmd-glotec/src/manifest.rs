use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::FileRecord;

/// Per-day `index.json` describing the snapshots selected for that day
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// `YYYY-MM-DD`
    pub day_utc: String,
    pub source_list: String,
    pub saved: Vec<SavedFile>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub ts_utc: String,
    pub url: String,
}

impl Manifest {
    pub fn new(day: NaiveDate, source_list: &str) -> Self {
        Self {
            day_utc: day.format("%Y-%m-%d").to_string(),
            source_list: source_list.to_string(),
            saved: Vec::new(),
        }
    }

    pub fn push(&mut self, record: &FileRecord) {
        self.saved.push(SavedFile::from(record));
    }
}

impl From<&FileRecord> for SavedFile {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            ts_utc: format_ts_utc(&record.timestamp),
            url: record.url.clone(),
        }
    }
}

pub fn format_ts_utc(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
