//! Remote GloTEC directory listing parser
//!
//! The listing endpoint returns a JSON array whose elements are either bare
//! file names or objects carrying a name-like field and an optional URL.
//! Entries that cannot be turned into a timestamped GloTEC record are skipped.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GlotecError, Result};

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"glotec_icao_(\d{8})T(\d{6})Z\.geojson$").expect("valid filename regex")
});

/// A downloadable snapshot from the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// Raw listing element as published
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingEntry {
    Name(String),
    Record(RecordEntry),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

impl ListingEntry {
    /// Resolve (name, url), deriving the URL from `base_url` when none is given
    pub fn name_and_url(self, base_url: &str) -> Option<(String, String)> {
        match self {
            ListingEntry::Name(name) if !name.is_empty() => {
                let url = format!("{}{}", base_url, name);
                Some((name, url))
            }
            ListingEntry::Record(rec) => {
                let name = first_present([rec.name, rec.file, rec.filename, rec.path])?;
                let url = first_present([rec.url, rec.href])
                    .unwrap_or_else(|| format!("{}{}", base_url, name));
                Some((name, url))
            }
            _ => None,
        }
    }

    pub fn into_record(self, base_url: &str) -> Option<FileRecord> {
        let (name, url) = self.name_and_url(base_url)?;
        let timestamp = filename_timestamp(&name)?;
        Some(FileRecord {
            name,
            url,
            timestamp,
        })
    }
}

/// UTC instant encoded in a GloTEC file name (`glotec_icao_YYYYMMDDTHHMMSSZ.geojson`)
pub fn filename_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let caps = FILENAME_RE.captures(name)?;
    let token = format!("{}{}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&token, "%Y%m%d%H%M%S")
        .ok()
        .map(|ndt| ndt.and_utc())
}

/// Parse a raw listing payload into records sorted by ascending timestamp.
///
/// Records with equal timestamps keep their listing order.
pub fn parse_listing(payload: &[u8], base_url: &str) -> Result<Vec<FileRecord>> {
    let value: Value = serde_json::from_slice(payload)?;
    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(GlotecError::Format(format!(
                "listing is not a JSON array (got {})",
                json_kind(&other)
            )))
        }
    };

    let mut records: Vec<FileRecord> = elements
        .into_iter()
        .filter(|element| element.is_string() || element.is_object())
        .filter_map(|element| serde_json::from_value::<ListingEntry>(element).ok())
        .filter_map(|entry| entry.into_record(base_url))
        .collect();

    records.sort_by_key(|rec| rec.timestamp);
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
