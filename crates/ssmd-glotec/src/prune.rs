//! Retention pruning of `YYYYMMDD` day directories

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;

static DAY_DIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid day dir regex"));

/// Outcome of a prune pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneSummary {
    /// Day directories (8-digit names) that were looked at
    pub scanned: usize,
    /// Directories removed, or that would be removed on a dry run
    pub removed: usize,
    pub keep_days: i64,
    /// Oldest retained date; `None` when pruning is disabled
    pub cutoff: Option<NaiveDate>,
    pub dry_run: bool,
}

/// First date kept for a `keep_days` window ending on (and including) `today`
pub fn cutoff_date(today: NaiveDate, keep_days: i64) -> NaiveDate {
    TimeDelta::try_days(keep_days - 1)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN)
}

/// Remove day directories under `root` dated before the retention cutoff.
///
/// Only immediate children whose name is exactly eight digits are considered.
/// Names that are not a calendar date are left alone. Removal is best effort:
/// failures inside a directory tree are ignored.
pub fn prune_day_dirs(root: &Path, keep_days: i64, dry_run: bool, today: NaiveDate) -> Result<PruneSummary> {
    let mut summary = PruneSummary {
        scanned: 0,
        removed: 0,
        keep_days,
        cutoff: None,
        dry_run,
    };

    if keep_days <= 0 {
        info!(keep_days = keep_days, "Pruning disabled (keep_days <= 0)");
        return Ok(summary);
    }

    let cutoff = cutoff_date(today, keep_days);
    summary.cutoff = Some(cutoff);

    if !root.is_dir() {
        info!(root = ?root, "Prune root does not exist, nothing to prune");
        log_summary(&summary);
        return Ok(summary);
    }

    let mut names: Vec<String> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    for name in names {
        let path = root.join(&name);
        if !path.is_dir() || !DAY_DIR_RE.is_match(&name) {
            continue;
        }

        summary.scanned += 1;

        let Ok(date) = NaiveDate::parse_from_str(&name, "%Y%m%d") else {
            continue;
        };

        if date < cutoff {
            if dry_run {
                info!(path = ?path, date = %date, cutoff = %cutoff, "Would remove day directory (dry run)");
            } else {
                info!(path = ?path, date = %date, cutoff = %cutoff, "Removing day directory");
                if let Err(e) = fs::remove_dir_all(&path) {
                    warn!(path = ?path, error = %e, "Day directory not fully removed");
                }
            }
            summary.removed += 1;
        }
    }

    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &PruneSummary) {
    info!(
        scanned = summary.scanned,
        removed = summary.removed,
        keep_days = summary.keep_days,
        cutoff = ?summary.cutoff,
        dry_run = summary.dry_run,
        "Prune summary"
    );
}
