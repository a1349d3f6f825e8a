//! Day window filtering and 3-hourly target selection

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::listing::FileRecord;

/// Hours between consecutive daily targets (00:00, 03:00, ... 21:00 UTC)
pub const TARGET_STEP_HOURS: i64 = 3;
pub const TARGETS_PER_DAY: usize = 8;

/// Half-open UTC interval `[start, start + 24h)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            start: day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + TimeDelta::days(1)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end()
    }

    /// The fixed target instants of this day
    pub fn targets(&self) -> [DateTime<Utc>; TARGETS_PER_DAY] {
        std::array::from_fn(|i| self.start + TimeDelta::hours(i as i64 * TARGET_STEP_HOURS))
    }
}

/// Records of `listing` that fall inside `window`, in listing order
pub fn records_for_day(listing: &[FileRecord], window: &DayWindow) -> Vec<FileRecord> {
    listing
        .iter()
        .filter(|rec| window.contains(rec.timestamp))
        .cloned()
        .collect()
}

/// Pick the record nearest to each daily target and drop repeated picks.
///
/// Ties between equidistant records go to the one that comes first in
/// `items_for_day`. The result is in target order with each name appearing
/// once. An empty input yields an empty selection.
pub fn select_targets(items_for_day: &[FileRecord], day_start: DateTime<Utc>) -> Vec<FileRecord> {
    let window = DayWindow { start: day_start };
    let mut seen: HashSet<&str> = HashSet::new();
    let mut chosen = Vec::with_capacity(TARGETS_PER_DAY);

    for target in window.targets() {
        // min_by_key returns the first of several equal minima
        let best = items_for_day
            .iter()
            .min_by_key(|rec| (rec.timestamp - target).abs());

        if let Some(rec) = best {
            if seen.insert(rec.name.as_str()) {
                chosen.push(rec.clone());
            }
        }
    }

    chosen
}
