//! One fetch run: listing -> day selection -> downloads -> manifest -> prune

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::listing::{parse_listing, FileRecord};
use crate::manifest::Manifest;
use crate::manifest_io::{ensure_day_dir, has_content, write_atomic, write_manifest};
use crate::prune::{prune_day_dirs, PruneSummary};
use crate::select::{records_for_day, select_targets, DayWindow};

/// What a run did
#[derive(Debug)]
pub struct RunReport {
    pub day: NaiveDate,
    pub day_dir: PathBuf,
    /// Valid records in the whole listing
    pub listed: usize,
    /// Records inside the target day
    pub for_day: usize,
    /// Selected records, in manifest order
    pub saved: Vec<FileRecord>,
    pub fetched: usize,
    pub skipped: usize,
    /// `None` when the day had no records
    pub manifest_path: Option<PathBuf>,
    pub prune: PruneSummary,
}

/// Local file name for a record; only the last path component of the name is used
fn local_file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}

/// Fetch the target day's snapshots into `<out_dir>/YYYYMMDD`, write its
/// manifest and prune old day directories.
///
/// A day without any listed records is not an error: nothing is downloaded,
/// no manifest is written, and pruning still runs.
pub async fn run(config: &Config, fetcher: &impl Fetcher, clock: &impl Clock) -> Result<RunReport> {
    let day = config.target_day(clock)?;
    let window = DayWindow::new(day);
    let day_dir = ensure_day_dir(&config.out_dir, day)?;

    info!(day = %day, day_dir = ?day_dir, list_url = %config.list_url, "Fetching listing");
    let payload = fetcher.fetch(&config.list_url).await?;
    let listing = parse_listing(&payload, &config.base_url)?;
    let items_for_day = records_for_day(&listing, &window);

    info!(
        listed = listing.len(),
        for_day = items_for_day.len(),
        "Parsed listing"
    );

    if items_for_day.is_empty() {
        warn!(day = %day.format("%Y%m%d"), "No items found for day (UTC)");
        let prune = prune_day_dirs(&config.out_dir, config.keep_days, config.dry_run_prune, clock.today())?;
        return Ok(RunReport {
            day,
            day_dir,
            listed: listing.len(),
            for_day: 0,
            saved: Vec::new(),
            fetched: 0,
            skipped: 0,
            manifest_path: None,
            prune,
        });
    }

    let chosen = select_targets(&items_for_day, window.start);
    let mut manifest = Manifest::new(day, &config.list_url);
    let mut fetched = 0;
    let mut skipped = 0;

    for record in &chosen {
        let dest = day_dir.join(local_file_name(&record.name));
        if has_content(&dest) {
            info!(path = ?dest, "Skipping existing file");
            skipped += 1;
        } else {
            info!(url = %record.url, path = ?dest, "Downloading");
            let data = fetcher.fetch(&record.url).await?;
            write_atomic(&dest, &data)?;
            fetched += 1;
        }
        manifest.push(record);
    }

    let manifest_path = write_manifest(&day_dir, &manifest)?;
    info!(
        saved = manifest.saved.len(),
        fetched = fetched,
        skipped = skipped,
        day_dir = ?day_dir,
        "Saved day snapshots"
    );

    let prune = prune_day_dirs(&config.out_dir, config.keep_days, config.dry_run_prune, clock.today())?;

    Ok(RunReport {
        day,
        day_dir,
        listed: listing.len(),
        for_day: items_for_day.len(),
        saved: chosen,
        fetched,
        skipped,
        manifest_path: Some(manifest_path),
        prune,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use clap::Parser;
    use tempfile::TempDir;

    use crate::clock::FixedClock;
    use crate::error::GlotecError;

    const LIST_URL: &str = "http://glotec.test/list.json";
    const BASE_URL: &str = "http://glotec.test/files/";

    /// In-memory fetcher that records every requested URL
    struct StubFetcher {
        bodies: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(listing: serde_json::Value) -> Self {
            let mut bodies = HashMap::new();
            bodies.insert(LIST_URL.to_string(), serde_json::to_vec(&listing).unwrap());
            Self {
                bodies,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn with_file(mut self, name: &str, body: &[u8]) -> Self {
            self.bodies.insert(format!("{}{}", BASE_URL, name), body.to_vec());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Bytes> {
            self.requests.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .map(|b| Bytes::from(b.clone()))
                .ok_or_else(|| GlotecError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn config(out_dir: &Path, day: &str) -> Config {
        let out = out_dir.to_str().unwrap();
        Config::try_parse_from([
            "ssmd-glotec",
            "--out-dir",
            out,
            "--day-utc",
            day,
            "--keep-days",
            "30",
            "--list-url",
            LIST_URL,
            "--base-url",
            BASE_URL,
        ])
        .unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 1, 16, 6, 0, 0).unwrap())
    }

    fn name(hour: u32) -> String {
        format!("glotec_icao_20240115T{:02}0000Z.geojson", hour)
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("glotec_icao_20240115T000000Z.geojson"), "glotec_icao_20240115T000000Z.geojson");
        assert_eq!(local_file_name("a/b/glotec_icao_20240115T000000Z.geojson"), "glotec_icao_20240115T000000Z.geojson");
    }

    #[tokio::test]
    async fn test_run_downloads_selected_files() {
        let tmp = TempDir::new().unwrap();
        let listing: Vec<String> = (0..24).map(name).collect();
        let mut fetcher = StubFetcher::new(serde_json::json!(listing));
        for h in (0..24).step_by(3) {
            fetcher = fetcher.with_file(&name(h), format!("body-{}", h).as_bytes());
        }

        let report = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap();

        assert_eq!(report.listed, 24);
        assert_eq!(report.for_day, 24);
        assert_eq!(report.saved.len(), 8);
        assert_eq!(report.fetched, 8);
        assert_eq!(report.skipped, 0);

        let day_dir = tmp.path().join("20240115");
        assert_eq!(report.day_dir, day_dir);
        for h in (0..24).step_by(3) {
            let content = std::fs::read(day_dir.join(name(h))).unwrap();
            assert_eq!(content, format!("body-{}", h).into_bytes());
        }

        let manifest: Manifest =
            serde_json::from_slice(&std::fs::read(day_dir.join("index.json")).unwrap()).unwrap();
        assert_eq!(manifest.day_utc, "2024-01-15");
        assert_eq!(manifest.source_list, LIST_URL);
        let ts: Vec<&str> = manifest.saved.iter().map(|s| s.ts_utc.as_str()).collect();
        assert_eq!(
            ts,
            vec![
                "2024-01-15T00:00:00Z",
                "2024-01-15T03:00:00Z",
                "2024-01-15T06:00:00Z",
                "2024-01-15T09:00:00Z",
                "2024-01-15T12:00:00Z",
                "2024-01-15T15:00:00Z",
                "2024-01-15T18:00:00Z",
                "2024-01-15T21:00:00Z",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_skips_existing_files() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::new(serde_json::json!([name(1), name(2)]))
            .with_file(&name(1), b"one")
            .with_file(&name(2), b"two");

        let day_dir = tmp.path().join("20240115");
        std::fs::create_dir_all(&day_dir).unwrap();
        std::fs::write(day_dir.join(name(1)), b"already here").unwrap();

        let report = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap();
        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.skipped, 1);

        assert_eq!(std::fs::read(day_dir.join(name(1))).unwrap(), b"already here");
        assert_eq!(std::fs::read(day_dir.join(name(2))).unwrap(), b"two");
        assert_eq!(
            fetcher.requests(),
            vec![LIST_URL.to_string(), format!("{}{}", BASE_URL, name(2))]
        );
    }

    #[tokio::test]
    async fn test_run_refetches_empty_file() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::new(serde_json::json!([name(0)])).with_file(&name(0), b"zero");

        let day_dir = tmp.path().join("20240115");
        std::fs::create_dir_all(&day_dir).unwrap();
        std::fs::write(day_dir.join(name(0)), b"").unwrap();

        let report = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(std::fs::read(day_dir.join(name(0))).unwrap(), b"zero");
    }

    #[tokio::test]
    async fn test_run_empty_day_still_prunes() {
        let tmp = TempDir::new().unwrap();
        let old = tmp.path().join("20230101");
        std::fs::create_dir_all(&old).unwrap();

        let fetcher = StubFetcher::new(serde_json::json!(["glotec_icao_20240114T000000Z.geojson"]));
        let report = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap();

        assert_eq!(report.listed, 1);
        assert_eq!(report.for_day, 0);
        assert!(report.saved.is_empty());
        assert!(report.manifest_path.is_none());
        assert_eq!(report.prune.removed, 1);
        assert!(!old.exists());
        assert!(tmp.path().join("20240115").is_dir());
        assert!(!tmp.path().join("20240115").join("index.json").exists());
    }

    #[tokio::test]
    async fn test_run_defaults_to_yesterday() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::new(serde_json::json!([name(12)])).with_file(&name(12), b"noon");
        let mut cfg = config(tmp.path(), "20240115");
        cfg.day_utc = None;

        let report = run(&cfg, &fetcher, &clock()).await.unwrap();
        assert_eq!(report.day, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(report.saved.len(), 1);
    }

    #[tokio::test]
    async fn test_run_bad_day_fails_before_io() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::new(serde_json::json!([]));

        let err = run(&config(tmp.path(), "2024-01-15"), &fetcher, &clock()).await.unwrap_err();
        assert!(matches!(err, GlotecError::Config(_)));
        assert!(fetcher.requests().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_propagates_file_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        // listed but not served
        let fetcher = StubFetcher::new(serde_json::json!([name(0)]));

        let err = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap_err();
        assert!(matches!(err, GlotecError::HttpStatus { status: 404, .. }));
        assert!(!tmp.path().join("20240115").join("index.json").exists());
    }

    #[tokio::test]
    async fn test_run_listing_not_array() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::new(serde_json::json!({"error": "maintenance"}));

        let err = run(&config(tmp.path(), "20240115"), &fetcher, &clock()).await.unwrap_err();
        assert!(matches!(err, GlotecError::Format(_)));
    }
}
