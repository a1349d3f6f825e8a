use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta};
use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::clock::Clock;
use crate::error::{GlotecError, Result};

pub const DEFAULT_LIST_URL: &str = "https://services.swpc.noaa.gov/products/glotec/geojson_2d_urt.json";
pub const DEFAULT_BASE_URL: &str = "https://services.swpc.noaa.gov/products/glotec/geojson_2d_urt/";
pub const DEFAULT_USER_AGENT: &str = concat!("ssmd-glotec/", env!("CARGO_PKG_VERSION"));

/// ssmd-glotec: daily GloTEC snapshot fetcher
#[derive(Parser, Debug, Clone)]
#[command(name = "ssmd-glotec")]
#[command(about = "Fetch 3-hourly GloTEC GeoJSON snapshots for one UTC day and prune old day directories")]
pub struct Config {
    /// Output root; each day is stored in <out-dir>/YYYYMMDD
    #[arg(long, env = "OUT_DIR", default_value = "data")]
    pub out_dir: PathBuf,

    /// Target day (YYYYMMDD, UTC). Defaults to yesterday UTC
    #[arg(long, env = "DAY_UTC")]
    pub day_utc: Option<String>,

    /// Number of day directories to keep, counting today (<= 0 disables pruning)
    #[arg(long, env = "KEEP_DAYS", default_value = "30", allow_negative_numbers = true)]
    pub keep_days: i64,

    /// Only log what pruning would remove
    #[arg(long, env = "DRY_RUN_PRUNE", value_parser = BoolishValueParser::new())]
    pub dry_run_prune: bool,

    /// GloTEC listing URL
    #[arg(long, env = "GLOTEC_LIST_URL", default_value = DEFAULT_LIST_URL)]
    pub list_url: String,

    /// Base URL for listing entries that carry no explicit URL
    #[arg(long, env = "GLOTEC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[arg(long, env = "GLOTEC_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "GLOTEC_HTTP_TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Day to fetch: the `day_utc` override, or yesterday according to `clock`
    pub fn target_day(&self, clock: &impl Clock) -> Result<NaiveDate> {
        match self.day_utc.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => parse_day(s),
            None => Ok(clock.today() - TimeDelta::days(1)),
        }
    }
}

/// Parse a strict `YYYYMMDD` day
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    let invalid = || GlotecError::Config(format!("DAY_UTC must be YYYYMMDD, got {:?}", s));

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| invalid())
}
