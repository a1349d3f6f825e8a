use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::manifest::Manifest;

pub const MANIFEST_FILE: &str = "index.json";

/// Directory for `day` under `out_dir` (`<out_dir>/YYYYMMDD`), created if missing
pub fn ensure_day_dir(out_dir: &Path, day: NaiveDate) -> Result<PathBuf> {
    let day_dir = out_dir.join(day.format("%Y%m%d").to_string());
    fs::create_dir_all(&day_dir)?;
    Ok(day_dir)
}

/// Write `data` to `<path>.tmp` and rename it onto `path`, so readers never
/// see a partially written file.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp_name: OsString = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Whether `path` already holds a non-empty file
pub fn has_content(path: &Path) -> bool {
    fs::metadata(path)
        .map(|md| md.is_file() && md.len() > 0)
        .unwrap_or(false)
}

/// Write the day manifest as pretty-printed JSON, replacing any previous one
pub fn write_manifest(day_dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let manifest_path = day_dir.join(MANIFEST_FILE);
    let manifest_json = serde_json::to_vec_pretty(manifest)?;
    write_atomic(&manifest_path, &manifest_json)?;
    Ok(manifest_path)
}
