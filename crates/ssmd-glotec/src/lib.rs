//! ssmd-glotec: daily GloTEC ionosphere snapshot fetcher
//!
//! Downloads the GloTEC GeoJSON snapshots nearest to the eight 3-hourly
//! targets of one UTC day into `<out_dir>/YYYYMMDD/`, writes an `index.json`
//! manifest next to them and prunes day directories outside the retention
//! window.

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod manifest;
pub mod manifest_io;
pub mod prune;
pub mod runner;
pub mod select;

pub use config::Config;
pub use error::{GlotecError, Result};
