//! ssmd-glotec binary entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ssmd_glotec::clock::SystemClock;
use ssmd_glotec::fetch::HttpFetcher;
use ssmd_glotec::runner::run;
use ssmd_glotec::{Config, Result};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!(
        out_dir = ?config.out_dir,
        day_utc = ?config.day_utc,
        keep_days = config.keep_days,
        dry_run_prune = config.dry_run_prune,
        list_url = %config.list_url,
        "Starting GloTEC fetch"
    );

    match execute(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "GloTEC fetch failed");
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(config: &Config) -> Result<()> {
    // every request is awaited in turn, a single thread is all we need
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
    let report = runtime.block_on(run(config, &fetcher, &SystemClock))?;

    info!(
        day = %report.day,
        saved = report.saved.len(),
        fetched = report.fetched,
        skipped = report.skipped,
        pruned = report.prune.removed,
        "GloTEC fetch complete"
    );
    Ok(())
}
