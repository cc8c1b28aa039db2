//! Push and pull command handlers

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use posync_core::{Config, Direction, GoogleSheetsClient, Syncer};

use crate::output::Output;

/// Run one sync direction over every configured locale
///
/// Fails (non-zero exit) when any locale or file failed, after the full
/// report has been printed.
pub fn run(direction: Direction, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    if config.locales.is_empty() {
        output.message("No locales configured, nothing to do.");
        return Ok(());
    }

    let client = GoogleSheetsClient::from_config(&config)?;
    let syncer = Syncer::new(&config, &client);
    info!("Starting {} ({} locales)", direction, config.locales.len());

    let report = match direction {
        Direction::Push => syncer.push(),
        Direction::Pull => syncer.pull(),
    }
    .with_context(|| format!("{} failed", direction))?;

    output.print_report(&report);

    let failures = report.failure_count();
    if failures > 0 {
        bail!("{} finished with {} failure(s)", direction, failures);
    }
    Ok(())
}
