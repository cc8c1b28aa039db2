//! Plan command handler

use std::path::Path;

use anyhow::{bail, Context, Result};

use posync_core::{plan_locales, Config, PoFormat};

use crate::output::Output;

/// Show the planned layout of every configured locale
pub fn show(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let plans = plan_locales(&config, &PoFormat)?;

    output.print_plans(&plans);

    let failed = plans.iter().filter(|p| p.plan.is_err()).count();
    if failed > 0 {
        bail!("{} locale(s) cannot be laid out", failed);
    }
    Ok(())
}
