//! Config command handler

use std::path::Path;

use anyhow::{Context, Result};

use posync_core::Config;

use crate::output::{Output, OutputFormat};

/// Placeholder shown instead of the access token
const REDACTED: &str = "(redacted)";

/// Copy of `config` that is safe to print
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.access_token.is_some() {
        config.access_token = Some(REDACTED.to_string());
    }
    config
}

/// Show the effective configuration (file plus environment overrides)
pub fn show(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = redacted(&Config::load(config_path).context("Failed to load configuration")?);

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Quiet => {
            println!("{}", config.path.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  path:            {}", config.path.display());
            println!(
                "  spreadsheet_id:  {}",
                if config.spreadsheet_id.is_empty() {
                    "(not set)"
                } else {
                    config.spreadsheet_id.as_str()
                }
            );
            println!("  pull_chunk_size: {}", config.pull_chunk_size);
            println!("  push_chunk_size: {}", config.push_chunk_size());
            println!(
                "  access_token:    {}",
                config.access_token.as_deref().unwrap_or("(not set)")
            );
            for (code, locale) in &config.locales {
                let headers: Vec<&str> = locale
                    .columns
                    .iter()
                    .map(|c| c.header.as_deref().unwrap_or("(no header)"))
                    .collect();
                println!(
                    "  locale {}: sheet '{}', offset ({}, {}), columns [{}]",
                    code,
                    locale.sheet,
                    locale.row_offset,
                    locale.column_offset,
                    headers.join(", ")
                );
            }
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}
