//! posync CLI
//!
//! Command-line interface for posync - gettext catalogs to spreadsheet and back.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use posync_core::Direction;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "posync")]
#[command(about = "Keep gettext catalogs in sync with a spreadsheet")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to $POSYNC_CONFIG, then ./posync.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log detail: -v per chunk, -vv per row
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Upload local catalogs to the spreadsheet
    Push,
    /// Merge spreadsheet rows back into local catalogs
    Pull,
    /// Show where each locale would be written, without contacting the spreadsheet
    Plan,
    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Push => commands::sync::run(Direction::Push, config_path, &output),
        Commands::Pull => commands::sync::run(Direction::Pull, config_path, &output),
        Commands::Plan => commands::plan::show(config_path, &output),
        Commands::Config => commands::config::show(config_path, &output),
    }
}

/// Log level for the given flags
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    }
}

/// Log to stderr; RUST_LOG takes precedence over the verbosity flags
fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("posync_core={},posync_cli={}", level, level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["posync", "push"]).unwrap();
        assert_eq!(cli.command, Commands::Push);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["posync", "pull", "--config", "l10n.json"]).unwrap();
        assert_eq!(cli.command, Commands::Pull);
        assert_eq!(cli.config, Some(PathBuf::from("l10n.json")));
    }

    #[test]
    fn test_verbosity_count() {
        let cli = Cli::try_parse_from(["posync", "-vv", "pull"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose, cli.quiet), "trace");

        let cli = Cli::try_parse_from(["posync", "plan", "-v"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), "debug");
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::try_parse_from(["posync", "-v", "-q", "push"]).unwrap();
        assert_eq!(log_level(cli.verbose, cli.quiet), "warn");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["posync"]).is_err());
        assert!(Cli::try_parse_from(["posync", "sync"]).is_err());
    }
}
