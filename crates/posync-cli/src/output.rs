//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use posync_core::{FileOutcome, FileReport, LocaleOutcome, LocalePlan, LocaleReport, SyncReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the outcome of a push or pull
    ///
    /// Quiet mode prints failures only.
    pub fn print_report(&self, report: &SyncReport) {
        match self.format {
            OutputFormat::Human => {
                for warning in &report.warnings {
                    println!("⚠ {}", warning);
                }
                for locale in &report.locales {
                    println!("{}", locale_line(locale));
                    for file in &locale.files {
                        println!("  {}", file_line(file));
                    }
                }
                let failures = report.failure_count();
                if failures == 0 {
                    println!("\n{} complete: {} locale(s)", report.direction, report.locales.len());
                } else {
                    println!("\n{} finished with {} failure(s)", report.direction, failures);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(report).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                for locale in &report.locales {
                    if let LocaleOutcome::Failed { error, .. } = &locale.outcome {
                        eprintln!("{}: {}", locale.locale, error);
                    }
                    for file in &locale.files {
                        if let FileOutcome::Failed { error, .. } = &file.outcome {
                            eprintln!("{}: {}", file.path.display(), error);
                        }
                    }
                }
            }
        }
    }

    /// Print planned layouts
    pub fn print_plans(&self, plans: &[LocalePlan]) {
        match self.format {
            OutputFormat::Human => {
                if plans.is_empty() {
                    println!("No locales configured.");
                    return;
                }
                for plan in plans {
                    println!("{}", plan_line(plan));
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = plans.iter().map(plan_json).collect();
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                for plan in plans {
                    if let Ok(layout) = &plan.plan {
                        println!("{} {}", plan.locale, layout.range());
                    }
                }
            }
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn locale_line(report: &LocaleReport) -> String {
    match &report.outcome {
        LocaleOutcome::Pushed { range, rows } => {
            format!("✓ {}: wrote {} rows to {}", report.locale, rows, range)
        }
        LocaleOutcome::Pulled {
            rows_read,
            rows_dropped,
        } => format!(
            "✓ {}: read {} rows, {} dropped",
            report.locale, rows_read, rows_dropped
        ),
        LocaleOutcome::Skipped { reason } => format!("- {}: skipped ({})", report.locale, reason),
        LocaleOutcome::Failed { error, .. } => format!("✗ {}: {}", report.locale, error),
    }
}

fn file_line(report: &FileReport) -> String {
    match &report.outcome {
        FileOutcome::Updated {
            entries_updated,
            fields_updated,
            ..
        } => format!(
            "✓ {}: {} entries, {} fields updated",
            report.path.display(),
            entries_updated,
            fields_updated
        ),
        FileOutcome::Failed { error, .. } => format!("✗ {}: {}", report.path.display(), error),
    }
}

fn plan_line(plan: &LocalePlan) -> String {
    match &plan.plan {
        Ok(layout) => format!(
            "{}: {} ({} catalogs, {} entries)",
            plan.locale,
            layout.range(),
            plan.catalogs,
            plan.entries
        ),
        Err(e) => format!("{}: ✗ {}", plan.locale, e),
    }
}

fn plan_json(plan: &LocalePlan) -> serde_json::Value {
    match &plan.plan {
        Ok(layout) => serde_json::json!({
            "locale": plan.locale,
            "catalogs": plan.catalogs,
            "entries": plan.entries,
            "range": layout.range().a1(),
            "header": layout.header(),
        }),
        Err(e) => serde_json::json!({
            "locale": plan.locale,
            "catalogs": plan.catalogs,
            "entries": plan.entries,
            "error": e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posync_core::{ColumnDescriptor, LayoutPlan, SyncError};
    use std::path::PathBuf;

    fn layout() -> LayoutPlan {
        LayoutPlan {
            locale: "es".to_string(),
            sheet: "Spanish".to_string(),
            start_row: 1,
            start_col: 1,
            row_count: 3,
            col_count: 3,
            columns: vec![
                ColumnDescriptor::fields("KEY", ["msgid"]),
                ColumnDescriptor::fields("TRANSLATION", ["msgstr"]),
                ColumnDescriptor::static_text("FILE", "{file_name}"),
            ],
            file_name_column: 2,
        }
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_locale_line() {
        let pushed = LocaleReport::new(
            "es",
            LocaleOutcome::Pushed {
                range: "Spanish!A1:C3".into(),
                rows: 3,
            },
        );
        assert_eq!(locale_line(&pushed), "✓ es: wrote 3 rows to Spanish!A1:C3");

        let failed = LocaleReport::failed("fr", &SyncError::remote("quota exceeded"));
        assert!(locale_line(&failed).starts_with("✗ fr: "));
        assert!(locale_line(&failed).contains("quota exceeded"));
    }

    #[test]
    fn test_file_line() {
        let file = FileReport {
            path: PathBuf::from("es/LC_MESSAGES/messages.po"),
            outcome: FileOutcome::Updated {
                backup: PathBuf::from("es/LC_MESSAGES/messages.po.old"),
                entries_updated: 2,
                fields_updated: 3,
            },
        };
        assert_eq!(
            file_line(&file),
            "✓ es/LC_MESSAGES/messages.po: 2 entries, 3 fields updated"
        );
    }

    #[test]
    fn test_plan_output() {
        let ok = LocalePlan {
            locale: "es".to_string(),
            catalogs: 1,
            entries: 2,
            plan: Ok(layout()),
        };
        assert_eq!(plan_line(&ok), "es: Spanish!A1:C3 (1 catalogs, 2 entries)");
        assert_eq!(plan_json(&ok)["range"], "Spanish!A1:C3");
        assert_eq!(plan_json(&ok)["header"][2], "FILE");

        let failed = LocalePlan {
            locale: "de".to_string(),
            catalogs: 0,
            entries: 0,
            plan: Err(SyncError::Config("no file name column".into())),
        };
        assert!(plan_json(&failed)["error"]
            .as_str()
            .unwrap()
            .contains("no file name column"));
    }
}
