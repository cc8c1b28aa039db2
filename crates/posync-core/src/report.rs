//! Outcome summary of a push or pull run
//!
//! Failures are recorded per locale (push) or per file (pull) so that one
//! bad locale or file never stops the rest of the run.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::SyncError;

/// Direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Push,
    Pull,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Push => f.write_str("push"),
            Direction::Pull => f.write_str("pull"),
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub direction: Direction,
    pub locales: Vec<LocaleReport>,
    /// Problems that did not fail any locale (stray or unconfigured catalogs)
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            locales: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Locales and files that failed
    pub fn failure_count(&self) -> usize {
        self.locales
            .iter()
            .map(|l| {
                let own = usize::from(matches!(l.outcome, LocaleOutcome::Failed { .. }));
                let files = l
                    .files
                    .iter()
                    .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
                    .count();
                own + files
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    pub fn locale(&self, code: &str) -> Option<&LocaleReport> {
        self.locales.iter().find(|l| l.locale == code)
    }
}

/// Outcome for one locale
#[derive(Debug, Clone, Serialize)]
pub struct LocaleReport {
    pub locale: String,
    #[serde(flatten)]
    pub outcome: LocaleOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileReport>,
}

impl LocaleReport {
    pub fn new(locale: &str, outcome: LocaleOutcome) -> Self {
        Self {
            locale: locale.to_string(),
            outcome,
            files: Vec::new(),
        }
    }

    pub fn failed(locale: &str, error: &SyncError) -> Self {
        Self::new(locale, LocaleOutcome::failed(error))
    }

    pub fn skipped(locale: &str, reason: impl Into<String>) -> Self {
        Self::new(
            locale,
            LocaleOutcome::Skipped {
                reason: reason.into(),
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocaleOutcome {
    /// Header and rows written
    Pushed { range: String, rows: usize },
    /// Rows read back and merged into the locale's catalogs
    Pulled { rows_read: usize, rows_dropped: usize },
    /// Nothing to do for this locale
    Skipped { reason: String },
    Failed { kind: String, error: String },
}

impl LocaleOutcome {
    pub fn failed(error: &SyncError) -> Self {
        LocaleOutcome::Failed {
            kind: error.kind().to_string(),
            error: error.to_string(),
        }
    }
}

/// Outcome for one catalog file on pull
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// File rewritten from merged entries
    Updated {
        backup: PathBuf,
        entries_updated: usize,
        fields_updated: usize,
    },
    Failed { kind: String, error: String },
}

impl FileOutcome {
    pub fn failed(error: &SyncError) -> Self {
        FileOutcome::Failed {
            kind: error.kind().to_string(),
            error: error.to_string(),
        }
    }
}
