//! Pull: spreadsheet rows back into local catalogs
//!
//! Rows are read below the header until the sheet runs out, traced back to
//! their catalog through the `{file_name}` column and to their entry through
//! the column holding `msgid` (and `msgctxt`, when the layout has one).
//!
//! Merging is deliberately conservative:
//! - only entries that already exist locally are touched; unknown rows are
//!   dropped
//! - only fields the local entry already declares are overwritten
//! - every touched catalog gets a `.old` backup first, even when nothing
//!   changes

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::catalog::{Catalog, CatalogPath, EntryKey, MSGCTXT, MSGID};
use crate::chunk;
use crate::column;
use crate::config::{ColumnDescriptor, LocaleConfig};
use crate::engine::Syncer;
use crate::error::{SyncError, SyncResult};
use crate::layout::{self, LayoutPlan};
use crate::report::{Direction, FileOutcome, FileReport, LocaleOutcome, LocaleReport, SyncReport};
use crate::storage;

/// Where the identifying cells of a row live
#[derive(Debug, Clone, Copy)]
pub struct RowMapping<'c> {
    columns: &'c [ColumnDescriptor],
    key_column: usize,
    context_column: Option<usize>,
    file_name_column: usize,
}

impl<'c> RowMapping<'c> {
    /// Locate the key, context and file name columns of a locale's layout
    pub fn new(plan: &'c LayoutPlan) -> SyncResult<Self> {
        let key_column = plan
            .columns
            .iter()
            .position(|c| c.maps_field(MSGID))
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "locale '{}': no column holds {}, pulled rows cannot be matched to entries",
                    plan.locale, MSGID
                ))
            })?;
        let context_column = plan.columns.iter().position(|c| c.maps_field(MSGCTXT));

        Ok(Self {
            columns: &plan.columns,
            key_column,
            context_column,
            file_name_column: plan.file_name_column,
        })
    }

    /// Catalog file name recorded in `row`
    pub fn file_name(&self, row: &[String]) -> Option<String> {
        let template = self.columns[self.file_name_column].template()?;
        column::extract_file_name(template, row.get(self.file_name_column)?)
    }

    fn msgid<'r>(&self, row: &'r [String]) -> &'r str {
        row.get(self.key_column).map_or("", String::as_str)
    }

    fn context<'r>(&self, row: &'r [String]) -> Option<&'r str> {
        self.context_column
            .and_then(|c| row.get(c))
            .map(String::as_str)
    }
}

/// Counters of one catalog merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub rows_matched: usize,
    pub rows_dropped: usize,
    pub entries_updated: usize,
    pub fields_updated: usize,
}

/// Apply `rows` (in sheet order) to the entries of `catalog`
///
/// When two rows name the same entry the first one wins. Without a
/// context column a `msgid` shared by several entries is ambiguous and
/// its rows are dropped.
pub fn merge_rows(catalog: &mut Catalog, mapping: &RowMapping<'_>, rows: &[Vec<String>]) -> MergeStats {
    let mut by_key: HashMap<EntryKey, usize> = HashMap::new();
    let mut by_msgid: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in catalog.entries.iter().enumerate() {
        if entry.is_header() {
            continue;
        }
        if let Some(key) = entry.key() {
            by_msgid.entry(key.msgid.clone()).or_default().push(idx);
            by_key.insert(key, idx);
        }
    }

    let mut stats = MergeStats::default();
    let mut seen = vec![false; catalog.entries.len()];
    for row in rows {
        let msgid = mapping.msgid(row);
        let target = match mapping.context_column {
            Some(_) => by_key.get(&EntryKey::new(msgid, mapping.context(row))).copied(),
            None => match by_msgid.get(msgid).map(Vec::as_slice) {
                Some([idx]) => Some(*idx),
                _ => None,
            },
        };

        let Some(idx) = target.filter(|&i| !seen[i]) else {
            trace!("Dropping row {:?}", row);
            stats.rows_dropped += 1;
            continue;
        };
        seen[idx] = true;
        stats.rows_matched += 1;

        let entry = &mut catalog.entries[idx];
        let mut changed = 0;
        for (col, descriptor) in mapping.columns.iter().enumerate() {
            let Some(fields) = descriptor.field_names() else {
                continue;
            };
            let Some(name) = column::resolve_field(fields, entry).map(|(name, _)| name.to_string())
            else {
                continue;
            };
            let value = row.get(col).map_or("", String::as_str);
            if entry.update(&name, value) {
                trace!("{}: {} = {:?}", msgid, name, value);
                changed += 1;
            }
        }
        if changed > 0 {
            stats.entries_updated += 1;
            stats.fields_updated += changed;
        }
    }
    stats
}

impl Syncer<'_> {
    /// Pull every configured locale
    ///
    /// Only a missing catalog root fails the whole run; everything else is
    /// recorded in the report.
    pub fn pull(&self) -> SyncResult<SyncReport> {
        info!("Pulling into catalogs under {:?}", self.config.path);
        let mut report = SyncReport::new(Direction::Pull);
        let discovery = self.discover(&mut report)?;

        for (code, locale) in &self.config.locales {
            let files: Vec<&CatalogPath> = discovery.for_locale(code).collect();
            if files.is_empty() {
                info!("Locale {}: no catalogs found, skipping", code);
                report
                    .locales
                    .push(LocaleReport::skipped(code, "no catalogs found"));
                continue;
            }

            let locale_report = self.pull_locale(code, locale, &files).unwrap_or_else(|e| {
                warn!("Locale {}: pull failed: {}", code, e);
                LocaleReport::failed(code, &e)
            });
            report.locales.push(locale_report);
        }

        Ok(report)
    }

    fn pull_locale(
        &self,
        code: &str,
        locale: &LocaleConfig,
        files: &[&CatalogPath],
    ) -> SyncResult<LocaleReport> {
        let plan = layout::plan(code, locale, 0)?;
        let mapping = RowMapping::new(&plan)?;
        plan.ensure_sheet_exists(&self.client.sheet_names()?)?;

        let rows = chunk::read_until_empty(
            self.client,
            &plan.range(),
            plan.data_start_row(),
            self.config.pull_chunk_size,
        )?;

        let width = plan.columns.len();
        let mut rows_read = 0;
        let mut rows_dropped = 0;
        let mut groups: Vec<(String, Vec<Vec<String>>)> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        for mut row in rows {
            if row.iter().all(String::is_empty) {
                continue;
            }
            rows_read += 1;
            row.resize(width, String::new());

            let Some(file_name) = mapping.file_name(&row) else {
                trace!("Dropping row without a file name: {:?}", row);
                rows_dropped += 1;
                continue;
            };
            let idx = match group_index.get(&file_name) {
                Some(&idx) => idx,
                None => {
                    group_index.insert(file_name.clone(), groups.len());
                    groups.push((file_name, Vec::new()));
                    groups.len() - 1
                }
            };
            groups[idx].1.push(row);
        }
        info!("Locale {}: read {} rows from {}", code, rows_read, plan.sheet);

        let mut local: HashMap<String, Vec<&CatalogPath>> = HashMap::new();
        for file in files {
            local.entry(file.file_name()).or_default().push(file);
        }

        let mut file_reports = Vec::new();
        for (file_name, rows) in groups {
            match local.get(&file_name).map(Vec::as_slice) {
                Some([file]) => {
                    let (outcome, dropped) = self.pull_file(&file.path, &mapping, &rows);
                    rows_dropped += dropped;
                    file_reports.push(FileReport {
                        path: file.path.clone(),
                        outcome,
                    });
                }
                Some(matching) if !matching.is_empty() => {
                    let error = SyncError::Config(format!(
                        "locale '{}': {} catalogs are named '{}', rows cannot be assigned",
                        code,
                        matching.len(),
                        file_name
                    ));
                    warn!("{}", error);
                    rows_dropped += rows.len();
                    file_reports.push(FileReport {
                        path: matching[0].path.clone(),
                        outcome: FileOutcome::failed(&error),
                    });
                }
                _ => {
                    debug!(
                        "Locale {}: no local catalog named '{}', dropping {} rows",
                        code,
                        file_name,
                        rows.len()
                    );
                    rows_dropped += rows.len();
                }
            }
        }

        let mut locale_report = LocaleReport::new(
            code,
            LocaleOutcome::Pulled {
                rows_read,
                rows_dropped,
            },
        );
        locale_report.files = file_reports;
        Ok(locale_report)
    }

    /// Merge rows into one catalog, returning its outcome and dropped rows
    fn pull_file(
        &self,
        path: &Path,
        mapping: &RowMapping<'_>,
        rows: &[Vec<String>],
    ) -> (FileOutcome, usize) {
        match self.merge_file(path, mapping, rows) {
            Ok((backup, stats)) => {
                info!(
                    "Updated {:?}: {} entries, {} fields ({} rows dropped)",
                    path, stats.entries_updated, stats.fields_updated, stats.rows_dropped
                );
                let outcome = FileOutcome::Updated {
                    backup,
                    entries_updated: stats.entries_updated,
                    fields_updated: stats.fields_updated,
                };
                (outcome, stats.rows_dropped)
            }
            Err(e) => {
                warn!("Pull into {:?} failed: {}", path, e);
                (FileOutcome::failed(&e), 0)
            }
        }
    }

    fn merge_file(
        &self,
        path: &Path,
        mapping: &RowMapping<'_>,
        rows: &[Vec<String>],
    ) -> SyncResult<(PathBuf, MergeStats)> {
        let bytes = storage::read_file(path)?;
        let backup = storage::write_backup(path, &bytes)?;

        let mut catalog = self.format.parse(path, &bytes)?;
        let stats = merge_rows(&mut catalog, mapping, rows);
        storage::atomic_write(path, &self.format.serialize(&catalog))?;
        Ok((backup, stats))
    }
}
