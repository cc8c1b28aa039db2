//! Push: local catalogs to the spreadsheet
//!
//! Every configured locale is handled on its own: its catalogs are parsed,
//! laid out as one header row plus one row per entry and written to the
//! locale's sheet in chunks. A locale that fails is reported and the run
//! moves on to the next one.

use tracing::{debug, info, trace, warn};

use crate::catalog::{Catalog, CatalogPath};
use crate::chunk;
use crate::column::{self, Metadata};
use crate::config::{ColumnDescriptor, LocaleConfig};
use crate::engine::Syncer;
use crate::error::SyncResult;
use crate::layout;
use crate::report::{Direction, LocaleOutcome, LocaleReport, SyncReport};

impl Syncer<'_> {
    /// Push every configured locale
    ///
    /// Only a missing catalog root fails the whole run; everything else is
    /// recorded in the report.
    pub fn push(&self) -> SyncResult<SyncReport> {
        info!("Pushing catalogs under {:?}", self.config.path);
        let mut report = SyncReport::new(Direction::Push);
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

            let outcome = match self.push_locale(code, locale, &files) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Locale {}: push failed: {}", code, e);
                    LocaleOutcome::failed(&e)
                }
            };
            report.locales.push(LocaleReport::new(code, outcome));
        }

        Ok(report)
    }

    fn push_locale(
        &self,
        code: &str,
        locale: &LocaleConfig,
        files: &[&CatalogPath],
    ) -> SyncResult<LocaleOutcome> {
        let mut catalogs = Vec::with_capacity(files.len());
        for file in files {
            debug!("Reading {:?}", file.path);
            catalogs.push((file.file_name(), self.load_catalog(&file.path)?));
        }

        let entry_count = catalogs
            .iter()
            .map(|(_, c)| c.syncable_entries().count())
            .sum();
        let plan = layout::plan(code, locale, entry_count)?;
        plan.ensure_sheet_exists(&self.client.sheet_names()?)?;

        let rows = build_rows(&plan.columns, code, &self.timestamp, &catalogs);
        let range = plan.range();
        info!(
            "Locale {}: writing {} entries from {} catalogs to {}",
            code,
            entry_count,
            catalogs.len(),
            range
        );
        let rows = chunk::write_chunked(self.client, &range, &rows, self.config.push_chunk_size())?;

        Ok(LocaleOutcome::Pushed {
            range: range.a1(),
            rows,
        })
    }
}

/// Header row followed by one row per entry, catalogs in the given order
pub fn build_rows(
    columns: &[ColumnDescriptor],
    locale: &str,
    timestamp: &str,
    catalogs: &[(String, Catalog)],
) -> Vec<Vec<String>> {
    let mut rows = vec![columns.iter().map(|c| c.header.clone()).collect::<Vec<_>>()];
    for (file_name, catalog) in catalogs {
        let metadata = Metadata {
            file_name,
            locale,
            timestamp,
        };
        for entry in catalog.syncable_entries() {
            let row: Vec<String> = columns
                .iter()
                .map(|c| column::resolve(c, entry, &metadata))
                .collect();
            trace!("{:?}", row);
            rows.push(row);
        }
    }
    rows
}
