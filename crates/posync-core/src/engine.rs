//! Sync engine
//!
//! [`Syncer`] holds everything one invocation needs: the immutable
//! configuration, the remote document, the catalog format and the run
//! timestamp. Push and pull are implemented in their own modules.
//!
//! ```ignore
//! let config = Config::load(None)?;
//! let client = GoogleSheetsClient::from_config(&config)?;
//! let report = Syncer::new(&config, &client).push()?;
//! ```

use std::path::Path;

use tracing::{info, warn};

use crate::catalog::{discover, Catalog, CatalogFormat, Discovery, PoFormat};
use crate::config::Config;
use crate::error::SyncResult;
use crate::layout::{self, LayoutPlan};
use crate::report::SyncReport;
use crate::sheets::SheetsClient;
use crate::storage;

/// Timestamp format used for the `{timestamp}` placeholder
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Local time formatted for the `{timestamp}` placeholder
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One push or pull invocation
pub struct Syncer<'a> {
    pub(crate) config: &'a Config,
    pub(crate) client: &'a dyn SheetsClient,
    pub(crate) format: &'a dyn CatalogFormat,
    /// Fixed for the whole run so every row carries the same value
    pub(crate) timestamp: String,
}

impl<'a> Syncer<'a> {
    /// Create a syncer for PO catalogs, stamped with the current time
    pub fn new(config: &'a Config, client: &'a dyn SheetsClient) -> Self {
        Self {
            config,
            client,
            format: &PoFormat,
            timestamp: current_timestamp(),
        }
    }

    /// Override the run timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Scan the catalog root, recording stray and unconfigured catalogs
    pub(crate) fn discover(&self, report: &mut SyncReport) -> SyncResult<Discovery> {
        let discovery = discover(&self.config.path, self.format.extension())?;
        for warning in discovery_warnings(self.config, &discovery) {
            warn!("{}", warning);
            report.warnings.push(warning);
        }
        Ok(discovery)
    }

    pub(crate) fn load_catalog(&self, path: &Path) -> SyncResult<Catalog> {
        let bytes = storage::read_file(path)?;
        self.format.parse(path, &bytes)
    }
}

fn discovery_warnings(config: &Config, discovery: &Discovery) -> Vec<String> {
    let mut warnings: Vec<String> = discovery
        .unassigned
        .iter()
        .map(|path| {
            format!(
                "Could not determine locale for {:?}; make sure it is inside an LC_MESSAGES folder",
                path
            )
        })
        .collect();
    for locale in discovery.locales() {
        if config.locale(locale).is_none() {
            warnings.push(format!(
                "Missing configuration for locale {}, skipping {} file(s)",
                locale,
                discovery.for_locale(locale).count()
            ));
        }
    }
    warnings
}

/// Planned layout of one configured locale, computed from local catalogs only
#[derive(Debug)]
pub struct LocalePlan {
    pub locale: String,
    pub catalogs: usize,
    pub entries: usize,
    pub plan: SyncResult<LayoutPlan>,
}

/// Plan every configured locale without contacting the remote document
pub fn plan_locales(config: &Config, format: &dyn CatalogFormat) -> SyncResult<Vec<LocalePlan>> {
    let discovery = discover(&config.path, format.extension())?;
    for warning in discovery_warnings(config, &discovery) {
        warn!("{}", warning);
    }

    let mut plans = Vec::new();
    for (code, locale) in &config.locales {
        let mut catalogs = 0;
        let mut entries = 0;
        let mut failure = None;
        for file in discovery.for_locale(code) {
            catalogs += 1;
            let parsed = storage::read_file(&file.path).and_then(|b| format.parse(&file.path, &b));
            match parsed {
                Ok(catalog) => entries += catalog.syncable_entries().count(),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        let plan = match failure {
            Some(e) => Err(e),
            None => layout::plan(code, locale, entries),
        };
        info!("Planned locale {} ({} catalogs, {} entries)", code, catalogs, entries);
        plans.push(LocalePlan {
            locale: code.clone(),
            catalogs,
            entries,
            plan,
        });
    }
    Ok(plans)
}
