//! Catalog discovery
//!
//! Finds catalog files below the configured root. Catalogs are expected at
//! `<root>/**/<locale>/LC_MESSAGES/<name>.<ext>`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// Directory that sits between the locale directory and the catalogs
const LC_MESSAGES: &str = "LC_MESSAGES";

/// A catalog file together with the locale it belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CatalogPath {
    pub locale: String,
    pub path: PathBuf,
}

impl CatalogPath {
    /// Bare file name, as used in the `{file_name}` placeholder
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of scanning the catalog root
#[derive(Debug, Default)]
pub struct Discovery {
    /// Catalogs with a recognizable locale, sorted by path
    pub catalogs: Vec<CatalogPath>,
    /// Matching files outside any `<locale>/LC_MESSAGES` directory
    pub unassigned: Vec<PathBuf>,
}

impl Discovery {
    /// Catalogs of one locale, in path order
    pub fn for_locale<'a>(&'a self, locale: &'a str) -> impl Iterator<Item = &'a CatalogPath> {
        self.catalogs.iter().filter(move |c| c.locale == locale)
    }

    /// Every locale that has at least one catalog
    pub fn locales(&self) -> BTreeSet<&str> {
        self.catalogs.iter().map(|c| c.locale.as_str()).collect()
    }
}

/// Recursively collect catalog files under `root`
///
/// The extension is matched case-insensitively (`po` matches `.PO`).
pub fn discover(root: &Path, extension: &str) -> SyncResult<Discovery> {
    if !root.is_dir() {
        return Err(SyncError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut discovery = Discovery::default();
    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable path: {}", err);
                None
            }
        })
    {
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }
        let path = entry.path().to_path_buf();
        match locale_from_path(&path) {
            Some(locale) => {
                debug!("Found catalog {:?} for locale {}", path, locale);
                discovery.catalogs.push(CatalogPath { locale, path });
            }
            None => discovery.unassigned.push(path),
        }
    }

    discovery.catalogs.sort_by(|a, b| a.path.cmp(&b.path));
    discovery.unassigned.sort();
    Ok(discovery)
}

/// Locale code of a catalog at `…/<locale>/LC_MESSAGES/<file>`
pub fn locale_from_path(path: &Path) -> Option<String> {
    let parent = path.parent()?;
    if parent.file_name()? != LC_MESSAGES {
        return None;
    }
    let locale = parent.parent()?.file_name()?.to_str()?;
    let valid = !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '@');
    valid.then(|| locale.to_string())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
