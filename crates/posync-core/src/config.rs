//! Sync configuration
//!
//! Configuration is loaded from:
//! 1. Config file (`posync.toml`, or any path given via `--config`/`POSYNC_CONFIG`)
//! 2. Environment variables (POSYNC_* prefix)
//!
//! Files ending in `.json` are read as JSON, everything else as TOML.
//! Environment variables take precedence over config file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Environment variable prefix
const ENV_PREFIX: &str = "POSYNC";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "posync.toml";

/// Rows requested per chunk when none is configured
pub const DEFAULT_PULL_CHUNK_SIZE: usize = 500;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory searched for catalog files
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Identifier of the remote spreadsheet
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Rows fetched per read request on pull
    #[serde(default = "default_pull_chunk_size")]
    pub pull_chunk_size: usize,

    /// Rows sent per write request on push (falls back to `pull_chunk_size`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_chunk_size: Option<usize>,

    /// Bearer token for the spreadsheet API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Per-locale sheet layout, keyed by locale code
    #[serde(default)]
    pub locales: BTreeMap<String, LocaleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: default_path(),
            spreadsheet_id: String::new(),
            pull_chunk_size: DEFAULT_PULL_CHUNK_SIZE,
            push_chunk_size: None,
            access_token: None,
            locales: BTreeMap::new(),
        }
    }
}

/// Where and how one locale is laid out in the spreadsheet
///
/// Only the shape is checked when the file is loaded. Layout problems
/// (empty sheet name, no columns, a column with no or two modes) surface
/// from [`LocaleConfig::descriptors`] and fail that locale alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Target sheet (tab) name
    #[serde(default)]
    pub sheet: String,

    /// Rows left untouched above the header
    #[serde(default)]
    pub row_offset: u32,

    /// Columns left untouched left of the first column
    #[serde(default)]
    pub column_offset: u32,

    /// Column layout, in sheet order
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl LocaleConfig {
    /// Checked column layout of this locale
    pub fn descriptors(&self, locale: &str) -> SyncResult<Vec<ColumnDescriptor>> {
        if self.sheet.is_empty() {
            return Err(SyncError::Config(format!(
                "locale '{}' has an empty sheet name",
                locale
            )));
        }
        if self.columns.is_empty() {
            return Err(SyncError::Config(format!("locale '{}' has no columns", locale)));
        }
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                column.descriptor().map_err(|reason| {
                    SyncError::Config(format!(
                        "locale '{}', column {}: {}",
                        locale,
                        index + 1,
                        reason
                    ))
                })
            })
            .collect()
    }
}

/// On-disk shape of a column: exactly one of `fields`/`static` plus a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ColumnConfig {
    pub fn fields<I, S>(header: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
            static_text: None,
            header: Some(header.into()),
        }
    }

    pub fn static_text(header: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            fields: None,
            static_text: Some(template.into()),
            header: Some(header.into()),
        }
    }

    /// Resolve the column mode
    pub fn descriptor(&self) -> std::result::Result<ColumnDescriptor, String> {
        let header = self
            .header
            .clone()
            .ok_or_else(|| "missing `header`".to_string())?;
        let source = match (&self.fields, &self.static_text) {
            (Some(_), Some(_)) => {
                return Err(format!("column '{}' sets both `fields` and `static`", header))
            }
            (None, None) => {
                return Err(format!("column '{}' needs either `fields` or `static`", header))
            }
            (Some(fields), None) if fields.is_empty() => {
                return Err(format!("column '{}' has an empty `fields` list", header))
            }
            (Some(fields), None) => ColumnSource::Fields(fields.clone()),
            (None, Some(template)) => ColumnSource::Static(template.clone()),
        };
        Ok(ColumnDescriptor { header, source })
    }
}

impl From<ColumnDescriptor> for ColumnConfig {
    fn from(column: ColumnDescriptor) -> Self {
        let (fields, static_text) = match column.source {
            ColumnSource::Fields(fields) => (Some(fields), None),
            ColumnSource::Static(template) => (None, Some(template)),
        };
        Self {
            fields,
            static_text,
            header: Some(column.header),
        }
    }
}

/// How one spreadsheet column is populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Text written to the header row
    pub header: String,
    /// Cell source
    pub source: ColumnSource,
}

/// Cell source of a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// Ordered field names; the first one present on the entry wins
    Fields(Vec<String>),
    /// Template with `{file_name}`, `{locale}` and `{timestamp}` placeholders
    Static(String),
}

impl ColumnDescriptor {
    /// Column filled from the first present field of `fields`
    pub fn fields<I, S>(header: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into(),
            source: ColumnSource::Fields(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Column filled from a static template
    pub fn static_text(header: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            source: ColumnSource::Static(template.into()),
        }
    }

    /// Field names for a field-column, `None` for static columns
    pub fn field_names(&self) -> Option<&[String]> {
        match &self.source {
            ColumnSource::Fields(fields) => Some(fields),
            ColumnSource::Static(_) => None,
        }
    }

    /// Template for a static column, `None` for field-columns
    pub fn template(&self) -> Option<&str> {
        match &self.source {
            ColumnSource::Fields(_) => None,
            ColumnSource::Static(template) => Some(template),
        }
    }

    /// Whether this column lists `field` among its fields
    pub fn maps_field(&self, field: &str) -> bool {
        self.field_names()
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    /// Whether this is a static column carrying the file name
    pub fn carries_file_name(&self) -> bool {
        self.template()
            .is_some_and(|t| t.contains(crate::column::FILE_NAME_PLACEHOLDER))
    }
}

/// Serialization format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension (`.json` is JSON, the rest TOML)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

impl Config {
    /// Load configuration, honoring a CLI-provided path
    ///
    /// Order of precedence for the file location:
    /// 1. `cli_path` (the `--config` flag)
    /// 2. POSYNC_CONFIG environment variable
    /// 3. `posync.toml` in the working directory
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = cli_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_file_path);
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::load_from_str(&content, ConfigFormat::from_path(path))
            .with_context(|| format!("Failed to load config file: {:?}", path))
    }

    /// Load configuration from a string (useful for testing)
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Self> {
        let mut config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse config TOML")?,
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse config JSON")?
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // POSYNC_PATH
        if let Ok(val) = std::env::var(format!("{}_PATH", ENV_PREFIX)) {
            if !val.is_empty() {
                self.path = PathBuf::from(val);
            }
        }

        // POSYNC_SPREADSHEET_ID
        if let Ok(val) = std::env::var(format!("{}_SPREADSHEET_ID", ENV_PREFIX)) {
            if !val.is_empty() {
                self.spreadsheet_id = val;
            }
        }

        // POSYNC_ACCESS_TOKEN
        if let Ok(val) = std::env::var(format!("{}_ACCESS_TOKEN", ENV_PREFIX)) {
            self.access_token = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Check the run-wide settings
    ///
    /// Locale layouts are checked per locale by the layout planner.
    pub fn validate(&self) -> Result<()> {
        if self.pull_chunk_size == 0 {
            bail!("pull_chunk_size must be at least 1");
        }
        if self.push_chunk_size == Some(0) {
            bail!("push_chunk_size must be at least 1");
        }
        Ok(())
    }

    /// Rows per write request on push
    pub fn push_chunk_size(&self) -> usize {
        self.push_chunk_size.unwrap_or(self.pull_chunk_size)
    }

    /// Look up the layout of a locale
    pub fn locale(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.get(code)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Get the config file path
    ///
    /// Can be overridden with POSYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_pull_chunk_size() -> usize {
    DEFAULT_PULL_CHUNK_SIZE
}
