//! posync Core Library
//!
//! This crate keeps gettext catalogs (`<root>/<locale>/LC_MESSAGES/*.po`)
//! in sync with a spreadsheet, so translators can work in the sheet while
//! developers keep working with catalog files.
//!
//! # Architecture
//!
//! - **Push**: catalogs are laid out as rows (one per entry) on the sheet
//!   configured for their locale
//! - **Pull**: rows are read back and merged into the catalogs they came
//!   from, touching only entries and fields that already exist locally
//!
//! The spreadsheet and the filesystem are the only persistent state; every
//! run starts from scratch.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load(None)?;
//! let client = GoogleSheetsClient::from_config(&config)?;
//!
//! let report = Syncer::new(&config, &client).push()?;
//! for locale in &report.locales {
//!     println!("{}: {:?}", locale.locale, locale.outcome);
//! }
//! ```
//!
//! # Modules
//!
//! - `engine`: Sync entry point shared by push and pull
//! - `catalog`: Entry model, PO parser/serializer and catalog discovery
//! - `column`: Cell values from column descriptors, and back
//! - `layout`: Sheet geometry of a locale
//! - `chunk`: Row-block splitting of remote reads and writes
//! - `sheets`: Remote spreadsheet clients
//! - `storage`: Backups and atomic catalog writes
//! - `config`: Application configuration

pub mod catalog;
pub mod chunk;
pub mod column;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pull;
pub mod push;
pub mod report;
pub mod sheets;
pub mod storage;

pub use catalog::{Catalog, CatalogFormat, Entry, EntryKey, LineEnding, PoFormat};
pub use config::{ColumnConfig, ColumnDescriptor, ColumnSource, Config, LocaleConfig};
pub use engine::{plan_locales, LocalePlan, Syncer};
pub use error::{SyncError, SyncResult};
pub use layout::{CellRange, LayoutPlan};
pub use report::{Direction, FileOutcome, FileReport, LocaleOutcome, LocaleReport, SyncReport};
pub use sheets::{GoogleSheetsClient, MemorySheets, SheetsClient};
