//! Remote spreadsheet access
//!
//! The engine talks to the spreadsheet only through [`SheetsClient`]. Two
//! implementations are provided:
//!
//! - [`GoogleSheetsClient`]: Google Sheets API v4 over HTTPS
//! - [`MemorySheets`]: an in-memory document, used by tests
//!
//! Reads follow the Sheets API conventions: trailing empty rows and
//! trailing empty cells of a row are not returned.

mod google;
mod memory;

pub use google::GoogleSheetsClient;
pub use memory::{MemorySheets, Request};

use crate::error::SyncResult;
use crate::layout::CellRange;

/// Operations the engine needs from a remote spreadsheet
pub trait SheetsClient {
    /// Titles of the sheets (tabs) in the document
    fn sheet_names(&self) -> SyncResult<Vec<String>>;

    /// Read the values in `range`, row by row
    fn read(&self, range: &CellRange) -> SyncResult<Vec<Vec<String>>>;

    /// Overwrite `range` with `rows`
    fn write(&self, range: &CellRange, rows: &[Vec<String>]) -> SyncResult<()>;
}
