//! In-memory spreadsheet

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::SheetsClient;
use crate::error::{SyncError, SyncResult};
use crate::layout::CellRange;

/// A request received by [`MemorySheets`], recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Read(CellRange),
    Write(CellRange),
}

/// Spreadsheet held in memory
///
/// Cells are stored per sheet as a sparse grid of rows. Requests can be
/// inspected afterwards and a sheet can be marked as failing to simulate
/// remote errors.
#[derive(Debug, Default)]
pub struct MemorySheets {
    sheets: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
    requests: Mutex<Vec<Request>>,
    failing: Mutex<Vec<String>>,
}

impl MemorySheets {
    /// Create a document with the given (empty) sheets
    pub fn new<I, S>(sheet_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheets = sheet_names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            sheets: Mutex::new(sheets),
            ..Self::default()
        }
    }

    /// Make every request touching `sheet` fail
    pub fn fail_sheet(&self, sheet: &str) {
        lock(&self.failing).push(sheet.to_string());
    }

    /// Set one cell (1-based), as a translator editing the sheet would
    pub fn set_cell(&self, sheet: &str, row: u32, col: u32, value: &str) {
        let mut sheets = lock(&self.sheets);
        let grid = sheets.entry(sheet.to_string()).or_default();
        put(grid, row, col, value);
    }

    /// Value of one cell (1-based); empty when never written
    pub fn cell(&self, sheet: &str, row: u32, col: u32) -> String {
        let sheets = lock(&self.sheets);
        sheets
            .get(sheet)
            .and_then(|grid| grid.get(row as usize - 1))
            .and_then(|r| r.get(col as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    /// Rows of a sheet starting at row 1, trailing empties trimmed
    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        let sheets = lock(&self.sheets);
        let Some(grid) = sheets.get(sheet) else {
            return Vec::new();
        };
        let mut rows: Vec<Vec<String>> = grid.iter().map(|r| trim_row(r)).collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        rows
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    fn check(&self, range: &CellRange) -> SyncResult<()> {
        if lock(&self.failing).contains(&range.sheet) {
            return Err(SyncError::remote(format!("request for {} failed", range)));
        }
        if !lock(&self.sheets).contains_key(&range.sheet) {
            return Err(SyncError::remote(format!(
                "Unable to parse range: {}",
                range
            )));
        }
        Ok(())
    }
}

impl SheetsClient for MemorySheets {
    fn sheet_names(&self) -> SyncResult<Vec<String>> {
        Ok(lock(&self.sheets).keys().cloned().collect())
    }

    fn read(&self, range: &CellRange) -> SyncResult<Vec<Vec<String>>> {
        lock(&self.requests).push(Request::Read(range.clone()));
        self.check(range)?;

        let sheets = lock(&self.sheets);
        let grid = sheets.get(&range.sheet).map(Vec::as_slice).unwrap_or(&[]);
        let mut rows = Vec::new();
        for row in range.start_row..=range.end_row {
            let cells: Vec<String> = (range.start_col..=range.end_col)
                .map(|col| {
                    grid.get(row as usize - 1)
                        .and_then(|r| r.get(col as usize - 1))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            rows.push(trim_row(&cells));
        }
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    fn write(&self, range: &CellRange, rows: &[Vec<String>]) -> SyncResult<()> {
        lock(&self.requests).push(Request::Write(range.clone()));
        self.check(range)?;

        if rows.len() > range.row_count() as usize {
            return Err(SyncError::remote(format!(
                "{} rows do not fit in {}",
                rows.len(),
                range
            )));
        }

        let mut sheets = lock(&self.sheets);
        let grid = sheets.entry(range.sheet.clone()).or_default();
        for (r, row) in rows.iter().enumerate() {
            if row.len() > range.col_count() as usize {
                return Err(SyncError::remote(format!(
                    "row of {} cells does not fit in {}",
                    row.len(),
                    range
                )));
            }
            for (c, value) in row.iter().enumerate() {
                put(grid, range.start_row + r as u32, range.start_col + c as u32, value);
            }
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn put(grid: &mut Vec<Vec<String>>, row: u32, col: u32, value: &str) {
    let (r, c) = (row as usize - 1, col as usize - 1);
    if grid.len() <= r {
        grid.resize(r + 1, Vec::new());
    }
    let cells = &mut grid[r];
    if cells.len() <= c {
        cells.resize(c + 1, String::new());
    }
    cells[c] = value.to_string();
}

fn trim_row(cells: &[String]) -> Vec<String> {
    let len = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    cells[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start_row: u32, end_row: u32) -> CellRange {
        CellRange {
            sheet: "S".to_string(),
            start_row,
            end_row,
            start_col: 2,
            end_col: 3,
        }
    }

    #[test]
    fn test_write_then_read() {
        let sheets = MemorySheets::new(["S"]);
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "".to_string()],
        ];
        sheets.write(&range(1, 2), &rows).unwrap();

        assert_eq!(sheets.cell("S", 1, 2), "a");
        assert_eq!(sheets.cell("S", 2, 3), "");
        assert_eq!(
            sheets.read(&range(1, 5)).unwrap(),
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
        assert!(sheets.read(&range(3, 10)).unwrap().is_empty());
        assert_eq!(sheets.requests().len(), 3);
    }

    #[test]
    fn test_unknown_or_failing_sheet() {
        let sheets = MemorySheets::new(["S"]);
        let mut other = range(1, 1);
        other.sheet = "Missing".to_string();
        assert!(sheets.read(&other).is_err());

        sheets.fail_sheet("S");
        assert!(matches!(
            sheets.write(&range(1, 1), &[]),
            Err(SyncError::Remote(_))
        ));
    }

    #[test]
    fn test_oversized_write_rejected() {
        let sheets = MemorySheets::new(["S"]);
        let rows = vec![vec!["x".to_string()]; 3];
        assert!(sheets.write(&range(1, 2), &rows).is_err());
    }
}
