//! Sheet layout planning
//!
//! Computes where a locale's rows live in the spreadsheet. Rows and columns
//! are 1-based, matching A1 notation: a zero `row_offset` puts the header on
//! row 1 and a zero `column_offset` starts at column A.

use std::fmt;

use crate::config::{ColumnDescriptor, LocaleConfig};
use crate::error::{SyncError, SyncResult};

/// Rectangular block of cells on one sheet (bounds inclusive, 1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub sheet: String,
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl CellRange {
    pub fn row_count(&self) -> u32 {
        self.end_row + 1 - self.start_row
    }

    pub fn col_count(&self) -> u32 {
        self.end_col + 1 - self.start_col
    }

    /// Same columns, different rows
    pub fn with_rows(&self, start_row: u32, end_row: u32) -> Self {
        Self {
            sheet: self.sheet.clone(),
            start_row,
            end_row,
            start_col: self.start_col,
            end_col: self.end_col,
        }
    }

    /// A1 notation, e.g. `'My Sheet'!B3:D40`
    pub fn a1(&self) -> String {
        format!(
            "{}!{}{}:{}{}",
            quote_sheet_name(&self.sheet),
            column_name(self.start_col),
            self.start_row,
            column_name(self.end_col),
            self.end_row
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

/// Letters of a 1-based column index (1 → A, 27 → AA)
pub fn column_name(col: u32) -> String {
    let mut n = col;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Sheet names with anything beyond `[A-Za-z0-9_]` need single quotes
fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Geometry of one locale's block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub locale: String,
    pub sheet: String,
    /// Row of the header
    pub start_row: u32,
    pub start_col: u32,
    /// Header plus data rows
    pub row_count: u32,
    pub col_count: u32,
    /// Checked column layout, in sheet order
    pub columns: Vec<ColumnDescriptor>,
    /// Index (within the layout) of the column carrying `{file_name}`
    pub file_name_column: usize,
}

impl LayoutPlan {
    /// Whole block, header included
    ///
    /// [`plan`] guarantees the bounds fit in `u32`.
    pub fn range(&self) -> CellRange {
        CellRange {
            sheet: self.sheet.clone(),
            start_row: self.start_row,
            end_row: self.start_row.saturating_add(self.row_count.saturating_sub(1)),
            start_col: self.start_col,
            end_col: self.start_col.saturating_add(self.col_count.saturating_sub(1)),
        }
    }

    /// Header row text
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// First row below the header
    pub fn data_start_row(&self) -> u32 {
        self.start_row.saturating_add(1)
    }

    /// Check the target sheet against the sheets the document actually has
    pub fn ensure_sheet_exists(&self, sheets: &[String]) -> SyncResult<()> {
        if sheets.iter().any(|s| s == &self.sheet) {
            Ok(())
        } else {
            Err(SyncError::Config(format!(
                "locale '{}' targets sheet '{}', which does not exist in the spreadsheet",
                self.locale, self.sheet
            )))
        }
    }
}

/// Plan the block for `entry_count` data rows
///
/// Fails when the locale's layout is malformed, when the block would run
/// past the last addressable row or column, or when no column carries
/// `{file_name}`: without it rows cannot be traced back to their catalog on
/// pull.
pub fn plan(locale: &str, config: &LocaleConfig, entry_count: usize) -> SyncResult<LayoutPlan> {
    let columns = config.descriptors(locale)?;
    let file_name_column = columns
        .iter()
        .position(|c| c.carries_file_name())
        .ok_or_else(|| {
            SyncError::Config(format!(
                "locale '{}': at least one column must indicate the file name, \
                 e.g. {{ static = \"{{file_name}}\", header = \"FILE NAME\" }}",
                locale
            ))
        })?;

    let col_count = u32::try_from(columns.len())
        .map_err(|_| SyncError::Config(format!("locale '{}' has too many columns", locale)))?;
    let row_count = u32::try_from(entry_count)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| SyncError::Config(format!("locale '{}' has too many entries", locale)))?;

    // The last data row must be addressable, and so must the first row
    // below the header, where pull starts reading.
    let start_row = config
        .row_offset
        .checked_add(1)
        .filter(|&row| row.checked_add(row_count.max(2) - 1).is_some())
        .ok_or_else(|| out_of_bounds(locale, "row_offset", config.row_offset))?;
    let start_col = config
        .column_offset
        .checked_add(1)
        .filter(|&col| col.checked_add(col_count - 1).is_some())
        .ok_or_else(|| out_of_bounds(locale, "column_offset", config.column_offset))?;

    Ok(LayoutPlan {
        locale: locale.to_string(),
        sheet: config.sheet.clone(),
        start_row,
        start_col,
        row_count,
        col_count,
        columns,
        file_name_column,
    })
}

fn out_of_bounds(locale: &str, key: &str, value: u32) -> SyncError {
    SyncError::Config(format!(
        "locale '{}': {} {} puts the block past the last addressable cell",
        locale, key, value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;

    fn locale_config(row_offset: u32, column_offset: u32) -> LocaleConfig {
        LocaleConfig {
            sheet: "English".to_string(),
            row_offset,
            column_offset,
            columns: vec![
                ColumnConfig::fields("KEY", ["msgid"]),
                ColumnConfig::fields("TRANSLATION", ["msgstr"]),
                ColumnConfig::static_text("FILE", "File: {file_name}"),
            ],
        }
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(52), "AZ");
        assert_eq!(column_name(703), "AAA");
    }

    #[test]
    fn test_plan_without_offsets() {
        let plan = plan("en", &locale_config(0, 0), 1).unwrap();

        assert_eq!(plan.header(), vec!["KEY", "TRANSLATION", "FILE"]);
        assert_eq!(plan.start_row, 1);
        assert_eq!(plan.data_start_row(), 2);
        assert_eq!(plan.row_count, 2);
        assert_eq!(plan.col_count, 3);
        assert_eq!(plan.file_name_column, 2);
        assert_eq!(plan.range().a1(), "English!A1:C2");
    }

    #[test]
    fn test_plan_with_offsets() {
        let plan = plan("en", &locale_config(3, 2), 10).unwrap();
        assert_eq!(plan.range().a1(), "English!C4:E14");
        assert_eq!(plan.data_start_row(), 5);
    }

    #[test]
    fn test_plan_with_no_entries_is_header_only() {
        let plan = plan("en", &locale_config(0, 0), 0).unwrap();
        assert_eq!(plan.range().row_count(), 1);
    }

    #[test]
    fn test_plan_requires_file_name_column() {
        let mut config = locale_config(0, 0);
        config.columns.pop();
        config
            .columns
            .push(ColumnConfig::static_text("WHEN", "{timestamp}"));

        let err = plan("en", &config, 1).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(err.to_string().contains("file name"));
    }

    #[test]
    fn test_plan_rejects_malformed_columns() {
        let mut config = locale_config(0, 0);
        config.columns[0].static_text = Some("{locale}".to_string());

        let err = plan("en", &config, 1).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_plan_rejects_offsets_past_the_grid() {
        let err = plan("en", &locale_config(u32::MAX, 0), 1).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(err.to_string().contains("row_offset"));

        // The header fits but the data rows would not
        assert!(plan("en", &locale_config(u32::MAX - 3, 0), 5).is_err());

        let err = plan("en", &locale_config(0, u32::MAX - 1), 0).unwrap_err();
        assert!(err.to_string().contains("column_offset"));
    }

    #[test]
    fn test_plan_at_the_last_row() {
        // Header on the second to last row leaves exactly one data row
        let plan = plan("en", &locale_config(u32::MAX - 2, 0), 1).unwrap();
        assert_eq!(plan.range().end_row, u32::MAX);
        assert_eq!(plan.data_start_row(), u32::MAX);
    }

    #[test]
    fn test_sheet_must_exist() {
        let plan = plan("en", &locale_config(0, 0), 1).unwrap();
        assert!(plan.ensure_sheet_exists(&["English".to_string()]).is_ok());
        assert!(matches!(
            plan.ensure_sheet_exists(&["Spanish".to_string()]),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn test_sheet_name_quoting() {
        let range = CellRange {
            sheet: "Pt BR's".to_string(),
            start_row: 1,
            end_row: 2,
            start_col: 1,
            end_col: 1,
        };
        assert_eq!(range.a1(), "'Pt BR''s'!A1:A2");
        assert_eq!(range.with_rows(5, 9).to_string(), "'Pt BR''s'!A5:A9");
    }
}
