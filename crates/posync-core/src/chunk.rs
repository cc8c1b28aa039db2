//! Chunked spreadsheet I/O
//!
//! The remote API caps how much a single request may carry, so large
//! ranges are split into contiguous row blocks of at most `page_size` rows
//! and sent one after another, in row order. A failing chunk aborts the
//! whole operation; retries are left to the client.

use tracing::debug;

use crate::error::SyncResult;
use crate::layout::CellRange;
use crate::sheets::SheetsClient;

/// Split `range` into row blocks of at most `page_size` rows
///
/// The blocks cover the range exactly, without gaps or overlap, in
/// ascending row order. A `page_size` of zero is treated as one.
pub fn chunks(range: &CellRange, page_size: usize) -> Vec<CellRange> {
    let page = u32::try_from(page_size.max(1)).unwrap_or(u32::MAX);
    let mut out = Vec::new();
    let mut start = range.start_row;
    loop {
        let end = start.saturating_add(page - 1).min(range.end_row);
        out.push(range.with_rows(start, end));
        if end >= range.end_row {
            break;
        }
        start = end + 1;
    }
    out
}

/// Write `rows` into `range`, one request per chunk
///
/// Returns the number of rows written.
pub fn write_chunked(
    client: &dyn SheetsClient,
    range: &CellRange,
    rows: &[Vec<String>],
    page_size: usize,
) -> SyncResult<usize> {
    let mut written = 0;
    for chunk in chunks(range, page_size) {
        let offset = (chunk.start_row - range.start_row) as usize;
        let end = (offset + chunk.row_count() as usize).min(rows.len());
        if offset >= end {
            break;
        }
        debug!("Writing chunk {} ({} rows)", chunk, end - offset);
        client.write(&chunk, &rows[offset..end])?;
        written += end - offset;
    }
    Ok(written)
}

/// Read rows from `first_row` downwards until a chunk comes back empty
///
/// Used when the number of rows on the sheet is not known in advance.
/// Only `sheet` and the column bounds of `columns` are used.
pub fn read_until_empty(
    client: &dyn SheetsClient,
    columns: &CellRange,
    first_row: u32,
    page_size: usize,
) -> SyncResult<Vec<Vec<String>>> {
    let page = u32::try_from(page_size.max(1)).unwrap_or(u32::MAX);
    let mut rows = Vec::new();
    let mut start = first_row;
    loop {
        let end = start.saturating_add(page - 1);
        let chunk = columns.with_rows(start, end);
        debug!("Fetching chunk {}", chunk);
        let block = client.read(&chunk)?;
        debug!("{} rows retrieved", block.len());
        if block.is_empty() {
            break;
        }
        rows.extend(block);
        if end == u32::MAX {
            break;
        }
        start = end + 1;
    }
    Ok(rows)
}
