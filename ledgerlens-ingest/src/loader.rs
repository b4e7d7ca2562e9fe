//! Load the ledger CSV export into a [`NormalizedTable`].
//!
//! The export carries a two-row header: row 0 is the primary header, row 1
//! a secondary header that overrides it column by column. Where the
//! secondary cell is blank the primary label applies. The date column holds
//! YYYYMMDD text.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use ledgerlens_core::table::{Cell, NormalizedTable, Row};
use ledgerlens_core::DATE_COLUMN;

/// Source-format violations. These abort the whole run with no partial
/// output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("source has {0} rows, need the two header rows")]
    MissingHeader(usize),

    #[error("date column {DATE_COLUMN:?} not found in merged header")]
    MissingDateColumn,

    #[error("row {row}: date {value:?} is not YYYYMMDD")]
    Date { row: usize, value: String },

    #[error("merged header has colliding label {0:?}")]
    HeaderCollision(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Read the export at `path` verbatim, merge the two header rows, drop the
/// second header row from the body, and parse the date column.
pub fn load_table(path: impl AsRef<Path>) -> Result<NormalizedTable, IngestError> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        records.push(record.iter().map(|s| s.trim().to_string()).collect::<Vec<_>>());
    }

    let table = normalize(records)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns.len(),
        "loaded ledger"
    );
    Ok(table)
}

/// Header-merge and date-coercion step, split from the file read so it can
/// be exercised on in-memory rows.
pub fn normalize(records: Vec<Vec<String>>) -> Result<NormalizedTable, FormatError> {
    if records.len() < 2 {
        return Err(FormatError::MissingHeader(records.len()));
    }

    let primary = &records[0];
    let secondary = &records[1];
    let width = primary.len();

    // Blank secondary label falls back to the primary label.
    let mut columns = Vec::with_capacity(width);
    for (i, up) in primary.iter().enumerate() {
        let low = secondary.get(i).map(String::as_str).unwrap_or("");
        columns.push(if low.is_empty() { up.clone() } else { low.to_string() });
    }

    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            return Err(FormatError::HeaderCollision(name.clone()));
        }
    }

    let date_idx = columns
        .iter()
        .position(|c| c == DATE_COLUMN)
        .ok_or(FormatError::MissingDateColumn)?;

    let mut rows = Vec::with_capacity(records.len() - 2);
    for (offset, record) in records[2..].iter().enumerate() {
        // Rows 0 and 1 are the header; body rows report their source index.
        let row_no = offset + 2;
        let raw_date = record.get(date_idx).map(String::as_str).unwrap_or("");
        let date = parse_yyyymmdd(raw_date).ok_or_else(|| FormatError::Date {
            row: row_no,
            value: raw_date.to_string(),
        })?;

        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let raw = record.get(i).map(String::as_str).unwrap_or("");
            cells.push(parse_cell(raw));
        }
        rows.push(Row { date, cells });
    }

    Ok(NormalizedTable {
        columns,
        date_idx,
        rows,
    })
}

/// Parse the fixed YYYYMMDD numeric-date text. Spreadsheet exports sometimes
/// serialize the number as `20251101.0`, so a trailing `.0` is tolerated.
fn parse_yyyymmdd(raw: &str) -> Option<NaiveDate> {
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

fn parse_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        Cell::Empty
    } else if let Ok(n) = raw.parse::<f64>() {
        Cell::Number(n)
    } else {
        Cell::Text(raw.to_string())
    }
}
