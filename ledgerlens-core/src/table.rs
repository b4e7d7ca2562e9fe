//! Tabular data model for the spending ledger.
//!
//! The source export carries a two-row header; after the loader merges it,
//! everything downstream works with [`NormalizedTable`] and the per-month
//! [`MonthlySlice`] cut from it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One cell of the ledger. Metadata columns are text, amount columns are
/// numeric, and blanks are common in both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. `Empty` counts as absent, not zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form used when embedding rows into a report table.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{n:.0}")
                } else {
                    format!("{n}")
                }
            }
            Cell::Text(s) => s.clone(),
        }
    }
}

/// One body row: the parsed date plus every cell in column order.
/// `cells` stays aligned with the owning table's `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub date: NaiveDate,
    pub cells: Vec<Cell>,
}

/// Ledger with the merged header applied and the date column parsed.
///
/// Invariants (enforced by the loader): every row's date parsed from the
/// source's YYYYMMDD text, and merged header labels are pairwise distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    /// Index of the date column within `columns`.
    pub date_idx: usize,
    pub rows: Vec<Row>,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Rows of one (year, month), missing cells zero-filled, sorted by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySlice {
    pub year: i32,
    pub month: u32,
    pub columns: Vec<String>,
    pub date_idx: usize,
    pub rows: Vec<Row>,
}

impl MonthlySlice {
    /// Cut the rows matching (year, month) out of `rows`, fill blanks with
    /// zero, and sort ascending by date. Filtering happens before the fill
    /// so unrelated months are never touched.
    pub fn extract(
        columns: &[String],
        date_idx: usize,
        rows: &[Row],
        year: i32,
        month: u32,
    ) -> Self {
        let mut kept: Vec<Row> = rows
            .iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .cloned()
            .collect();

        for row in &mut kept {
            for cell in &mut row.cells {
                if matches!(cell, Cell::Empty) {
                    *cell = Cell::Number(0.0);
                }
            }
        }

        kept.sort_by_key(|r| r.date);

        MonthlySlice {
            year,
            month,
            columns: columns.to_vec(),
            date_idx,
            rows: kept,
        }
    }

    /// Re-apply the (year, month) filter to this slice. Extracting the month
    /// a slice already holds returns an identical slice.
    pub fn restrict(&self, year: i32, month: u32) -> MonthlySlice {
        MonthlySlice::extract(&self.columns, self.date_idx, &self.rows, year, month)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Sum a column over all rows, treating non-numeric cells as zero.
    pub fn column_sum(&self, idx: usize) -> f64 {
        self.rows
            .iter()
            .map(|r| r.cells.get(idx).and_then(Cell::as_number).unwrap_or(0.0))
            .sum()
    }

    /// Per-row numeric series for a column (non-numeric cells read as zero).
    pub fn column_series(&self, idx: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.cells.get(idx).and_then(Cell::as_number).unwrap_or(0.0))
            .collect()
    }

    /// Count of distinct calendar dates present. Duplicate same-day rows
    /// must not inflate per-day averages, so totals divide by this.
    pub fn distinct_dates(&self) -> usize {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.date).collect();
        dates.sort();
        dates.dedup();
        dates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: NaiveDate, cells: Vec<Cell>) -> Row {
        Row { date, cells }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row(d(2025, 11, 2), vec![Cell::Text("b".into()), Cell::Empty]),
            row(d(2025, 11, 1), vec![Cell::Text("a".into()), Cell::Number(3.5)]),
            row(d(2025, 10, 30), vec![Cell::Text("old".into()), Cell::Number(9.0)]),
        ]
    }

    #[test]
    fn test_extract_filters_and_sorts() {
        let cols = vec!["名称".to_string(), "金额".to_string()];
        let slice = MonthlySlice::extract(&cols, 0, &sample_rows(), 2025, 11);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.rows[0].date, d(2025, 11, 1));
        assert_eq!(slice.rows[1].date, d(2025, 11, 2));
    }

    #[test]
    fn test_extract_zero_fills_after_filter() {
        let cols = vec!["名称".to_string(), "金额".to_string()];
        let slice = MonthlySlice::extract(&cols, 0, &sample_rows(), 2025, 11);
        // The November row with a blank amount becomes 0.0
        assert_eq!(slice.rows[1].cells[1], Cell::Number(0.0));
        assert_eq!(slice.column_sum(1), 3.5);
    }

    #[test]
    fn test_restrict_is_idempotent() {
        let cols = vec!["名称".to_string(), "金额".to_string()];
        let slice = MonthlySlice::extract(&cols, 0, &sample_rows(), 2025, 11);
        let again = slice.restrict(2025, 11);
        assert_eq!(slice, again);
    }

    #[test]
    fn test_distinct_dates_ignores_duplicates() {
        let cols = vec!["金额".to_string()];
        let rows = vec![
            row(d(2025, 11, 1), vec![Cell::Number(1.0)]),
            row(d(2025, 11, 1), vec![Cell::Number(2.0)]),
            row(d(2025, 11, 3), vec![Cell::Number(3.0)]),
        ];
        let slice = MonthlySlice::extract(&cols, 0, &rows, 2025, 11);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.distinct_dates(), 2);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(12.0).display(), "12");
        assert_eq!(Cell::Number(12.5).display(), "12.5");
        assert_eq!(Cell::Empty.display(), "");
        assert_eq!(Cell::Text("午餐".into()).display(), "午餐");
    }
}
