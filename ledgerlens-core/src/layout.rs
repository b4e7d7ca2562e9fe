//! Fixed column layout of the ledger export.
//!
//! The export follows a positional contract: at least 6 leading metadata
//! columns, then the expense-category columns, then exactly 4 trailing
//! income-category columns. The date column and the two per-day total
//! columns are addressed by name and excluded from both category ranges.
//! The contract is validated up front instead of trusted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the date column (YYYYMMDD in the raw export).
pub const DATE_COLUMN: &str = "日期";
/// Name of the per-day total-expense column.
pub const EXPENSE_TOTAL_COLUMN: &str = "总支出/天";
/// Name of the per-day total-income column.
pub const INCOME_TOTAL_COLUMN: &str = "总收入/天";

/// Leading metadata columns before the category block starts.
pub const METADATA_COLUMNS: usize = 6;
/// Trailing income-category columns.
pub const INCOME_COLUMNS: usize = 4;

/// Violations of the positional column contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("table has {got} columns, need at least {need} (6 metadata + 1 expense category + 4 income categories)")]
    TooFewColumns { got: usize, need: usize },

    #[error("required column {0:?} not found in header")]
    MissingColumn(&'static str),
}

/// One category column resolved against the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryColumn {
    pub index: usize,
    pub name: String,
}

/// Resolved and validated column positions for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub date_idx: usize,
    pub expense_total_idx: usize,
    pub income_total_idx: usize,
    /// Columns between the metadata block and the income block, in column
    /// order, minus the named date/total columns.
    pub expense_categories: Vec<CategoryColumn>,
    /// The last 4 columns, same exclusion.
    pub income_categories: Vec<CategoryColumn>,
}

impl ColumnLayout {
    /// Resolve the layout from a merged header, failing on any violation of
    /// the positional contract rather than silently misclassifying columns.
    pub fn from_headers(columns: &[String]) -> Result<Self, LayoutError> {
        let need = METADATA_COLUMNS + 1 + INCOME_COLUMNS;
        if columns.len() < need {
            return Err(LayoutError::TooFewColumns {
                got: columns.len(),
                need,
            });
        }

        let find = |name: &'static str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or(LayoutError::MissingColumn(name))
        };
        let date_idx = find(DATE_COLUMN)?;
        let expense_total_idx = find(EXPENSE_TOTAL_COLUMN)?;
        let income_total_idx = find(INCOME_TOTAL_COLUMN)?;

        let named = [date_idx, expense_total_idx, income_total_idx];
        let category = |range: std::ops::Range<usize>| {
            range
                .filter(|i| !named.contains(i))
                .map(|i| CategoryColumn {
                    index: i,
                    name: columns[i].clone(),
                })
                .collect::<Vec<_>>()
        };

        let income_start = columns.len() - INCOME_COLUMNS;
        Ok(ColumnLayout {
            date_idx,
            expense_total_idx,
            income_total_idx,
            expense_categories: category(METADATA_COLUMNS..income_start),
            income_categories: category(income_start..columns.len()),
        })
    }
}
