//! Aggregate and per-category statistics over one monthly slice.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::ColumnLayout;
use crate::stats::{round2, share, Distribution};
use crate::table::{Cell, MonthlySlice};

/// Summed amount for one category column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

impl CategoryTotal {
    /// Percentage share of this category within `total` (0 when the total
    /// is 0).
    pub fn share_of(&self, total: f64) -> f64 {
        share(self.amount, total)
    }
}

/// Everything the report sections need, computed once per slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_expense: f64,
    pub average_daily_expense: f64,
    pub total_income: f64,
    pub average_daily_income: f64,
    pub net_income: f64,
    pub average_daily_net: f64,
    /// Expense-category sums in column order.
    pub expense_categories: Vec<CategoryTotal>,
    /// Income-category sums in column order.
    pub income_categories: Vec<CategoryTotal>,
    /// Per-date expense totals, ascending by date.
    pub daily_expense: BTreeMap<NaiveDate, f64>,
    /// Per-date income totals, ascending by date.
    pub daily_income: BTreeMap<NaiveDate, f64>,
    /// Distribution of the per-row expense series.
    pub expense_summary: Option<Distribution>,
    /// Distribution of the per-row income series.
    pub income_summary: Option<Distribution>,
}

/// Compute [`Statistics`] for a non-empty slice.
///
/// Per-day averages divide by the count of distinct calendar dates, not the
/// row count; duplicate same-day rows only contribute to the totals. The
/// distribution summaries run over the per-row total series, matching the
/// averages' source column but not its grouping.
pub fn analyze(slice: &MonthlySlice, layout: &ColumnLayout) -> Statistics {
    let total_expense = round2(slice.column_sum(layout.expense_total_idx));
    let total_income = round2(slice.column_sum(layout.income_total_idx));
    let net_income = round2(total_income - total_expense);

    let days = slice.distinct_dates().max(1) as f64;
    let average_daily_expense = round2(total_expense / days);
    let average_daily_income = round2(total_income / days);
    let average_daily_net = round2(net_income / days);

    let sums = |cats: &[crate::layout::CategoryColumn]| {
        cats.iter()
            .map(|c| CategoryTotal {
                name: c.name.clone(),
                amount: round2(slice.column_sum(c.index)),
            })
            .collect::<Vec<_>>()
    };

    Statistics {
        total_expense,
        average_daily_expense,
        total_income,
        average_daily_income,
        net_income,
        average_daily_net,
        expense_categories: sums(&layout.expense_categories),
        income_categories: sums(&layout.income_categories),
        daily_expense: daily_series(slice, layout.expense_total_idx),
        daily_income: daily_series(slice, layout.income_total_idx),
        expense_summary: Distribution::from_series(&slice.column_series(layout.expense_total_idx)),
        income_summary: Distribution::from_series(&slice.column_series(layout.income_total_idx)),
    }
}

/// Group one column by calendar date, summing same-day rows.
fn daily_series(slice: &MonthlySlice, idx: usize) -> BTreeMap<NaiveDate, f64> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in &slice.rows {
        let amount = row.cells.get(idx).and_then(Cell::as_number).unwrap_or(0.0);
        *out.entry(row.date).or_insert(0.0) += amount;
    }
    out
}

/// Categories sorted descending by raw amount (stable, so equal amounts
/// keep column order). Presentation order for pies and prompt lines.
pub fn sorted_descending(categories: &[CategoryTotal]) -> Vec<CategoryTotal> {
    let mut sorted = categories.to_vec();
    sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    sorted
}
