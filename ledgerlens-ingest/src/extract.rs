//! Cut one (year, month) out of a normalized ledger.

use tracing::info;

use ledgerlens_core::table::{MonthlySlice, NormalizedTable};

/// Extract the rows of (year, month): filter, zero-fill blanks, sort
/// ascending by date. An empty month is a first-class value, not an error.
pub fn extract_monthly(table: &NormalizedTable, year: i32, month: u32) -> MonthlySlice {
    let slice = MonthlySlice::extract(&table.columns, table.date_idx, &table.rows, year, month);
    info!(year, month, rows = slice.len(), "extracted monthly slice");
    slice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize;

    fn rec(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> NormalizedTable {
        normalize(vec![
            rec(&["基本信息", "基本信息", "支出", "收入"]),
            rec(&["日期", "备注", "总支出/天", "总收入/天"]),
            rec(&["20251102", "", "", "200"]),
            rec(&["20251101", "工作日", "100", "50"]),
            rec(&["20251215", "", "80", ""]),
        ])
        .unwrap()
    }

    #[test]
    fn test_extract_keeps_only_requested_month() {
        let slice = extract_monthly(&table(), 2025, 11);
        assert_eq!(slice.len(), 2);
        assert!(slice
            .rows
            .iter()
            .all(|r| r.date.to_string().starts_with("2025-11")));
    }

    #[test]
    fn test_extract_sorts_ascending() {
        let slice = extract_monthly(&table(), 2025, 11);
        assert!(slice.rows[0].date < slice.rows[1].date);
    }

    #[test]
    fn test_extract_missing_month_is_empty_not_error() {
        let slice = extract_monthly(&table(), 2025, 1);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let slice = extract_monthly(&table(), 2025, 11);
        assert_eq!(slice, slice.restrict(2025, 11));
    }

    #[test]
    fn test_zero_fill_does_not_leak_into_other_months() {
        // December's blank income cell must stay blank in the source table
        // after a November extraction.
        let t = table();
        let _ = extract_monthly(&t, 2025, 11);
        assert_eq!(
            t.rows.iter().filter(|r| r.date.to_string().starts_with("2025-12")).count(),
            1
        );
        let dec = extract_monthly(&t, 2025, 12);
        assert_eq!(dec.column_sum(3), 0.0);
    }
}
