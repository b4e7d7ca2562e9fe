//! ledgerlens-core: data model, column-layout contract, and statistics for
//! the monthly spending report pipeline.

pub mod analyze;
pub mod layout;
pub mod stats;
pub mod table;

pub use analyze::{analyze, sorted_descending, CategoryTotal, Statistics};
pub use layout::{
    ColumnLayout, LayoutError, DATE_COLUMN, EXPENSE_TOTAL_COLUMN, INCOME_COLUMNS,
    INCOME_TOTAL_COLUMN, METADATA_COLUMNS,
};
pub use stats::{round1, round2, share, Distribution};
pub use table::{Cell, MonthlySlice, NormalizedTable, Row};
