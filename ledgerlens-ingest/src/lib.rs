//! ledgerlens-ingest: ledger CSV loading (two-row header merge, YYYYMMDD
//! date coercion) and monthly extraction.

pub mod extract;
pub mod loader;

pub use extract::extract_monthly;
pub use loader::{load_table, normalize, FormatError, IngestError};
