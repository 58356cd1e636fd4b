//! Input ingestion: read a keyword export, classify it, normalize it and
//! filter it down to the rows worth auditing.

pub mod filter;
pub mod loader;
pub mod normalizer;

pub use filter::filter_rows;
pub use loader::{load_table, RawTable};
pub use normalizer::{normalize, CanonicalRow, NormalizedTable, SourceKind};
