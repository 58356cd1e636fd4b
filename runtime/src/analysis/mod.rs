//! Per-row analysis and the aggregates built from it.
//!
//! The driver walks the filtered rows in order, rendering each page at most
//! once and checking the row's keyword against it. The mapper and summary
//! then work purely on the finished [`AnalysisRow`] set.

pub mod driver;
pub mod mapper;
pub mod summary;

pub use driver::{AnalysisDriver, AnalysisRow, RowMetrics};
pub use mapper::{map_keywords, UrlMappingEntry, MAX_SECONDARY_KEYWORDS};
pub use summary::{summarize, Summary, ZoneSummary};
