//! On-page keyword presence analyzer.
//!
//! Reads a rank-tracking or search-console export, renders each ranking
//! page once in headless Chromium, and records whether each keyword
//! appears in the page's title, meta description, H1, H2, body copy,
//! image alt text and JSON-LD. Rows are then grouped per page into a main
//! and secondary keyword plan.

pub mod acquisition;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ingest;
pub mod pipeline;
pub mod renderer;
pub mod report;
pub mod stealth;

pub use config::{AnalyzerConfig, FetchConfig, FilterMode, ReportFormat};
pub use error::{AnalyzerError, Result};
pub use pipeline::{analyze, prepare, run_analysis, PreparedInput};
pub use report::{
    CsvReportEmitter, ProcessResult, ReportEmitter, ReportTables, XlsxReportEmitter,
};
