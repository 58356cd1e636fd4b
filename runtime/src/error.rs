//! Run-level error taxonomy.
//!
//! Only failures that abort a run live here. Per-URL fetch failures
//! ([`crate::acquisition::FetchError`]) and per-row extraction failures
//! ([`crate::extraction::PresenceError`]) are absorbed by the analysis
//! driver and recorded as all-NO presence instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The input file could not be read or parsed as a supported table.
    #[error("unreadable input {path}: {reason}")]
    UnreadableInput { path: PathBuf, reason: String },

    /// The header row matches neither a rank-tracking nor a search-console export.
    #[error("unrecognized input schema (columns: {})", .columns.join(", "))]
    UnrecognizedSchema { columns: Vec<String> },

    /// Query or Page is absent after column mapping.
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingRequiredColumns { missing: Vec<&'static str> },

    /// The report emitter could not persist the report.
    #[error("failed to write report: {0}")]
    EmissionFailure(String),
}

impl AnalyzerError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
