//! Plain CSV report: one directory per run.

use super::{ReportEmitter, ReportTables, MAPPING_COLUMNS};
use crate::analysis::Summary;
use crate::error::{AnalyzerError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PRESENCE_FILE: &str = "on_page_targeting.csv";
pub const MAPPING_FILE: &str = "keyword_mapping.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Serialize)]
struct SummaryFile<'a> {
    generated_at: String,
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Writes `<output_dir>/<report_name>/` with the two tables as CSV and the
/// summary as JSON. Returns the directory name as the report reference.
pub struct CsvReportEmitter {
    output_dir: PathBuf,
}

impl CsvReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_tables(&self, dir: &Path, tables: &ReportTables) -> std::result::Result<(), String> {
        std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;

        let path = dir.join(PRESENCE_FILE);
        let mut out = csv::Writer::from_path(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        out.write_record(tables.presence_headers())
            .map_err(|e| e.to_string())?;
        for record in tables.presence_records() {
            out.write_record(&record).map_err(|e| e.to_string())?;
        }
        out.flush().map_err(|e| e.to_string())?;

        let path = dir.join(MAPPING_FILE);
        let mut out = csv::Writer::from_path(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        out.write_record(MAPPING_COLUMNS).map_err(|e| e.to_string())?;
        for record in tables.mapping_records() {
            out.write_record(&record).map_err(|e| e.to_string())?;
        }
        out.flush().map_err(|e| e.to_string())?;

        let path = dir.join(SUMMARY_FILE);
        let file = SummaryFile {
            generated_at: chrono::Utc::now().to_rfc3339(),
            summary: &tables.summary,
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| e.to_string())?;
        std::fs::write(&path, json).map_err(|e| format!("{}: {e}", path.display()))?;

        Ok(())
    }
}

impl ReportEmitter for CsvReportEmitter {
    fn emit(&self, tables: &ReportTables) -> Result<String> {
        let name = tables.report_name();
        let dir = self.output_dir.join(&name);

        self.write_tables(&dir, tables)
            .map_err(AnalyzerError::EmissionFailure)?;

        info!(
            rows = tables.rows.len(),
            pages = tables.mapping.len(),
            "report written to {}",
            dir.display()
        );
        Ok(name)
    }
}
