//! Report tables and the emitter boundary.
//!
//! [`ReportTables`] is everything an emitter needs: the per-row presence
//! table, the per-page keyword mapping and the run summary. Presentation
//! rules (`YES`/`NO`, `N/A` for absent metrics, integers without a
//! trailing `.0`) are applied here so every emitter renders cells the same
//! way. File layout and styling belong to the emitter.

pub mod csv_emitter;
pub mod process;
pub mod xlsx_emitter;

pub use csv_emitter::CsvReportEmitter;
pub use process::ProcessResult;
pub use xlsx_emitter::XlsxReportEmitter;

use crate::analysis::{map_keywords, summarize, AnalysisRow, RowMetrics, Summary, UrlMappingEntry};
use crate::config::FilterMode;
use crate::error::Result;
use crate::extraction::Zone;
use crate::ingest::SourceKind;

/// Leading columns of the presence table, before the metric columns.
pub const PRESENCE_COLUMNS: [&str; 9] = [
    "Keyword",
    "URL",
    "Title",
    "Description",
    "H1",
    "H2",
    "Content",
    "Alt Text",
    "Schema",
];

pub const RANK_TRACKING_METRICS: [&str; 2] = ["Traffic Opportunity", "Position"];

pub const SEARCH_CONSOLE_METRICS: [&str; 5] =
    ["Clicks", "Impressions", "CTR", "Position", "Traffic Opportunity"];

pub const MAPPING_COLUMNS: [&str; 3] = ["URL", "Main Keyword", "Secondary Keywords (Top 6)"];

/// Rendered for a metric the source did not carry.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn yes_no(present: bool) -> &'static str {
    if present {
        "YES"
    } else {
        "NO"
    }
}

/// Format a metric cell: `N/A` when absent, no trailing `.0` on integers.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        None => NOT_AVAILABLE.to_string(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => v.to_string(),
    }
}

/// Metric column labels reported for `source`.
pub fn metric_columns(source: SourceKind) -> &'static [&'static str] {
    match source {
        SourceKind::RankTracking => &RANK_TRACKING_METRICS,
        SourceKind::SearchConsole | SourceKind::Unknown => &SEARCH_CONSOLE_METRICS,
    }
}

fn metric_cells(metrics: &RowMetrics) -> Vec<String> {
    match metrics {
        RowMetrics::RankTracking {
            traffic_opportunity,
            position,
        } => vec![format_metric(*traffic_opportunity), format_metric(*position)],
        RowMetrics::SearchConsole {
            clicks,
            impressions,
            ctr,
            position,
            traffic_opportunity,
        } => vec![
            format_metric(*clicks),
            format_metric(*impressions),
            format_metric(*ctr),
            format_metric(*position),
            format_metric(*traffic_opportunity),
        ],
    }
}

/// The finished run, ready for an emitter.
#[derive(Debug, Clone)]
pub struct ReportTables {
    pub source: SourceKind,
    pub filter: FilterMode,
    pub rows: Vec<AnalysisRow>,
    pub mapping: Vec<UrlMappingEntry>,
    pub summary: Summary,
}

impl ReportTables {
    /// Build the mapping and summary from the analyzed rows.
    pub fn build(source: SourceKind, filter: FilterMode, rows: Vec<AnalysisRow>) -> Self {
        let mapping = map_keywords(&rows);
        let summary = summarize(source, &rows);
        Self {
            source,
            filter,
            rows,
            mapping,
            summary,
        }
    }

    /// `keyword_analysis_{source}_{filter}`, without extension.
    pub fn report_name(&self) -> String {
        format!(
            "keyword_analysis_{}_{}",
            self.source.as_str(),
            self.filter.report_suffix()
        )
    }

    pub fn presence_headers(&self) -> Vec<&'static str> {
        PRESENCE_COLUMNS
            .iter()
            .chain(metric_columns(self.source))
            .copied()
            .collect()
    }

    /// Presence table records in input order, as display strings.
    pub fn presence_records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            let mut cells = vec![row.query.clone(), row.page.clone()];
            cells.extend(row.presence.iter().map(|(_, p)| yes_no(p).to_string()));
            cells.extend(metric_cells(&row.metrics));
            cells
        })
    }

    pub fn mapping_records(&self) -> impl Iterator<Item = [String; 3]> + '_ {
        self.mapping.iter().map(|entry| {
            [
                entry.page.clone(),
                entry.main_keyword.clone(),
                entry.secondary_display(),
            ]
        })
    }

    /// Zone labels in report column order, for summary rendering.
    pub fn zone_labels() -> impl Iterator<Item = &'static str> {
        Zone::ALL.into_iter().map(Zone::label)
    }
}

/// Persists a report and returns a reference to it (file or directory name).
pub trait ReportEmitter {
    fn emit(&self, tables: &ReportTables) -> Result<String>;
}
