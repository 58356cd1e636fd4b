//! The JSON object printed on stdout when a run finishes.

use super::{format_metric, yes_no, ReportTables};
use crate::analysis::Summary;
use serde::Serialize;

/// One presence row, every value rendered as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnPageRecord {
    pub keyword: String,
    pub url: String,
    pub title: &'static str,
    pub description: &'static str,
    pub h1: &'static str,
    pub h2: &'static str,
    pub content: &'static str,
    pub alt_text: &'static str,
    pub schema: &'static str,
    pub position: String,
    pub traffic_opportunity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingRecord {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Main Keyword")]
    pub main_keyword: String,
    #[serde(rename = "Secondary Keywords (Top 6)")]
    pub secondary_keywords: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessResult {
    success: bool,
    /// Report reference returned by the emitter.
    pub excel_file: String,
    pub data_source: &'static str,
    pub summary: Summary,
    pub onpage_results: Vec<OnPageRecord>,
    pub keyword_mapping: Vec<MappingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResult {
    success: bool,
    pub error: String,
}

/// Outcome of a whole run. Serializes to `{"success": true, ...}` or
/// `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessResult {
    Success(Box<SuccessResult>),
    Failure(FailureResult),
}

impl ProcessResult {
    pub fn success(report: String, tables: &ReportTables) -> Self {
        let onpage_results = tables
            .rows
            .iter()
            .map(|row| OnPageRecord {
                keyword: row.query.clone(),
                url: row.page.clone(),
                title: yes_no(row.presence.title),
                description: yes_no(row.presence.description),
                h1: yes_no(row.presence.h1),
                h2: yes_no(row.presence.h2),
                content: yes_no(row.presence.content),
                alt_text: yes_no(row.presence.alt_text),
                schema: yes_no(row.presence.schema),
                position: format_metric(row.metrics.position()),
                traffic_opportunity: format_metric(row.metrics.traffic_opportunity()),
            })
            .collect();

        let keyword_mapping = tables
            .mapping
            .iter()
            .map(|entry| MappingRecord {
                url: entry.page.clone(),
                main_keyword: entry.main_keyword.clone(),
                secondary_keywords: entry.secondary_display(),
            })
            .collect();

        Self::Success(Box::new(SuccessResult {
            success: true,
            excel_file: report,
            data_source: tables.source.as_str(),
            summary: tables.summary.clone(),
            onpage_results,
            keyword_mapping,
        }))
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self::Failure(FailureResult {
            success: false,
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e.to_string() })
        })
    }
}
