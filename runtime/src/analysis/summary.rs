//! Run-level aggregates over the analysis rows.

use super::driver::AnalysisRow;
use crate::extraction::Zone;
use crate::ingest::SourceKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Yes/no split for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub yes: usize,
    pub no: usize,
    /// Share of rows with the keyword present, rounded to one decimal.
    pub yes_percentage: f64,
}

/// Aggregates handed to the report emitter alongside the two tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Upper-cased source label, e.g. `RANK_TRACKING`.
    pub data_source: String,
    pub total_keywords: usize,
    /// Keyed by report column label ("Title", "Alt Text", ...).
    pub elements: BTreeMap<&'static str, ZoneSummary>,
    /// Sum of traffic opportunity, missing values counted as 0.
    pub total_traffic_opportunity: u64,
    /// Rows recorded absent because the page or a zone could not be read.
    pub degraded_rows: usize,
}

impl Summary {
    pub fn zone(&self, zone: Zone) -> Option<&ZoneSummary> {
        self.elements.get(zone.label())
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Compute the summary for a finished run.
pub fn summarize(source: SourceKind, rows: &[AnalysisRow]) -> Summary {
    let total = rows.len();

    let elements = Zone::ALL
        .into_iter()
        .map(|zone| {
            let yes = rows.iter().filter(|r| r.presence.get(zone)).count();
            let yes_percentage = if total > 0 {
                round1(yes as f64 / total as f64 * 100.0)
            } else {
                0.0
            };
            (
                zone.label(),
                ZoneSummary {
                    yes,
                    no: total - yes,
                    yes_percentage,
                },
            )
        })
        .collect();

    let opportunity: f64 = rows
        .iter()
        .filter_map(|r| r.metrics.traffic_opportunity())
        .sum();

    Summary {
        data_source: source.as_str().to_uppercase(),
        total_keywords: total,
        elements,
        total_traffic_opportunity: opportunity.max(0.0) as u64,
        degraded_rows: rows.iter().filter(|r| r.degraded.is_some()).count(),
    }
}
