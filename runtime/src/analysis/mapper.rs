//! Main / secondary keyword selection per page.

use super::driver::AnalysisRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Secondary keywords kept per page (ranks 2 through 7).
pub const MAX_SECONDARY_KEYWORDS: usize = 6;

/// Placeholder rendered when a page has no secondary keywords.
pub const NO_SECONDARY: &str = "None";

/// The keyword plan for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMappingEntry {
    pub page: String,
    pub main_keyword: String,
    pub secondary_keywords: Vec<String>,
}

impl UrlMappingEntry {
    /// Secondary keywords joined with `"; "`, or `"None"` when empty.
    pub fn secondary_display(&self) -> String {
        if self.secondary_keywords.is_empty() {
            NO_SECONDARY.to_string()
        } else {
            self.secondary_keywords.join("; ")
        }
    }
}

/// Group rows by page and pick one main and up to six secondary keywords.
///
/// Within a page, rows rank by [`RowMetrics::ranking_value`] descending;
/// the sort is stable so ties keep input order. Entries come out sorted by
/// page.
///
/// [`RowMetrics::ranking_value`]: super::driver::RowMetrics::ranking_value
pub fn map_keywords(rows: &[AnalysisRow]) -> Vec<UrlMappingEntry> {
    let mut groups: BTreeMap<&str, Vec<&AnalysisRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.page.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .filter_map(|(page, mut group)| {
            group.sort_by(|a, b| {
                b.metrics
                    .ranking_value()
                    .partial_cmp(&a.metrics.ranking_value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let (main, rest) = group.split_first()?;
            let mut secondary: Vec<String> = Vec::with_capacity(MAX_SECONDARY_KEYWORDS);
            for row in rest {
                if secondary.len() == MAX_SECONDARY_KEYWORDS {
                    break;
                }
                // repeated queries can only come from unfiltered input
                if row.query == main.query || secondary.contains(&row.query) {
                    continue;
                }
                secondary.push(row.query.clone());
            }

            Some(UrlMappingEntry {
                page: page.to_string(),
                main_keyword: main.query.clone(),
                secondary_keywords: secondary,
            })
        })
        .collect()
}
