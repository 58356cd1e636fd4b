//! Sequential fetch-and-match over the normalized rows.

use crate::acquisition::ContentCache;
use crate::extraction::{match_presence, PresenceError, PresenceResult};
use crate::ingest::{CanonicalRow, SourceKind};
use serde::Serialize;
use tracing::{debug, warn};

/// Metric columns carried by an analysis row, depending on the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RowMetrics {
    RankTracking {
        traffic_opportunity: Option<f64>,
        position: Option<f64>,
    },
    SearchConsole {
        clicks: Option<f64>,
        impressions: Option<f64>,
        ctr: Option<f64>,
        position: Option<f64>,
        traffic_opportunity: Option<f64>,
    },
}

impl RowMetrics {
    /// Pick the metric subset `source` reports.
    pub fn for_source(source: SourceKind, row: &CanonicalRow) -> Self {
        match source {
            SourceKind::RankTracking => Self::RankTracking {
                traffic_opportunity: row.traffic_opportunity,
                position: row.position,
            },
            SourceKind::SearchConsole | SourceKind::Unknown => Self::SearchConsole {
                clicks: row.clicks,
                impressions: row.impressions,
                ctr: row.ctr,
                position: row.position,
                traffic_opportunity: row.traffic_opportunity,
            },
        }
    }

    pub fn position(&self) -> Option<f64> {
        match self {
            Self::RankTracking { position, .. } | Self::SearchConsole { position, .. } => *position,
        }
    }

    pub fn traffic_opportunity(&self) -> Option<f64> {
        match self {
            Self::RankTracking {
                traffic_opportunity,
                ..
            }
            | Self::SearchConsole {
                traffic_opportunity,
                ..
            } => *traffic_opportunity,
        }
    }

    /// Value keywords on the same page are ranked by: traffic opportunity
    /// for rank tracking, clicks for search console. Missing counts as 0.
    pub fn ranking_value(&self) -> f64 {
        match self {
            Self::RankTracking {
                traffic_opportunity,
                ..
            } => traffic_opportunity.unwrap_or(0.0),
            Self::SearchConsole { clicks, .. } => clicks.unwrap_or(0.0),
        }
    }
}

/// One audited keyword row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub query: String,
    pub page: String,
    pub presence: PresenceResult,
    pub metrics: RowMetrics,
    /// Set when presence was recorded as all-absent because of a failure
    /// rather than a genuine miss.
    #[serde(skip)]
    pub degraded: Option<PresenceError>,
}

impl AnalysisRow {
    pub fn new(row: &CanonicalRow, source: SourceKind, presence: Result<PresenceResult, PresenceError>) -> Self {
        let (presence, degraded) = match presence {
            Ok(p) => (p, None),
            Err(e) => (PresenceResult::NONE, Some(e)),
        };
        Self {
            query: row.query.clone(),
            page: row.page.clone(),
            presence,
            metrics: RowMetrics::for_source(source, row),
            degraded,
        }
    }
}

/// Owns the run's page cache and sequences every lookup and match.
pub struct AnalysisDriver {
    cache: ContentCache,
}

impl AnalysisDriver {
    pub fn new(cache: ContentCache) -> Self {
        Self { cache }
    }

    /// Analyze `rows` in order. Every input row yields exactly one output row.
    pub async fn run(&mut self, rows: &[CanonicalRow], source: SourceKind) -> Vec<AnalysisRow> {
        self.run_with(rows, source, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_row(index, row)` after each row.
    pub async fn run_with<F>(
        &mut self,
        rows: &[CanonicalRow],
        source: SourceKind,
        mut on_row: F,
    ) -> Vec<AnalysisRow>
    where
        F: FnMut(usize, &AnalysisRow),
    {
        let mut results = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let content = self.cache.get(&row.page).await;
            let presence = match_presence(content, &row.query);

            match &presence {
                Ok(_) => debug!("checked '{}' on {}", row.query, row.page),
                Err(PresenceError::ContentUnavailable) => {
                    debug!("'{}' recorded absent: {} unavailable", row.query, row.page)
                }
                Err(e) => warn!("'{}' on {}: {e}", row.query, row.page),
            }

            let analyzed = AnalysisRow::new(row, source, presence);
            on_row(i, &analyzed);
            results.push(analyzed);
        }

        self.cache.log_stats();
        results
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::page_fetcher::testing::{Script, ScriptedRenderer};
    use crate::config::FetchConfig;
    use std::sync::Arc;

    fn driver(renderer: ScriptedRenderer) -> (AnalysisDriver, Arc<ScriptedRenderer>) {
        let renderer = Arc::new(renderer);
        let cache = ContentCache::from_config(renderer.clone(), &FetchConfig::immediate());
        (AnalysisDriver::new(cache), renderer)
    }

    #[tokio::test]
    async fn test_rows_keep_input_order_and_share_pages() {
        let (mut driver, renderer) = driver(
            ScriptedRenderer::default()
                .page("https://x.com/a", "<title>Red Shoes and Blue Shoes</title>")
                .page("https://x.com/b", "<h1>Green hat</h1>"),
        );
        let rows = vec![
            CanonicalRow::new("red shoes", "https://x.com/a"),
            CanonicalRow::new("green hat", "https://x.com/b"),
            CanonicalRow::new("blue shoes", "https://x.com/a"),
        ];

        let out = driver.run(&rows, SourceKind::RankTracking).await;

        let queries: Vec<_> = out.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["red shoes", "green hat", "blue shoes"]);
        assert!(out[0].presence.title);
        assert!(out[1].presence.h1);
        assert!(out[2].presence.title);
        assert_eq!(renderer.navigations_for("https://x.com/a"), 1);
        assert_eq!(driver.cache().stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_unavailable_page_still_yields_row() {
        let (mut driver, _) =
            driver(ScriptedRenderer::default().with("https://down.test/", Script::Down));
        let rows = vec![CanonicalRow::new("anything", "https://down.test/")];

        let out = driver.run(&rows, SourceKind::SearchConsole).await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].presence, PresenceResult::NONE);
        assert_eq!(out[0].degraded, Some(PresenceError::ContentUnavailable));
    }

    #[tokio::test]
    async fn test_metrics_follow_source() {
        let (mut driver, _) = driver(ScriptedRenderer::default().page("https://x.com/", "<p/>"));
        let row = CanonicalRow {
            clicks: Some(4.0),
            impressions: Some(10.0),
            traffic_opportunity: Some(6.0),
            position: Some(7.0),
            ..CanonicalRow::new("q", "https://x.com/")
        };

        let out = driver.run(&[row.clone()], SourceKind::SearchConsole).await;
        assert_eq!(out[0].metrics.ranking_value(), 4.0);
        assert_eq!(out[0].metrics.position(), Some(7.0));

        let out = driver.run(&[row], SourceKind::RankTracking).await;
        assert_eq!(out[0].metrics.ranking_value(), 6.0);
        assert!(matches!(out[0].metrics, RowMetrics::RankTracking { .. }));
    }

    #[tokio::test]
    async fn test_observer_sees_every_row() {
        let (mut driver, _) = driver(ScriptedRenderer::default().page("https://x.com/", "<p/>"));
        let rows = vec![
            CanonicalRow::new("a", "https://x.com/"),
            CanonicalRow::new("b", "https://x.com/"),
        ];
        let mut seen = Vec::new();
        driver
            .run_with(&rows, SourceKind::RankTracking, |i, r| seen.push((i, r.query.clone())))
            .await;
        assert_eq!(seen, vec![(0, "a".to_string()), (1, "b".to_string())]);
    }
}
