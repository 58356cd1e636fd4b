//! Per-run page cache.
//!
//! Keys are the literal page strings from the input: no trailing-slash,
//! scheme or query normalization. A URL that failed stays failed for the
//! rest of the run.

use super::pacer::{FetchOutcome, Pacer};
use super::page_fetcher::PageFetcher;
use crate::config::FetchConfig;
use crate::renderer::Renderer;
use scraper::Html;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A rendered page, or the marker that it could not be rendered.
#[derive(Debug)]
pub enum FetchedContent {
    Available(Html),
    Unavailable,
}

impl FetchedContent {
    /// Parse raw HTML into the cached representation.
    pub fn from_html(html: &str) -> Self {
        Self::Available(Html::parse_document(html))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Distinct URLs rendered (successfully or not).
    pub fetches: usize,
    pub cache_hits: usize,
    pub unavailable: usize,
    /// Total politeness delay applied.
    pub paced: Duration,
}

/// Renders each distinct URL once and serves repeats from memory.
pub struct ContentCache {
    fetcher: PageFetcher,
    pacer: Pacer,
    entries: HashMap<String, FetchedContent>,
    stats: FetchStats,
}

impl ContentCache {
    pub fn new(fetcher: PageFetcher, pacer: Pacer) -> Self {
        Self {
            fetcher,
            pacer,
            entries: HashMap::new(),
            stats: FetchStats::default(),
        }
    }

    /// Cache wired to `renderer` with the fetch and pacing settings in `config`.
    pub fn from_config(renderer: Arc<dyn Renderer>, config: &FetchConfig) -> Self {
        Self::new(
            PageFetcher::new(renderer, config),
            Pacer::new(config.success_delay, config.failure_delay),
        )
    }

    /// Content for `url`, rendering it on first request.
    ///
    /// A first request renders, caches the outcome and then sleeps for the
    /// politeness delay. Repeat requests return immediately.
    pub async fn get(&mut self, url: &str) -> &FetchedContent {
        if self.entries.contains_key(url) {
            self.stats.cache_hits += 1;
            return &self.entries[url];
        }

        let content = match self.fetcher.fetch_html(url).await {
            Ok(html) => FetchedContent::from_html(&html),
            Err(e) => {
                warn!("{e}");
                FetchedContent::Unavailable
            }
        };

        let outcome = if content.is_available() {
            FetchOutcome::Content
        } else {
            self.stats.unavailable += 1;
            FetchOutcome::Unavailable
        };
        self.stats.fetches += 1;
        self.entries.insert(url.to_string(), content);

        self.stats.paced += self.pacer.pause(outcome).await;
        &self.entries[url]
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Number of distinct URLs held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log the run's counters.
    pub fn log_stats(&self) {
        let s = &self.stats;
        info!(
            fetches = s.fetches,
            cache_hits = s.cache_hits,
            unavailable = s.unavailable,
            paced_ms = s.paced.as_millis() as u64,
            "page cache finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::page_fetcher::testing::{Script, ScriptedRenderer};
    use super::*;

    fn config(success_ms: u64, failure_ms: u64) -> FetchConfig {
        FetchConfig {
            success_delay: Duration::from_millis(success_ms),
            failure_delay: Duration::from_millis(failure_ms),
            ..FetchConfig::immediate()
        }
    }

    #[tokio::test]
    async fn test_one_fetch_per_distinct_url() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .page("https://x.com/a", "<title>A</title>")
                .page("https://x.com/b", "<title>B</title>"),
        );
        let mut cache = ContentCache::from_config(renderer.clone(), &config(0, 0));

        for url in ["https://x.com/a", "https://x.com/b", "https://x.com/a", "https://x.com/a"] {
            assert!(cache.get(url).await.is_available());
        }

        assert_eq!(renderer.navigations_for("https://x.com/a"), 1);
        assert_eq!(renderer.navigations_for("https://x.com/b"), 1);
        assert_eq!(cache.stats().fetches, 2);
        assert_eq!(cache.stats().cache_hits, 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_url_is_not_refetched() {
        let renderer = Arc::new(ScriptedRenderer::default().with("https://down.test/", Script::Down));
        let mut cache = ContentCache::from_config(renderer.clone(), &config(0, 0));

        assert!(!cache.get("https://down.test/").await.is_available());
        assert!(!cache.get("https://down.test/").await.is_available());

        // primary + fallback on the first request only
        assert_eq!(renderer.navigations_for("https://down.test/"), 2);
        assert_eq!(cache.stats().unavailable, 1);
        assert_eq!(cache.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_delay_only_after_distinct_fetches() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .page("https://x.com/ok", "<p>ok</p>")
                .with("https://x.com/down", Script::Down),
        );
        let mut cache = ContentCache::from_config(renderer, &config(3, 7));

        cache.get("https://x.com/ok").await;
        cache.get("https://x.com/ok").await;
        cache.get("https://x.com/down").await;
        cache.get("https://x.com/down").await;

        assert_eq!(cache.stats().paced, Duration::from_millis(3 + 7));
    }

    #[tokio::test]
    async fn test_key_is_literal_url() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .page("https://x.com/a", "<p>a</p>")
                .page("https://x.com/a/", "<p>a/</p>"),
        );
        let mut cache = ContentCache::from_config(renderer.clone(), &config(0, 0));

        cache.get("https://x.com/a").await;
        cache.get("https://x.com/a/").await;

        assert_eq!(cache.stats().fetches, 2);
        assert_eq!(renderer.navigations_for("https://x.com/a/"), 1);
    }
}
