//! Page acquisition: render a ranking page once per run and keep it.
//!
//! [`page_fetcher`] owns the two-attempt render strategy, [`pacer`] the
//! politeness delay, and [`content_cache`] ties them together so each
//! distinct URL is rendered (and paced) exactly once.

pub mod content_cache;
pub mod pacer;
pub mod page_fetcher;

pub use content_cache::{ContentCache, FetchStats, FetchedContent};
pub use pacer::Pacer;
pub use page_fetcher::{FetchError, PageFetcher};
