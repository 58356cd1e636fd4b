//! Run configuration.
//!
//! Every timing constant used by the fetch path is a field here rather than
//! a literal, so runs against slow sites (or tests) can tune them.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome user agent used for the primary render attempt.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shorter user agent used by the fallback attempt.
pub const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Which rows survive the row filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Only rows ranking in positions 5 through 20.
    #[default]
    Recommended,
    /// Every row.
    All,
}

impl FilterMode {
    /// Suffix used in report names.
    pub fn report_suffix(self) -> &'static str {
        match self {
            Self::Recommended => "pos5-20",
            Self::All => "all",
        }
    }
}

/// Shape of the written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// One workbook with an on-page sheet and a mapping sheet.
    #[default]
    Xlsx,
    /// A directory of CSV tables plus `summary.json`.
    Csv,
}

/// How a page is rendered and how politely the fetcher paces itself.
#[derive(Debug, Clone, Serialize)]
pub struct FetchConfig {
    pub user_agent: String,
    pub fallback_user_agent: String,
    pub viewport: (u32, u32),
    /// Navigation timeout for the network-idle attempt.
    pub primary_timeout: Duration,
    /// Navigation timeout for the DOM-loaded retry.
    pub fallback_timeout: Duration,
    pub primary_settle: Duration,
    pub fallback_settle: Duration,
    /// How long to wait for `body` after the primary attempt settles.
    pub body_wait: Duration,
    /// Sleep after a distinct fetch that produced content.
    pub success_delay: Duration,
    /// Sleep after a distinct fetch that ended unavailable.
    pub failure_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_user_agent: FALLBACK_USER_AGENT.to_string(),
            viewport: (1920, 1080),
            primary_timeout: Duration::from_secs(30),
            fallback_timeout: Duration::from_secs(60),
            primary_settle: Duration::from_secs(2),
            fallback_settle: Duration::from_secs(3),
            body_wait: Duration::from_secs(5),
            success_delay: Duration::from_secs(2),
            failure_delay: Duration::from_secs(5),
        }
    }
}

impl FetchConfig {
    /// A config with every wait set to zero. Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            primary_settle: Duration::ZERO,
            fallback_settle: Duration::ZERO,
            success_delay: Duration::ZERO,
            failure_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerConfig {
    pub filter: FilterMode,
    pub output_dir: PathBuf,
    pub report_format: ReportFormat,
    pub fetch: FetchConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            filter: FilterMode::Recommended,
            output_dir: PathBuf::from("results"),
            report_format: ReportFormat::Xlsx,
            fetch: FetchConfig::default(),
        }
    }
}
