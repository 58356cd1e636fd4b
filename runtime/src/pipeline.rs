//! End-to-end run: load, normalize, filter, analyze, map, summarize, emit.
//!
//! Input and schema problems surface before any page is rendered, and no
//! report is written unless every stage succeeded.

use crate::acquisition::ContentCache;
use crate::analysis::{AnalysisDriver, AnalysisRow};
use crate::config::{AnalyzerConfig, FilterMode};
use crate::error::Result;
use crate::ingest::{filter_rows, load_table, normalize, CanonicalRow, SourceKind};
use crate::renderer::Renderer;
use crate::report::{ProcessResult, ReportEmitter, ReportTables};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Rows that survived normalization and filtering, ready to analyze.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub source: SourceKind,
    pub rows: Vec<CanonicalRow>,
}

/// Load and classify `input`, then apply the row filter.
pub fn prepare(input: &Path, filter: FilterMode) -> Result<PreparedInput> {
    let raw = load_table(input)?;
    let table = normalize(&raw)?;

    let before = table.rows.len();
    let rows = filter_rows(table.rows, filter, table.has_position);
    if filter == FilterMode::Recommended && !table.has_position {
        warn!("no Position column; recommended filter keeps every row");
    }
    info!(
        source = %table.source,
        kept = rows.len(),
        dropped = before - rows.len(),
        "filtered input rows"
    );

    Ok(PreparedInput {
        source: table.source,
        rows,
    })
}

/// Render and check every prepared row, then hand the tables to `emitter`.
///
/// `on_row(done, total, row)` fires after each analyzed row.
pub async fn analyze<F>(
    input: PreparedInput,
    config: &AnalyzerConfig,
    renderer: Arc<dyn Renderer>,
    emitter: &dyn ReportEmitter,
    mut on_row: F,
) -> Result<ProcessResult>
where
    F: FnMut(usize, usize, &AnalysisRow),
{
    let total = input.rows.len();
    let cache = ContentCache::from_config(renderer, &config.fetch);
    let mut driver = AnalysisDriver::new(cache);

    let rows = driver
        .run_with(&input.rows, input.source, |i, row| on_row(i + 1, total, row))
        .await;

    let tables = ReportTables::build(input.source, config.filter, rows);
    let report = emitter.emit(&tables)?;
    Ok(ProcessResult::success(report, &tables))
}

/// [`prepare`] then [`analyze`], folding any failure into the process result.
pub async fn run_analysis(
    config: &AnalyzerConfig,
    input: &Path,
    renderer: Arc<dyn Renderer>,
    emitter: &dyn ReportEmitter,
) -> ProcessResult {
    let outcome = match prepare(input, config.filter) {
        Ok(prepared) => analyze(prepared, config, renderer, emitter, |_, _, _| {}).await,
        Err(e) => Err(e),
    };
    outcome.unwrap_or_else(|e| {
        warn!("analysis failed: {e}");
        ProcessResult::failure(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::page_fetcher::testing::ScriptedRenderer;
    use crate::config::{FetchConfig, ReportFormat};
    use crate::report::CsvReportEmitter;
    use std::io::Write;

    fn config(output: &Path, filter: FilterMode) -> AnalyzerConfig {
        AnalyzerConfig {
            filter,
            output_dir: output.to_path_buf(),
            report_format: ReportFormat::Csv,
            fetch: FetchConfig::immediate(),
        }
    }

    fn write_input(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_prepare_applies_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(
            tmp.path(),
            "rt.csv",
            "Keyword,URL,Search Volume,Position\n\
             too high,https://x.com/,100,3\n\
             sweet spot,https://x.com/,100,12\n",
        );

        let prepared = prepare(&input, FilterMode::Recommended).unwrap();
        assert_eq!(prepared.source, SourceKind::RankTracking);
        assert_eq!(prepared.rows.len(), 1);
        assert_eq!(prepared.rows[0].query, "sweet spot");

        let prepared = prepare(&input, FilterMode::All).unwrap();
        assert_eq!(prepared.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_schema_error_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("results");
        let input = write_input(tmp.path(), "bad.csv", "foo,bar\n1,2\n");
        let renderer = Arc::new(ScriptedRenderer::default());

        let result = run_analysis(
            &config(&out, FilterMode::All),
            &input,
            renderer.clone(),
            &CsvReportEmitter::new(&out),
        )
        .await;

        assert!(!result.is_success());
        assert!(!out.exists());
        assert_eq!(renderer.navigations_for("https://x.com/"), 0);
    }

    #[tokio::test]
    async fn test_progress_callback_counts_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("results");
        let renderer = Arc::new(ScriptedRenderer::default().page("https://x.com/", "<h1>hat</h1>"));
        let prepared = PreparedInput {
            source: SourceKind::SearchConsole,
            rows: vec![
                CanonicalRow::new("hat", "https://x.com/"),
                CanonicalRow::new("scarf", "https://x.com/"),
            ],
        };

        let mut ticks = Vec::new();
        let result = analyze(
            prepared,
            &config(&out, FilterMode::All),
            renderer,
            &CsvReportEmitter::new(&out),
            |done, total, _| ticks.push((done, total)),
        )
        .await
        .unwrap();

        assert!(result.is_success());
        assert_eq!(ticks, vec![(1, 2), (2, 2)]);
        assert!(out.join("keyword_analysis_search_console_all").is_dir());
    }
}
