//! `onpage <INPUT>`: audit keyword placement on ranking pages.

use crate::cli::output::{self, Styled};
use crate::analysis::AnalysisRow;
use crate::cli::progress;
use crate::config::{AnalyzerConfig, ReportFormat};
use crate::pipeline;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::report::{CsvReportEmitter, ProcessResult, ReportEmitter, XlsxReportEmitter};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Display switches for the command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Display {
    pub progress: bool,
    pub summary: bool,
    /// Suppress the summary and failure banners on stderr.
    pub quiet: bool,
}

/// Emitter for the configured report format.
pub fn report_emitter(config: &AnalyzerConfig) -> Box<dyn ReportEmitter> {
    match config.report_format {
        ReportFormat::Xlsx => Box::new(XlsxReportEmitter::new(&config.output_dir)),
        ReportFormat::Csv => Box::new(CsvReportEmitter::new(&config.output_dir)),
    }
}

/// Run the analysis and return the process result to print.
///
/// Input problems are reported before the browser is launched.
pub async fn run(input: &Path, config: &AnalyzerConfig, display: Display) -> ProcessResult {
    let s = Styled::new();
    let start = Instant::now();

    match execute(input, config, display).await {
        Ok(result) => {
            if display.summary && !display.quiet {
                if let ProcessResult::Success(report) = &result {
                    output::print_summary(
                        &s,
                        &report.summary,
                        &config.output_dir.join(&report.excel_file).display().to_string(),
                        start.elapsed().as_secs(),
                    );
                }
            }
            result
        }
        Err(e) => {
            let message = format!("{e:#}");
            if !display.quiet {
                output::print_failure(&s, &message);
            }
            ProcessResult::failure(message)
        }
    }
}

async fn execute(input: &Path, config: &AnalyzerConfig, display: Display) -> Result<ProcessResult> {
    let prepared = pipeline::prepare(input, config.filter)?;
    let total = prepared.rows.len();

    let spinner = display.progress.then(|| progress::create_spinner("Launching browser"));
    let launched = ChromiumRenderer::launch(config.fetch.viewport).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let renderer: Arc<dyn Renderer> = Arc::new(launched.context("browser unavailable")?);
    info!("analyzing {total} rows from {}", input.display());

    let bar = display.progress.then(|| progress::create_row_progress(total));
    let emitter = report_emitter(config);
    let s = Styled::new();
    let on_row = |done: usize, _: usize, row: &AnalysisRow| {
        if let Some(bar) = &bar {
            progress::set_row_done(bar, &s, done, &row.query, &row.page);
        }
    };
    let outcome =
        pipeline::analyze(prepared, config, renderer.clone(), emitter.as_ref(), on_row).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if let Err(e) = renderer.shutdown().await {
        warn!("browser shutdown: {e:#}");
    }

    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterMode;
    use crate::ingest::SourceKind;
    use crate::report::ReportTables;

    #[test]
    fn test_report_format_picks_emitter() {
        let tmp = tempfile::tempdir().unwrap();
        let tables = ReportTables::build(SourceKind::RankTracking, FilterMode::All, vec![]);
        let mut config = AnalyzerConfig {
            output_dir: tmp.path().to_path_buf(),
            ..AnalyzerConfig::default()
        };

        let name = report_emitter(&config).emit(&tables).unwrap();
        assert_eq!(name, "keyword_analysis_rank_tracking_all.xlsx");
        assert!(tmp.path().join(&name).is_file());

        config.report_format = ReportFormat::Csv;
        let name = report_emitter(&config).emit(&tables).unwrap();
        assert_eq!(name, "keyword_analysis_rank_tracking_all");
        assert!(tmp.path().join(&name).is_dir());
    }

    #[tokio::test]
    async fn test_quiet_failure_still_returns_result() {
        let display = Display {
            quiet: true,
            ..Display::default()
        };
        let result = run(
            Path::new("/nonexistent/ranks.csv"),
            &AnalyzerConfig::default(),
            display,
        )
        .await;
        assert!(!result.is_success());
        assert!(result.to_json()["error"].as_str().unwrap().contains("ranks.csv"));
    }
}
