use clap::Parser;
use onpage_runtime::cli::analyze_cmd::{self, Display};
use onpage_runtime::cli::output::{self, Styled};
use onpage_runtime::config::{AnalyzerConfig, FetchConfig, FilterMode, ReportFormat};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Audit whether ranking keywords appear in the on-page elements of the
/// pages they rank for.
#[derive(Parser, Debug)]
#[command(name = "onpage", version, about)]
struct Cli {
    /// Rank-tracking or search-console export (.csv, .xlsx, .xls or .json)
    input: PathBuf,

    /// Which rows to audit
    #[arg(long, value_enum, env = "ONPAGE_FILTER", default_value_t = FilterMode::Recommended)]
    filter: FilterMode,

    /// Directory the report is written under
    #[arg(long, env = "ONPAGE_OUTPUT_DIR", default_value = "results")]
    output_dir: PathBuf,

    /// Report shape: one workbook, or a directory of CSV tables
    #[arg(long, value_enum, env = "ONPAGE_REPORT_FORMAT", default_value_t = ReportFormat::Xlsx)]
    report_format: ReportFormat,

    /// Navigation timeout for the primary render attempt
    #[arg(long, env = "ONPAGE_TIMEOUT_MS", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Navigation timeout for the fallback render attempt
    #[arg(long, env = "ONPAGE_FALLBACK_TIMEOUT_MS", default_value_t = 60_000)]
    fallback_timeout_ms: u64,

    /// Pause after a page rendered successfully
    #[arg(long, env = "ONPAGE_SUCCESS_DELAY_MS", default_value_t = 2_000)]
    success_delay_ms: u64,

    /// Pause after a page could not be rendered
    #[arg(long, env = "ONPAGE_FAILURE_DELAY_MS", default_value_t = 5_000)]
    failure_delay_ms: u64,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Suppress all stderr output except logs
    #[arg(long, short)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "ONPAGE_LOG_JSON")]
    log_json: bool,

    /// Print a per-zone summary to stderr when done
    #[arg(long)]
    summary: bool,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            filter: self.filter,
            output_dir: self.output_dir.clone(),
            report_format: self.report_format,
            fetch: FetchConfig {
                primary_timeout: Duration::from_millis(self.timeout_ms),
                fallback_timeout: Duration::from_millis(self.fallback_timeout_ms),
                success_delay: Duration::from_millis(self.success_delay_ms),
                failure_delay: Duration::from_millis(self.failure_delay_ms),
                ..FetchConfig::default()
            },
        }
    }

    fn display(&self) -> Display {
        let interactive = !self.quiet && !self.log_json;
        Display {
            progress: interactive && !self.no_progress,
            summary: self.summary && !self.quiet,
            quiet: self.quiet,
        }
    }
}

fn init_tracing(log_json: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::from_default_env().add_directive(
        "onpage_runtime=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.config();
    if let Ok(json) = serde_json::to_string(&config) {
        info!(config = %json, "starting onpage v{}", env!("CARGO_PKG_VERSION"));
    }
    if !cli.quiet && !cli.log_json {
        output::print_header(&Styled::new());
    }

    let result = analyze_cmd::run(&cli.input, &config, cli.display()).await;
    output::print_json(&result.to_json());

    if !result.is_success() {
        std::process::exit(1);
    }
}
