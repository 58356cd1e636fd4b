//! Shared CLI output formatting: colors, symbols and the run summary.
//!
//! Everything here writes to stderr. Stdout carries only the process
//! result JSON.

use crate::analysis::Summary;
use crate::report::ReportTables;
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("ONPAGE_NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a branded header for CLI output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("onpage"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

/// Format a duration in seconds into human-readable (e.g., "2h 14m").
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let m = secs / 60;
        let s = secs % 60;
        format!("{m}m {s}s")
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{h}h {m}m")
    }
}

/// Simple progress bar string.
pub fn progress_bar(current: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }
    let filled = (current * width) / total;
    let empty = width - filled;
    format!("[{}{}]", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

/// One line per zone, in report column order.
pub fn summary_lines(s: &Styled, summary: &Summary) -> Vec<String> {
    let total = summary.total_keywords;
    ReportTables::zone_labels()
        .filter_map(|label| summary.elements.get(label).map(|z| (label, z)))
        .map(|(label, zone)| {
            let pct = format!("{:>5.1}%", zone.yes_percentage);
            let pct = if zone.yes_percentage >= 50.0 {
                s.green(&pct)
            } else if zone.yes == 0 {
                s.red(&pct)
            } else {
                s.yellow(&pct)
            };
            format!(
                "    {label:<12} {} {pct} {}",
                progress_bar(zone.yes, total, 20),
                s.dim(&format!("{}/{total}", zone.yes))
            )
        })
        .collect()
}

/// Print the per-zone summary block.
pub fn print_summary(s: &Styled, summary: &Summary, report: &str, elapsed_secs: u64) {
    eprintln!(
        "  {} {} keywords from {} in {}",
        s.ok_sym(),
        summary.total_keywords,
        summary.data_source,
        format_duration(elapsed_secs)
    );
    eprintln!();
    for line in summary_lines(s, summary) {
        eprintln!("{line}");
    }
    eprintln!();
    eprintln!(
        "  {:<16} {}",
        s.bold("Opportunity"),
        summary.total_traffic_opportunity
    );
    if summary.degraded_rows > 0 {
        eprintln!(
            "  {:<16} {}",
            s.bold("Unavailable"),
            s.yellow(&format!("{} rows recorded as absent", summary.degraded_rows))
        );
    }
    eprintln!("  {:<16} {report}", s.bold("Report"));
}

/// Print a failure line.
pub fn print_failure(s: &Styled, error: &str) {
    eprintln!("  {} {}", s.fail_sym(), s.red(error));
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}
