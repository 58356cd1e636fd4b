//! Terminal progress for a run: a launch spinner and a per-row bar.

use crate::cli::output::Styled;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &str = "\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}";

/// Create a simple spinner for general operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICKS);
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Bar tracking analyzed rows; the message shows the current keyword.
pub fn create_row_progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "  {spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {elapsed_precise} {wide_msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("\u{2588}\u{258c}\u{2591}");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Advance `bar` to `done` and show the row just finished.
pub fn set_row_done(bar: &ProgressBar, s: &Styled, done: usize, keyword: &str, page: &str) {
    bar.set_position(done as u64);
    bar.set_message(s.dim(&format!("{keyword} \u{2192} {page}")));
}
