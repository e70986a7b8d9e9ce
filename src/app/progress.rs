//! Terminal progress reporting
//!
//! Two kinds of feedback are drawn on stderr:
//!
//! - a single overwriting status line (`\r`-terminated) showing the current
//!   search term and how far through all rows the current phase is, used by
//!   both the metadata and the download phase;
//! - an `indicatif` byte bar while a single file streams to disk.
//!
//! Nothing is drawn when stderr is not a terminal or progress is disabled.

use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::progress;

/// Phase label for the metadata pass
pub const METADATA_LABEL: &str = "Fetching metadata for";

/// Phase label for the download pass
pub const DOWNLOAD_LABEL: &str = "Downloading";

/// Render one status line padded to `columns`
///
/// `current` and `total` count rows across all search terms. The bar takes
/// whatever width is left after the reserved text columns.
pub fn render_progress_line(
    label: &str,
    term: &str,
    current: usize,
    total: usize,
    columns: usize,
) -> String {
    let fraction = if total == 0 {
        1.0
    } else {
        (current.min(total) as f64) / (total as f64)
    };

    let bar_width = columns
        .saturating_sub(progress::RESERVED_TEXT_WIDTH)
        .max(progress::MIN_BAR_WIDTH);
    let filled = ((bar_width as f64) * fraction) as usize;

    let bar: String = std::iter::repeat(progress::FILLED_CHAR)
        .take(filled)
        .chain(std::iter::repeat(progress::EMPTY_CHAR).take(bar_width - filled))
        .collect();

    let line = format!(
        "{} {} ({}/{}) - {}% [{}]",
        label,
        term,
        current,
        total,
        (fraction * 100.0) as u32,
        bar
    );
    format!("{:<width$}", line, width = columns)
}

/// Current terminal width, falling back to a fixed default
pub fn terminal_columns() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| columns as usize)
        .ok()
        .filter(|columns| *columns > 0)
        .unwrap_or(progress::FALLBACK_COLUMNS)
}

/// Draw a status line on stderr, leaving the cursor at its start
pub fn display_progress(label: &str, term: &str, current: usize, total: usize) {
    let line = render_progress_line(label, term, current, total, terminal_columns());
    let mut stderr = io::stderr();
    let _ = write!(stderr, "{}\r", line);
    let _ = stderr.flush();
}

/// Progress output switch shared by the workflow stages
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    enabled: bool,
}

impl ProgressReporter {
    /// Create a reporter; output is suppressed when stderr is not a terminal
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: enabled && atty::is(atty::Stream::Stderr),
        }
    }

    /// A reporter that never draws anything
    pub fn hidden() -> Self {
        Self { enabled: false }
    }

    /// Whether anything will be drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Redraw the status line
    pub fn report(&self, label: &str, term: &str, current: usize, total: usize) {
        if self.enabled {
            display_progress(label, term, current, total);
        }
    }

    /// Move past the status line so later output starts on a fresh line
    pub fn finish_line(&self) {
        if self.enabled {
            eprintln!();
        }
    }

    /// Byte progress bar for one streaming download
    pub fn file_bar(&self, file_name: &str, length: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(length.unwrap_or(0));
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_message(file_name.to_string());
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_fills_terminal_width() {
        let line = render_progress_line(METADATA_LABEL, "demo", 1, 4, 100);
        assert_eq!(line.chars().count(), 100);
        assert!(line.starts_with("Fetching metadata for demo (1/4) - 25% ["));

        let bar_width = 100 - progress::RESERVED_TEXT_WIDTH;
        let filled = line.matches(progress::FILLED_CHAR).count();
        let empty = line.matches(progress::EMPTY_CHAR).count();
        assert_eq!(filled, bar_width / 4);
        assert_eq!(filled + empty, bar_width);
    }

    #[test]
    fn test_completed_line_is_full() {
        let line = render_progress_line(DOWNLOAD_LABEL, "demo", 3, 3, 80);
        assert!(line.contains("(3/3) - 100%"));
        assert!(!line.contains(progress::EMPTY_CHAR));
    }

    #[test]
    fn test_narrow_terminal_keeps_minimum_bar() {
        let line = render_progress_line(DOWNLOAD_LABEL, "x", 0, 2, 20);
        let bar_start = line.find('[').unwrap();
        let bar_end = line.find(']').unwrap();
        assert_eq!(bar_end - bar_start - 1, progress::MIN_BAR_WIDTH);
    }

    #[test]
    fn test_empty_total_does_not_divide_by_zero() {
        let line = render_progress_line(DOWNLOAD_LABEL, "x", 0, 0, 80);
        assert!(line.contains("100%"));
    }

    #[test]
    fn test_hidden_reporter_returns_hidden_bar() {
        let reporter = ProgressReporter::hidden();
        assert!(!reporter.is_enabled());
        assert!(reporter.file_bar("ep1.mp3", Some(10)).is_hidden());
    }
}
